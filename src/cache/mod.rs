//! Persistent TTL cache for API responses and session state
//!
//! All cached application data is keyed by operation name and parameters,
//! and every read (other than the login-expiry marker itself) is gated on
//! the persisted session still being valid: once the login lapses, the
//! whole store reads as empty until the next successful login.

pub mod keys;
pub mod store;

pub use store::TtlStore;
