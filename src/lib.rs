//! Client library for the Aussie Broadband Carbon wholesale API.
//!
//! Authenticates against the API, persists session and response data in a
//! local TTL cache so repeated lookups avoid slow network calls, and
//! reshapes the nested service payloads into flat, queryable records.
//!
//! ```no_run
//! use carbonlink::{CachePolicy, CarbonClient, CarbonConfig};
//!
//! # async fn example() -> carbonlink::Result<()> {
//! let config = CarbonConfig::new("wholesaler", "secret")
//!     .with_prod_url("https://api.example.com");
//! let client = CarbonClient::new(config)?;
//!
//! let services = client.all_services(CachePolicy::default()).await?;
//! let by_avc = client.service_by_avc("AVC000000001", CachePolicy::default()).await?;
//! # let _ = (services, by_avc);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;

pub use client::{AccessToken, CachePolicy, CarbonClient, ServiceRecord, ServiceTable};
pub use config::{ApiMode, CarbonConfig};
pub use error::{ApiError, CacheError, ConfigError, Error, Result};
