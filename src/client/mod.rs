//! Carbon API client
//!
//! [`CarbonClient`] composes the HTTP transport, the authentication
//! session, and the persistent TTL store. Every read operation consults
//! the store first (subject to its [`CachePolicy`]) and obtains a valid
//! bearer token transparently before touching the network.

pub mod auth;
pub(crate) mod http;
pub mod models;

mod customer;
mod services;

pub use auth::AccessToken;
pub use models::{ServiceRecord, ServiceTable};

use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlStore;
use crate::client::auth::AuthSession;
use crate::client::http::Http;
use crate::config::CarbonConfig;
use crate::error::Result;

/// Cache consultation policy for a single call
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Consult the store before fetching (true by default)
    pub use_cache: bool,

    /// Maximum acceptable entry age; unlimited when unset. The session
    /// expiry gate applies regardless.
    pub max_age: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            use_cache: true,
            max_age: None,
        }
    }
}

impl CachePolicy {
    /// Skip the cache and fetch fresh data (the result is still stored)
    pub fn bypass() -> Self {
        Self {
            use_cache: false,
            max_age: None,
        }
    }

    /// Accept cached data no older than `age`
    pub fn max_age(age: Duration) -> Self {
        Self {
            use_cache: true,
            max_age: Some(age),
        }
    }
}

/// Client for the Carbon wholesale API
pub struct CarbonClient {
    pub(crate) http: Arc<Http>,
    pub(crate) store: Arc<TtlStore>,
    pub(crate) auth: AuthSession,
}

impl CarbonClient {
    /// Build a client from validated configuration.
    ///
    /// Fails with `ConfigError` on missing or contradictory parameters,
    /// or `CacheError` when the persisted store cannot be opened — a
    /// corrupt store is surfaced here, never silently replaced.
    pub fn new(config: CarbonConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;

        let http = Arc::new(Http::new(base_url)?);
        let store = Arc::new(match &config.cache_location {
            Some(dir) => TtlStore::open_at(dir)?,
            None => TtlStore::open_default()?,
        });
        let auth = AuthSession::new(
            config.username,
            config.password,
            Arc::clone(&http),
            Arc::clone(&store),
        );

        Ok(Self { http, store, auth })
    }

    /// Log in if not already authenticated; idempotent within the token's
    /// validity window
    pub async fn login(&self) -> Result<AccessToken> {
        self.auth.ensure_login().await
    }

    /// Log out remotely (best effort) and clear local session state,
    /// invalidating all cached data
    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }

    /// A valid bearer token string, logging in if necessary
    pub async fn access_token(&self) -> Result<String> {
        self.auth.token().await
    }
}
