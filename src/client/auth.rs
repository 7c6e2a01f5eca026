//! Login/logout state machine backed by the TTL store
//!
//! The session token is persisted alongside the `login_expiry` marker so a
//! process restart within the token's lifetime re-uses the stored login
//! instead of re-authenticating. The same marker gates every other cache
//! entry, so a lapsed login implicitly invalidates all cached data.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::{TtlStore, keys};
use crate::client::http::{Http, reason_phrase};
use crate::error::{ApiError, Result};

/// Bearer token with its expiry instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer token string
    pub token: String,

    /// Instant after which the token is no longer valid
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Wire shape of a successful login (`POST login`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Token lifetime in seconds, from the server
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Authentication state machine: logged-out until a successful login,
/// authenticated until expiry or an explicit logout
pub(crate) struct AuthSession {
    username: String,
    password: String,
    http: Arc<Http>,
    store: Arc<TtlStore>,
    state: RwLock<Option<AccessToken>>,
}

impl AuthSession {
    pub fn new(username: String, password: String, http: Arc<Http>, store: Arc<TtlStore>) -> Self {
        Self {
            username,
            password,
            http,
            store,
            state: RwLock::new(None),
        }
    }

    /// A valid token, logging in only when necessary.
    ///
    /// Within a token's validity window this never issues a network
    /// request: the in-memory token is used first, then a token persisted
    /// by a previous process run. The persisted read is gated by the
    /// `login_expiry` marker, so a lapsed session falls through to a fresh
    /// login.
    pub async fn ensure_login(&self) -> Result<AccessToken> {
        {
            let state = self.state.read().await;
            if let Some(token) = state.as_ref()
                && token.is_valid()
            {
                return Ok(token.clone());
            }
        }

        if let Some(token) = self.rehydrate()? {
            log::debug!("reusing persisted login (valid until {})", token.expires_at);
            *self.state.write().await = Some(token.clone());
            return Ok(token);
        }

        let request = LoginRequest {
            username: &self.username,
            password: &self.password,
        };
        let response = self.http.post_json("login", &request).await?;

        let status = response.status();
        if !status.is_success() {
            // State stays logged-out
            return Err(ApiError::Auth {
                status: status.as_u16(),
                reason: reason_phrase(status),
            }
            .into());
        }

        let login: LoginResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to decode login response: {e}"))
        })?;

        let expires_at = Utc::now() + ChronoDuration::seconds(login.expires_in);
        self.store.store_json(keys::LOGIN_EXPIRY, &expires_at.timestamp())?;
        self.store.store_json(keys::LOGIN_RESPONSE, &login)?;

        let token = AccessToken {
            token: login.access_token,
            expires_at,
        };
        *self.state.write().await = Some(token.clone());
        log::debug!("logged in (token valid until {expires_at})");
        Ok(token)
    }

    /// Remote logout, then unconditional local cleanup.
    ///
    /// A failed remote logout is logged and swallowed: local state is the
    /// source of truth for later `ensure_login` decisions. Persisting a
    /// zero expiry marker invalidates every other cache entry through the
    /// store's session gate.
    pub async fn logout(&self) -> Result<()> {
        match self.http.delete("login").await {
            Ok(response) if !response.status().is_success() => {
                log::warn!(
                    "remote logout returned HTTP {}; clearing local session anyway",
                    response.status()
                );
            }
            Err(err) => {
                log::warn!("remote logout failed: {err}; clearing local session anyway");
            }
            Ok(_) => {}
        }

        *self.state.write().await = None;
        self.store.store_json(keys::LOGIN_EXPIRY, &0_i64)?;
        Ok(())
    }

    /// The bearer token string, logging in if necessary
    pub async fn token(&self) -> Result<String> {
        Ok(self.ensure_login().await?.token)
    }

    fn rehydrate(&self) -> Result<Option<AccessToken>> {
        // Gated read: returns None once the session has lapsed
        let Some(login) = self
            .store
            .get_json::<LoginResponse>(keys::LOGIN_RESPONSE, None)?
        else {
            return Ok(None);
        };
        let Some(expiry) = self.store.get_json::<i64>(keys::LOGIN_EXPIRY, None)? else {
            return Ok(None);
        };
        let Some(expires_at) = DateTime::from_timestamp(expiry, 0) else {
            return Ok(None);
        };
        Ok(Some(AccessToken {
            token: login.access_token,
            expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_validity_window() {
        let valid = AccessToken {
            token: "t".to_string(),
            expires_at: Utc::now() + ChronoDuration::hours(1),
        };
        assert!(valid.is_valid());

        let expired = AccessToken {
            token: "t".to_string(),
            expires_at: Utc::now() - ChronoDuration::seconds(1),
        };
        assert!(!expired.is_valid());
    }

    #[test]
    fn test_login_response_wire_names() {
        let login: LoginResponse =
            serde_json::from_str(r#"{"accessToken": "abc", "expiresIn": 3600}"#).unwrap();
        assert_eq!(login.access_token, "abc");
        assert_eq!(login.expires_in, 3600);
    }
}
