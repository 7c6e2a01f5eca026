//! Error types for the Carbon client

use thiserror::Error;

/// Result type alias for Carbon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the library
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Login rejected by the Carbon API (HTTP {status}: {reason})")]
    Auth { status: u16, reason: String },

    #[error("Carbon API request failed (HTTP {status}: {reason})")]
    Remote { status: u16, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors, raised before any network or cache access
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("A production or test API URL must be provided")]
    MissingUrl,

    #[error("API mode is '{mode}' but no URL for that mode was provided")]
    ModeWithoutUrl { mode: String },

    #[error("API username and password must be provided")]
    MissingCredentials,
}

/// Persistent cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Cache store is corrupt: {0}")]
    Corrupt(String),

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_carries_status_and_reason() {
        let err = ApiError::Auth {
            status: 401,
            reason: "Unauthorized".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Unauthorized"));
    }

    #[test]
    fn test_remote_error_carries_status_and_reason() {
        let err = ApiError::Remote {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("Service Unavailable"));
    }

    #[test]
    fn test_not_found_carries_identifier() {
        let err = ApiError::NotFound("service 42".to_string());
        assert!(err.to_string().contains("service 42"));
    }

    #[test]
    fn test_config_error_mode_without_url() {
        let err = ConfigError::ModeWithoutUrl {
            mode: "test".to_string(),
        };
        assert!(err.to_string().contains("'test'"));
    }

    #[test]
    fn test_cache_error_corrupt() {
        let err = CacheError::Corrupt("/tmp/cache.db: file is not a database".to_string());
        assert!(err.to_string().contains("corrupt"));
        assert!(err.to_string().contains("cache.db"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::NotFound("service 1".to_string()).into();
        match err {
            Error::Api(ApiError::NotFound(_)) => (),
            _ => panic!("Expected Error::Api(ApiError::NotFound)"),
        }
    }

    #[test]
    fn test_error_from_cache_error() {
        let err: Error = CacheError::NoHome.into();
        match err {
            Error::Cache(CacheError::NoHome) => (),
            _ => panic!("Expected Error::Cache(CacheError::NoHome)"),
        }
    }
}
