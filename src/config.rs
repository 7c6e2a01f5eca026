//! Client configuration and validation

use std::path::PathBuf;

use crate::error::ConfigError;

/// Which of the configured endpoints the client talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiMode {
    #[default]
    Prod,
    Test,
}

impl ApiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMode::Prod => "prod",
            ApiMode::Test => "test",
        }
    }
}

/// Construction parameters for [`CarbonClient`](crate::CarbonClient).
///
/// Validated fail-fast by `CarbonClient::new`, before any network or
/// cache access.
#[derive(Debug, Clone)]
pub struct CarbonConfig {
    /// Production API base URL
    pub prod_url: Option<String>,

    /// Test API base URL
    pub test_url: Option<String>,

    /// Endpoint selection (production by default)
    pub mode: ApiMode,

    /// API username
    pub username: String,

    /// API password
    pub password: String,

    /// Cache directory; the per-user cache dir is used when unset
    pub cache_location: Option<PathBuf>,
}

impl CarbonConfig {
    /// New configuration with the given credentials. At least one of
    /// [`with_prod_url`](Self::with_prod_url) /
    /// [`with_test_url`](Self::with_test_url) must be supplied before use.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            prod_url: None,
            test_url: None,
            mode: ApiMode::default(),
            username: username.into(),
            password: password.into(),
            cache_location: None,
        }
    }

    pub fn with_prod_url(mut self, url: impl Into<String>) -> Self {
        self.prod_url = Some(url.into());
        self
    }

    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = Some(url.into());
        self
    }

    pub fn with_mode(mut self, mode: ApiMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cache_location(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_location = Some(dir.into());
        self
    }

    /// Check required parameters. Missing or contradictory options fail
    /// here rather than at first use.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.prod_url.is_none() && self.test_url.is_none() {
            return Err(ConfigError::MissingUrl);
        }
        self.base_url()?;
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }

    /// The base URL selected by `mode`
    pub fn base_url(&self) -> std::result::Result<&str, ConfigError> {
        let url = match self.mode {
            ApiMode::Prod => self.prod_url.as_deref(),
            ApiMode::Test => self.test_url.as_deref(),
        };
        url.ok_or(ConfigError::ModeWithoutUrl {
            mode: self.mode.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_prod_config() {
        let config = CarbonConfig::new("user", "pass").with_prod_url("https://api.example.com");
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url().unwrap(), "https://api.example.com");
    }

    #[test]
    fn test_missing_urls_rejected() {
        let config = CarbonConfig::new("user", "pass");
        match config.validate() {
            Err(ConfigError::MissingUrl) => (),
            other => panic!("Expected MissingUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_test_mode_without_test_url_rejected() {
        let config = CarbonConfig::new("user", "pass")
            .with_prod_url("https://api.example.com")
            .with_mode(ApiMode::Test);
        match config.validate() {
            Err(ConfigError::ModeWithoutUrl { mode }) => assert_eq!(mode, "test"),
            other => panic!("Expected ModeWithoutUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_test_mode_selects_test_url() {
        let config = CarbonConfig::new("user", "pass")
            .with_prod_url("https://api.example.com")
            .with_test_url("https://test.example.com")
            .with_mode(ApiMode::Test);
        assert_eq!(config.base_url().unwrap(), "https://test.example.com");
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let config = CarbonConfig::new("", "").with_prod_url("https://api.example.com");
        match config.validate() {
            Err(ConfigError::MissingCredentials) => (),
            other => panic!("Expected MissingCredentials, got {other:?}"),
        }
    }
}
