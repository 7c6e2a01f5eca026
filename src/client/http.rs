//! Thin HTTP transport for the Carbon API
//!
//! Builds endpoint URLs, attaches default headers, and surfaces raw
//! responses. No caching or business logic lives here; timeouts and
//! connection reuse are delegated to reqwest.

use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::error::{ApiError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) struct Http {
    client: HttpClient,
    base_url: String,
}

impl Http {
    pub fn new(base_url: &str) -> Result<Self> {
        // Cookie store enabled: the Carbon API expects a reusable session
        // context across login and subsequent calls.
        let client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    pub async fn get(
        &self,
        endpoint: &str,
        bearer: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<Response> {
        let mut request = self
            .client
            .get(self.endpoint_url(endpoint))
            .header(ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        Ok(request.send().await.map_err(ApiError::from)?)
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.endpoint_url(endpoint))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.endpoint_url(endpoint))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::from)?)
    }
}

/// Fail with `ApiError::Remote` on any non-2xx status
pub(crate) fn check_status(response: &Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(ApiError::Remote {
        status: status.as_u16(),
        reason: reason_phrase(status),
    }
    .into())
}

pub(crate) fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_with_slash() {
        let http = Http::new("https://api.example.com").unwrap();
        assert_eq!(
            http.endpoint_url("carbon/services"),
            "https://api.example.com/carbon/services"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let http = Http::new("https://api.example.com/").unwrap();
        assert_eq!(http.endpoint_url("login"), "https://api.example.com/login");
    }

    #[test]
    fn test_reason_phrase_known_status() {
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND), "Not Found");
    }
}
