//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Status mapping (404 vs other non-2xx) into `HttpFailure`
//!
//! Requests are attempted once. Callers translate `HttpFailure` into the
//! error type of their concern.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for HTTP requests (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("rnup/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure of a single request
#[derive(Error, Debug)]
pub enum HttpFailure {
    /// The server answered 404
    #[error("HTTP 404 Not Found")]
    NotFound,

    /// The server answered with another non-success status
    #[error("HTTP {0}")]
    Status(StatusCode),

    /// The request did not finish within the timeout
    #[error("request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("{0}")]
    Network(String),

    /// The response body could not be read or decoded
    #[error("invalid response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for HttpFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpFailure::Timeout
        } else if e.is_decode() {
            HttpFailure::Body(e.to_string())
        } else {
            HttpFailure::Network(e.to_string())
        }
    }
}

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, HttpFailure> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpFailure> {
        Self::with_config(timeout, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, HttpFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpFailure::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, HttpFailure> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "HTTP response");

        if status == StatusCode::NOT_FOUND {
            return Err(HttpFailure::NotFound);
        }
        if !status.is_success() {
            return Err(HttpFailure::Status(status));
        }
        Ok(response)
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, HttpFailure> {
        let response = self.send(self.client.get(url)).await?;
        response
            .text()
            .await
            .map_err(|e| HttpFailure::Body(e.to_string()))
    }

    /// Perform a POST request with a JSON body and parse the JSON response
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, HttpFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(url).json(body)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| HttpFailure::Body(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_config() {
        let client = HttpClient::with_config(Duration::from_secs(60), "test-agent/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(5));
        assert!(DEFAULT_USER_AGENT.starts_with("rnup/"));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(HttpFailure::NotFound.to_string(), "HTTP 404 Not Found");
        assert!(HttpFailure::Status(StatusCode::BAD_GATEWAY)
            .to_string()
            .contains("502"));
        assert_eq!(HttpFailure::Timeout.to_string(), "request timed out");
    }
}
