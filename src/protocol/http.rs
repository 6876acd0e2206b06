// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the vendor cloud API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::response::Envelope;

// ============================================================================
// HttpConfig - Connection parameters for the vendor API
// ============================================================================

/// Configuration of the vendor HTTP client.
///
/// # Examples
///
/// ```
/// use cmspa_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Production defaults
/// let config = HttpConfig::new();
/// assert_eq!(config.settle_delay(), Duration::from_secs(5));
///
/// // Pointing at a test server without the post-command wait
/// let config = HttpConfig::new()
///     .with_base_url("http://127.0.0.1:8080")
///     .with_settle_delay(Duration::ZERO)
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(config.base_url(), "http://127.0.0.1:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    token_ttl: Duration,
    settle_delay: Duration,
}

impl HttpConfig {
    /// Production API host.
    pub const DEFAULT_BASE_URL: &'static str = "https://production.controlmyspa.net";
    /// User agent of the vendor's iOS app.
    pub const DEFAULT_USER_AGENT: &'static str = "cms/34 CFNetwork/3826.500.111.2.2 Darwin/24.4.0";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Assumed token lifetime; the login response carries no expiry.
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);
    /// Wait between a successful command and the confirming state fetch.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

    /// Creates a configuration with production defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
        }
    }

    /// Overrides the API host (scheme included, no trailing slash needed).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the lifetime assumed for freshly issued tokens.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Sets the wait between a command and its confirming fetch.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Returns the API host.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the assumed token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Returns the settle delay.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the TLS backend cannot be initialized.
    pub fn into_client(self) -> Result<HttpClient, ApiError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;

        Ok(HttpClient {
            base_url: self.base_url,
            client,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpClient - Thin wrapper adding the vendor's standard headers
// ============================================================================

/// A received HTTP response whose status has not been judged yet.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: String,
}

impl HttpResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the vendor's `message` field, if the body carries one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        Envelope::<Value>::from_body(&self.body)
            .ok()
            .and_then(|e| e.message)
    }

    /// Fails unless the status is exactly 200.
    ///
    /// # Errors
    ///
    /// Returns an `Http` error carrying the status and vendor message.
    pub fn ensure_ok(&self) -> Result<(), ApiError> {
        if self.status == 200 {
            return Ok(());
        }
        let message = self
            .message()
            .or_else(|| {
                reqwest::StatusCode::from_u16(self.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "unexpected status".to_string());
        Err(ApiError::http(self.status, message))
    }

    /// Checks the status and extracts the `data` member of the envelope.
    ///
    /// # Errors
    ///
    /// Returns an `Http` error for non-200 responses and a `MalformedBody`
    /// error when the body is not JSON or `data` is missing.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        self.ensure_ok()?;
        let envelope = Envelope::<T>::from_body(&self.body)
            .map_err(|e| ApiError::malformed(self.status, e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| ApiError::malformed(self.status, "response has no data member"))
    }
}

/// HTTP client for the vendor API.
///
/// Adds `Accept: */*` and the configured `User-Agent` to every request, and
/// a bearer token when one is given. Status codes are not interpreted here;
/// see [`HttpResponse::into_data`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Returns the API host.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL for an API path.
    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.build_url(path))
            .header(reqwest::header::ACCEPT, "*/*");
        match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn get(&self, path: &str, bearer: Option<&str>) -> Result<HttpResponse, ApiError> {
        tracing::debug!(path = %path, "Sending GET");
        Self::execute(self.request(Method::GET, path, bearer)).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, ApiError> {
        tracing::debug!(path = %path, "Sending POST");
        Self::execute(self.request(Method::POST, path, bearer).json(body)).await
    }

    async fn execute(builder: RequestBuilder) -> Result<HttpResponse, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        tracing::debug!(status, bytes = body.len(), "Received HTTP response");

        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new();
        assert_eq!(config.base_url(), "https://production.controlmyspa.net");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.token_ttl(), Duration::from_secs(3600));
        assert_eq!(config.settle_delay(), Duration::from_secs(5));
        assert_eq!(config.user_agent(), HttpConfig::DEFAULT_USER_AGENT);
    }

    #[test]
    fn http_config_builder_chain() {
        let config = HttpConfig::new()
            .with_base_url("http://localhost:9000/")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(3))
            .with_token_ttl(Duration::from_secs(60))
            .with_settle_delay(Duration::ZERO);

        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(config.user_agent(), "test-agent");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.token_ttl(), Duration::from_secs(60));
        assert_eq!(config.settle_delay(), Duration::ZERO);
    }

    #[test]
    fn build_url_joins_paths() {
        let client = HttpConfig::new()
            .with_base_url("http://localhost:9000")
            .into_client()
            .unwrap();
        assert_eq!(client.build_url("/auth/login"), "http://localhost:9000/auth/login");
        assert_eq!(client.build_url("auth/login"), "http://localhost:9000/auth/login");
    }

    #[test]
    fn into_data_extracts_payload() {
        let response = HttpResponse::new(200, r#"{"message":"ok","data":{"x":1}}"#.to_string());
        let data: Value = response.into_data().unwrap();
        assert_eq!(data["x"], 1);
    }

    #[test]
    fn into_data_missing_envelope_is_malformed() {
        let response = HttpResponse::new(200, r#"{"message":"ok"}"#.to_string());
        let err = response.into_data::<Value>().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::MalformedBody);
        assert_eq!(err.http_status, Some(200));
    }

    #[test]
    fn into_data_non_json_is_malformed() {
        let response = HttpResponse::new(200, "<html>".to_string());
        let err = response.into_data::<Value>().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::MalformedBody);
    }

    #[test]
    fn non_200_is_http_error_with_vendor_message() {
        let response = HttpResponse::new(401, r#"{"message":"Unauthorized token"}"#.to_string());
        let err = response.ensure_ok().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert_eq!(err.http_status, Some(401));
        assert_eq!(err.message, "Unauthorized token");
    }

    #[test]
    fn non_200_without_body_uses_reason() {
        let response = HttpResponse::new(502, String::new());
        let err = response.ensure_ok().unwrap_err();
        assert_eq!(err.message, "Bad Gateway");
    }

    #[test]
    fn other_2xx_is_not_success() {
        let response = HttpResponse::new(204, String::new());
        assert!(response.ensure_ok().is_err());
    }
}
