//! API client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the catalog API (e.g., "http://localhost:8000").
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Connection timeout in seconds.
    #[serde(default = "ApiConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Page size requested from list endpoints.
    #[serde(default = "ApiConfig::default_list_limit")]
    pub list_limit: u32,
}

impl ApiConfig {
    /// Default configuration pointed at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn default_base_url() -> String {
        "http://localhost:8000".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    const fn default_list_limit() -> u32 {
        // The server's own default is 10.
        100
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            list_limit: Self::default_list_limit(),
        }
    }
}
