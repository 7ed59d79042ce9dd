//! Gateway connection configuration.

use serde::{Deserialize, Serialize};

use crate::protocol::paths::{BACKUP_BASE_URL, DEFAULT_BASE_URL};

/// Configuration for reaching the gateway over HTTP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Scheme and host, without a trailing path (e.g. "https://api.mch.weixin.qq.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("wxpay-lib/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl GatewayConfig {
    /// Create a configuration for a custom base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Preset for the backup domain.
    pub fn backup() -> Self {
        Self::new(BACKUP_BASE_URL)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Full URL for a path that starts with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "https://api.mch.weixin.qq.com");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("wxpay-lib/"));
    }

    #[test]
    fn test_backup_preset() {
        assert_eq!(
            GatewayConfig::backup().url("/v3/certificates"),
            "https://api2.mch.weixin.qq.com/v3/certificates"
        );
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let config = GatewayConfig::new("http://127.0.0.1:8080/").with_timeout(5);
        assert_eq!(config.url("/v3/certificates"), "http://127.0.0.1:8080/v3/certificates");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:9000"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 30);
    }
}
