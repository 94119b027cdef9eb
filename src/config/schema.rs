//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the widget proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Generic relay settings.
    pub relay: RelayConfig,

    /// Recommendation API settings.
    pub recommender: RecommenderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Output mode of the generic relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Re-emit the upstream body and a safe subset of headers unmodified.
    #[default]
    Passthrough,
    /// Wrap status, headers, and body in a JSON (optionally JSONP) envelope.
    Structured,
}

/// Generic relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Output mode. Structured mode is an optional alternate path and is
    /// off by default.
    pub mode: RelayMode,

    /// Allow JSONP wrapping via the `callback` parameter (structured mode
    /// only).
    pub enable_jsonp: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: RelayMode::Passthrough,
            enable_jsonp: false,
        }
    }
}

/// Recommendation API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Named API deployment: "prod", "beta", or "dev". Anything else is
    /// rejected at load time.
    pub deployment: String,

    /// Partner tag appended to renderer lookup URLs (`app_id` parameter).
    pub app_id: String,

    /// Overrides the deployment-derived API origin. Intended for pointing
    /// the client at a local mock during testing.
    pub base_url: Option<String>,

    /// Base URL embedded in the legacy lookup's inline click-logging call.
    pub click_log_base: String,

    /// Opaque UI variant tag carried from the partner configuration.
    pub ui: Option<String>,

    /// Opaque partner environment tag carried from the partner
    /// configuration.
    pub partner: Option<String>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            deployment: "prod".to_string(),
            app_id: "mediatum".to_string(),
            base_url: None,
            click_log_base: "/relay".to_string(),
            ui: None,
            partner: None,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for outbound calls in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.relay.mode, RelayMode::Passthrough);
        assert!(!config.relay.enable_jsonp);
        assert_eq!(config.recommender.deployment, "prod");
        assert_eq!(config.recommender.app_id, "mediatum");
    }

    #[test]
    fn test_partial_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [relay]
            mode = "structured"

            [recommender]
            deployment = "beta"
            "#,
        )
        .unwrap();
        assert_eq!(config.relay.mode, RelayMode::Structured);
        assert_eq!(config.recommender.deployment, "beta");
        // untouched sections keep their defaults
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
