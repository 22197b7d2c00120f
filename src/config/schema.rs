//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::headers::HeaderCollection;

/// Root configuration for a client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Agent identity and default headers.
    pub agent: AgentConfig,

    /// Default transport settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Settings for the outermost header tier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Overrides the built-in identification header.
    pub user_agent: Option<String>,

    /// Headers seeded into the agent tier (string or list of strings).
    pub default_headers: HeaderCollection,

    /// Protocol version for new requests ("1.0" or "1.1").
    pub version: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            default_headers: HeaderCollection::new(),
            version: "1.1".to_string(),
        }
    }
}

/// Settings for the default hyper transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Largest response body buffered before the exchange fails.
    pub max_response_bytes: usize,

    /// Set TCP_NODELAY on outbound connections.
    pub nodelay: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            max_response_bytes: 10 * 1024 * 1024,
            nodelay: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.agent.version, "1.1");
        assert!(config.agent.user_agent.is_none());
        assert!(config.agent.default_headers.is_empty());
        assert_eq!(config.transport.connect_timeout_secs, 10);
        assert!(config.transport.nodelay);
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_default_headers_accept_scalars_and_lists() {
        let config: ClientConfig = toml::from_str(
            r#"
            [agent]
            user_agent = "probe/2"

            [agent.default_headers]
            Accept = "text/html"
            x-trace = ["a", "b"]
            "#,
        )
        .unwrap();

        let headers = &config.agent.default_headers;
        assert_eq!(config.agent.user_agent.as_deref(), Some("probe/2"));
        assert_eq!(headers.get("accept").as_deref(), Some("text/html"));
        assert_eq!(headers.get("x-trace").as_deref(), Some("a,b"));
        assert!(headers.get_value("x-trace").unwrap().is_list());
    }
}
