//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check enumerated strings (version, log level, log format)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::message::Version;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("agent.version must be \"1.0\" or \"1.1\", got {0:?}")]
    UnsupportedVersion(String),

    #[error("agent.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("agent.default_headers contains an invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("transport.connect_timeout_secs must be greater than 0")]
    ZeroConnectTimeout,

    #[error("transport.max_response_bytes must be greater than 0")]
    ZeroResponseLimit,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.log_format {0:?} is not one of pretty, json")]
    UnknownLogFormat(String),
}

/// Check every semantic rule and collect each violation.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.agent.version.parse::<Version>().is_err() {
        errors.push(ValidationError::UnsupportedVersion(config.agent.version.clone()));
    }

    if matches!(&config.agent.user_agent, Some(ua) if ua.trim().is_empty()) {
        errors.push(ValidationError::EmptyUserAgent);
    }

    for (name, _) in config.agent.default_headers.iter() {
        if axum::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.to_string()));
        }
    }

    if config.transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if config.transport.max_response_bytes == 0 {
        errors.push(ValidationError::ZeroResponseLimit);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if !LOG_FORMATS.contains(&config.observability.log_format.as_str()) {
        errors.push(ValidationError::UnknownLogFormat(config.observability.log_format.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = ClientConfig::default();
        config.agent.version = "2".to_string();
        config.agent.user_agent = Some("  ".to_string());
        config.agent.default_headers.set("bad name", "x");
        config.transport.connect_timeout_secs = 0;
        config.transport.max_response_bytes = 0;
        config.observability.log_level = "loud".to_string();
        config.observability.log_format = "xml".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::UnsupportedVersion("2".to_string())));
        assert!(errors.contains(&ValidationError::InvalidHeaderName("bad name".to_string())));
        assert!(errors.contains(&ValidationError::UnknownLogFormat("xml".to_string())));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = ClientConfig::default();
        config.observability.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
