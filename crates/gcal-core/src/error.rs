//! Configuration error types.
//!
//! Configuration errors are fatal: they are raised while the process starts
//! and never reach a tool caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_setting_message() {
        let err = ConfigError::MissingSetting("GOOGLE_CLIENT_ID".into());
        assert_eq!(
            err.to_string(),
            "Missing required setting: GOOGLE_CLIENT_ID"
        );
    }

    #[test]
    fn test_into_anyhow_keeps_variant() {
        let err: anyhow::Error = ConfigError::Invalid("bad".into()).into();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid(_))
        ));
    }
}
