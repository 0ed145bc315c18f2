use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "GOOGLE_REDIRECT_URI";
pub const ENV_REFRESH_TOKEN: &str = "GOOGLE_REFRESH_TOKEN";
pub const ENV_AUTH_URL: &str = "GCAL_MCP_AUTH_URL";
pub const ENV_TOKEN_URL: &str = "GCAL_MCP_TOKEN_URL";
pub const ENV_CALENDAR_API_BASE: &str = "GCAL_MCP_CALENDAR_API_BASE";
pub const ENV_TOOL_TIMEOUT_SECS: &str = "GCAL_MCP_TOOL_TIMEOUT_SECS";
pub const ENV_CONFIG_PATH: &str = "GCAL_MCP_CONFIG";

pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Join all errors into a single line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google OAuth client and endpoint settings
    pub google: GoogleConfig,

    /// Tool server settings
    pub server: ServerConfig,
}

/// Google OAuth configuration.
///
/// Everything is optional at this level so a partial file can be completed
/// by the environment; `validate` decides what is actually required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// OAuth client ID from the Google Cloud console
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// Redirect URI registered for the client. Falls back to the
    /// out-of-band sentinel when unset.
    pub redirect_uri: Option<String>,

    /// Long-lived refresh token. Without it only the auth URL tool works.
    pub refresh_token: Option<String>,

    /// Endpoint overrides (production Google endpoints when unset)
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub calendar_api_base: Option<String>,
}

impl GoogleConfig {
    /// Client ID and secret, or the first one that is missing.
    pub fn require_credentials(&self) -> Result<(String, String), ConfigError> {
        let client_id = self
            .client_id
            .clone()
            .ok_or_else(|| ConfigError::MissingSetting(ENV_CLIENT_ID.to_string()))?;
        let client_secret = self
            .client_secret
            .clone()
            .ok_or_else(|| ConfigError::MissingSetting(ENV_CLIENT_SECRET.to_string()))?;
        Ok((client_id, client_secret))
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Upper bound for a single tool call, in seconds
    pub tool_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file (if any), then `.env`,
    /// then the process environment.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.display().to_string()).into());
            }
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        // A missing .env is not an error.
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::debug!("Ignoring unreadable .env file: {}", e);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Warnings are logged; any error aborts startup.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()))
                .context("Configuration validation failed");
        }

        for warning in &validation.warnings {
            tracing::debug!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        tracing::debug!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Overlay environment values. Blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let google = &mut self.google;
        for (key, slot) in [
            (ENV_CLIENT_ID, &mut google.client_id),
            (ENV_CLIENT_SECRET, &mut google.client_secret),
            (ENV_REDIRECT_URI, &mut google.redirect_uri),
            (ENV_REFRESH_TOKEN, &mut google.refresh_token),
            (ENV_AUTH_URL, &mut google.auth_url),
            (ENV_TOKEN_URL, &mut google.token_url),
            (ENV_CALENDAR_API_BASE, &mut google.calendar_api_base),
        ] {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }

        if let Some(raw) = get(ENV_TOOL_TIMEOUT_SECS) {
            match raw.parse() {
                Ok(secs) => self.server.tool_timeout_secs = secs,
                Err(_) => tracing::debug!(
                    "Ignoring non-numeric {}={:?}",
                    ENV_TOOL_TIMEOUT_SECS,
                    raw
                ),
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if is_blank(&self.google.client_id) {
            result.add_error(
                "google.client_id",
                format!("Missing required setting ({})", ENV_CLIENT_ID),
            );
        }
        if is_blank(&self.google.client_secret) {
            result.add_error(
                "google.client_secret",
                format!("Missing required setting ({})", ENV_CLIENT_SECRET),
            );
        }

        if let Some(redirect) = &self.google.redirect_uri {
            if let Err(e) = Url::parse(redirect) {
                result.add_error("google.redirect_uri", format!("Invalid URL: {}", e));
            }
        }

        for (field, value) in [
            ("google.auth_url", &self.google.auth_url),
            ("google.token_url", &self.google.token_url),
            ("google.calendar_api_base", &self.google.calendar_api_base),
        ] {
            if let Some(url) = value {
                validate_http_url(url, field, &mut result);
            }
        }

        if !self.google.has_refresh_token() {
            result.add_warning(
                "google.refresh_token",
                format!(
                    "{} not set - only get_auth_url will be usable",
                    ENV_REFRESH_TOKEN
                ),
            );
        }

        if self.server.tool_timeout_secs == 0 {
            result.add_error(
                "server.tool_timeout_secs",
                "Tool timeout must be greater than 0",
            );
        } else if self.server.tool_timeout_secs > 600 {
            result.add_warning(
                "server.tool_timeout_secs",
                "Tool timeout is longer than 10 minutes",
            );
        }

        result
    }

    /// `~/.config/gcal-mcp/config.toml` on Linux.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gcal-mcp").join("config.toml"))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn validate_http_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn configured() -> Config {
        let mut config = Config::default();
        config.apply_env(env_from(&[
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
        ]));
        config
    }

    #[test]
    fn test_default_config_is_invalid_without_credentials() {
        let result = Config::default().validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "google.client_id"));
        assert!(result.errors.iter().any(|e| e.field == "google.client_secret"));
    }

    #[test]
    fn test_missing_refresh_token_is_warning() {
        let result = configured().validate();
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "google.refresh_token"));
    }

    #[test]
    fn test_env_overrides_and_blank_values() {
        let mut config = configured();
        config.apply_env(env_from(&[
            (ENV_REFRESH_TOKEN, "   "),
            (ENV_REDIRECT_URI, "http://localhost:8080/callback"),
            (ENV_TOOL_TIMEOUT_SECS, "5"),
        ]));

        assert_eq!(config.google.client_id.as_deref(), Some("id"));
        assert!(config.google.refresh_token.is_none());
        assert_eq!(
            config.google.redirect_uri.as_deref(),
            Some("http://localhost:8080/callback")
        );
        assert_eq!(config.server.tool_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_non_numeric_timeout_keeps_default() {
        let mut config = configured();
        config.apply_env(env_from(&[(ENV_TOOL_TIMEOUT_SECS, "soon")]));
        assert_eq!(config.server.tool_timeout_secs, DEFAULT_TOOL_TIMEOUT_SECS);
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = configured();
        config.server.tool_timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "server.tool_timeout_secs"));
    }

    #[test]
    fn test_invalid_endpoint_scheme() {
        let mut config = configured();
        config.google.token_url = Some("ftp://example.com/token".to_string());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_oob_redirect_is_accepted() {
        let mut config = configured();
        config.google.redirect_uri = Some("urn:ietf:wg:oauth:2.0:oob".to_string());
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_from_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [google]
            client_id = "file-id"
            client_secret = "file-secret"

            [server]
            tool_timeout_secs = 12
            "#,
        )
        .unwrap();

        let mut config = Config::from_file(&path).unwrap();
        assert_eq!(config.google.client_id.as_deref(), Some("file-id"));
        assert_eq!(config.server.tool_timeout_secs, 12);

        config.apply_env(env_from(&[(ENV_CLIENT_ID, "env-id")]));
        assert_eq!(config.google.client_id.as_deref(), Some("env-id"));
        assert_eq!(config.google.client_secret.as_deref(), Some("file-secret"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[google\nclient_id = 1").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_require_credentials() {
        let err = Config::default().google.require_credentials().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting(ref key) if key == ENV_CLIENT_ID));

        let (id, secret) = configured().google.require_credentials().unwrap();
        assert_eq!(id, "id");
        assert_eq!(secret, "secret");
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
