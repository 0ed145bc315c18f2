//! OAuth2 client configuration.

use crate::error::AuthError;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Out-of-band redirect sentinel: the consent page shows the code instead of
/// redirecting. Not every Google client type accepts it, so it is only the
/// fallback when no redirect URI is configured.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// OAuth2 configuration
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Client ID from OAuth provider
    pub client_id: String,

    /// Client secret from OAuth provider
    pub client_secret: String,

    /// Authorization endpoint URL
    pub auth_url: String,

    /// Token endpoint URL
    pub token_url: String,

    /// Redirect URI registered for the client
    pub redirect_uri: String,

    /// Refresh token supplied at startup, never rewritten by this process
    pub refresh_token: Option<String>,
}

impl OAuth2Config {
    /// Google endpoints with the out-of-band redirect.
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            redirect_uri: OOB_REDIRECT_URI.to_string(),
            refresh_token: None,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: Option<String>) -> Self {
        if let Some(uri) = redirect_uri {
            self.redirect_uri = uri;
        }
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Override the authorization and token endpoints (tests, proxies).
    pub fn with_endpoints(mut self, auth_url: Option<String>, token_url: Option<String>) -> Self {
        if let Some(url) = auth_url {
            self.auth_url = url;
        }
        if let Some(url) = token_url {
            self.token_url = url;
        }
        self
    }

    /// Client ID and secret are the only settings that cannot be defaulted.
    pub fn ensure_client_credentials(&self) -> Result<(), AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::MissingClientCredentials("client_id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(AuthError::MissingClientCredentials("client_secret"));
        }
        Ok(())
    }
}
