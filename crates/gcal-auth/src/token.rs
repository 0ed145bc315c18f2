use oauth2::basic::BasicTokenResponse;
use oauth2::TokenResponse;

/// Seconds before expiry at which a cached access token is renewed.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Refresh token, only present on a code exchange
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    pub scopes: Vec<String>,
}

impl TokenSet {
    pub(crate) fn from_response(response: &BasicTokenResponse) -> Self {
        let expires_in = response
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(3600); // Default 1 hour
        let expires_at = chrono::Utc::now().timestamp() + expires_in;

        let scopes = response
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_default();

        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            expires_at,
            scopes,
        }
    }

    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - REFRESH_MARGIN_SECS
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}
