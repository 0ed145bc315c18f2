//! Authentication error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing OAuth client setting: {0}")]
    MissingClientCredentials(&'static str),

    #[error("Invalid {name} URL: {reason}")]
    InvalidEndpoint { name: &'static str, reason: String },

    #[error(
        "Not authorized: no refresh token configured. Call get_auth_url, complete the \
         consent flow, set GOOGLE_REFRESH_TOKEN and restart the server."
    )]
    AuthorizationRequired,

    #[error("Token request failed: {0}")]
    TokenRequest(String),
}
