//! Calendar-specific error types.

use gcal_auth::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Access token was rejected by Google Calendar; it has been discarded, retry the call")]
    TokenExpired,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: event was modified")]
    Conflict,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// Whether the cached access token should be dropped.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}
