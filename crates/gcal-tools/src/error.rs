//! Failures a tool call can end in. The dispatcher is the only place these
//! become protocol output.

use std::time::Duration;

use gcal_auth::AuthError;
use gcal_calendar::CalendarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Tool call timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
}
