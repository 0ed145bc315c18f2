//! Source of authorization URLs and authorized calendar clients.

use std::sync::Arc;

use gcal_auth::{AuthError, CredentialManager};
use gcal_calendar::{CalendarApi, CalendarClient, CALENDAR_API_BASE};

/// Seam between the handlers and Google.
///
/// The production implementation wraps a [`CredentialManager`]; tests supply
/// an in-memory calendar.
pub trait CalendarProvider {
    type Calendar: CalendarApi;

    /// Consent URL for the given scopes. Must not perform I/O.
    fn authorization_url(&self, scopes: &[&str]) -> String;

    /// A calendar client bound to the current credentials.
    ///
    /// # Errors
    ///
    /// [`AuthError::AuthorizationRequired`] when no refresh token is configured.
    fn calendar(&self) -> Result<Self::Calendar, AuthError>;
}

pub struct GoogleCalendarProvider {
    credentials: Arc<CredentialManager>,
    api_base: String,
}

impl GoogleCalendarProvider {
    pub fn new(credentials: Arc<CredentialManager>, api_base: Option<&str>) -> Self {
        Self {
            credentials,
            api_base: api_base.unwrap_or(CALENDAR_API_BASE).to_string(),
        }
    }
}

impl CalendarProvider for GoogleCalendarProvider {
    type Calendar = CalendarClient;

    fn authorization_url(&self, scopes: &[&str]) -> String {
        self.credentials.authorization_url(scopes)
    }

    fn calendar(&self) -> Result<CalendarClient, AuthError> {
        let client = self.credentials.authenticated_client()?;
        Ok(CalendarClient::with_base_url(client, &self.api_base))
    }
}
