//! Google Calendar API client.

use chrono::SecondsFormat;
use gcal_auth::AuthorizedClient;
use reqwest::Method;
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The two remote operations the tools need.
///
/// Handlers only see this trait, so tests can swap in an in-memory calendar.
#[allow(async_fn_in_trait)]
pub trait CalendarApi {
    /// events.list with `singleEvents=true&orderBy=startTime`.
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<ApiEvent>, CalendarError>;

    /// events.insert; returns the created record.
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<ApiEvent, CalendarError>;
}

pub struct CalendarClient {
    client: AuthorizedClient,
    base_url: String,
}

impl CalendarClient {
    pub fn new(client: AuthorizedClient) -> Self {
        Self::with_base_url(client, CALENDAR_API_BASE)
    }

    pub fn with_base_url(client: AuthorizedClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        )
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)));
        }

        let err = if status.as_u16() == 401 {
            CalendarError::TokenExpired
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            CalendarError::RateLimited(retry_after)
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            match status.as_u16() {
                400 => CalendarError::InvalidRequest(message),
                403 => CalendarError::Forbidden(message),
                404 => CalendarError::NotFound(message),
                409 => CalendarError::Conflict,
                _ => CalendarError::ApiError(format!("{}: {}", status, message)),
            }
        };

        if err.should_refresh_token() {
            self.client.invalidate_token().await;
        }
        Err(err)
    }
}

impl CalendarApi for CalendarClient {
    #[instrument(skip(self), level = "debug")]
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<ApiEvent>, CalendarError> {
        let mut url = format!(
            "{}?timeMin={}&maxResults={}&singleEvents=true&orderBy=startTime",
            self.events_url(&query.calendar_id),
            urlencoding::encode(&query.time_min.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            query.max_results,
        );

        if let Some(time_max) = query.time_max {
            url.push_str(&format!(
                "&timeMax={}",
                urlencoding::encode(&time_max.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            ));
        }

        let response = self.client.request(Method::GET, &url).await?.send().await?;

        let list: EventListResponse = self.handle_response(response).await?;
        tracing::debug!(count = list.items.len(), "Listed events");
        Ok(list.items)
    }

    #[instrument(skip(self, event), fields(summary = %event.summary), level = "debug")]
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<ApiEvent, CalendarError> {
        let url = self.events_url(calendar_id);

        let response = self
            .client
            .request(Method::POST, &url)
            .await?
            .json(event)
            .send()
            .await?;

        let created: ApiEvent = self.handle_response(response).await?;
        tracing::debug!(id = %created.id, "Created event");
        Ok(created)
    }
}

/// Prefer Google's `error.message`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|r| r.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
