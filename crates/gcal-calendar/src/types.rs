//! Calendar API types and data structures.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// API Response Types

/// Google Calendar API event response. Only the fields the tools read are
/// declared; the rest of Google's payload is skipped on deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
    pub html_link: Option<String>,
}

/// Either `dateTime` (timed event) or `date` (all-day event) is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl ApiEventTime {
    /// Timed value when present, otherwise the all-day date.
    pub fn display_value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Resource attendees (rooms) carry no email.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAttendee {
    pub email: Option<String>,
}

/// API response for event list. Only the first page is read, so
/// `nextPageToken` is not declared.
#[derive(Debug, Deserialize)]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

/// Google error envelope: `{"error": {"code": 404, "message": "Not Found"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

// Request Types

/// Parameters for an events.list call. Recurring events are always expanded
/// and ordered by start time.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub calendar_id: String,
    pub time_min: DateTime<Utc>,
    pub time_max: Option<DateTime<Utc>>,
    pub max_results: u32,
}

/// Payload for events.insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<NewAttendee>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

impl EventDateTime {
    /// An instant pinned to the UTC zone.
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            time_zone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAttendee {
    pub email: String,
}

// View Types

/// Event as returned to tool callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
}

impl CalendarEvent {
    /// Reshape a remote event. Start/end strings are kept verbatim.
    pub fn from_api(api: ApiEvent) -> Self {
        let start = api
            .start
            .as_ref()
            .and_then(ApiEventTime::display_value)
            .unwrap_or_default()
            .to_string();
        let end = api
            .end
            .as_ref()
            .and_then(ApiEventTime::display_value)
            .unwrap_or_default()
            .to_string();

        let attendees: Vec<String> = api.attendees.into_iter().filter_map(|a| a.email).collect();

        Self {
            id: api.id,
            summary: api.summary.unwrap_or_default(),
            start,
            end,
            description: api.description,
            attendees: (!attendees.is_empty()).then_some(attendees),
        }
    }
}
