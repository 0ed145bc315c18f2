//! Calendar tool handlers.

use chrono::{DateTime, Utc};
use gcal_auth::CALENDAR_SCOPE;
use gcal_calendar::{CalendarApi, CalendarEvent, EventDateTime, EventQuery, NewAttendee, NewEvent};
use serde::Deserialize;
use serde_json::json;

use crate::protocol::ToolResult;
use crate::provider::CalendarProvider;
use crate::registry::HandlerFuture;
use crate::schema::{Arguments, FieldDefault, FieldSpec, FieldType, InputSchema};

const MAX_RESULTS_LIMIT: i64 = 2500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsArgs {
    pub calendar_id: String,
    pub max_results: u32,
    pub time_min: DateTime<Utc>,
    pub time_max: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventArgs {
    pub calendar_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

fn calendar_id_field() -> FieldSpec {
    FieldSpec::optional(
        "calendarId",
        FieldType::String,
        "Calendar ID (use 'primary' for the main calendar)",
    )
    .with_default(FieldDefault::Value(json!("primary")))
}

pub fn list_events_schema() -> InputSchema {
    InputSchema::new(vec![
        calendar_id_field(),
        FieldSpec::optional(
            "maxResults",
            FieldType::Integer {
                min: 1,
                max: MAX_RESULTS_LIMIT,
            },
            "Maximum number of events to return",
        )
        .with_default(FieldDefault::Value(json!(10))),
        FieldSpec::optional(
            "timeMin",
            FieldType::DateTime,
            "Start of the time range (ISO format). Defaults to now",
        )
        .with_default(FieldDefault::Now),
        FieldSpec::optional("timeMax", FieldType::DateTime, "End of the time range (ISO format)"),
    ])
    .with_ordering("timeMin", "timeMax")
}

pub fn create_event_schema() -> InputSchema {
    InputSchema::new(vec![
        calendar_id_field(),
        FieldSpec::required("summary", FieldType::String, "Event title"),
        FieldSpec::optional("description", FieldType::String, "Event description"),
        FieldSpec::required(
            "startDateTime",
            FieldType::DateTime,
            "Event start time (ISO format, UTC when no offset is given)",
        ),
        FieldSpec::required(
            "endDateTime",
            FieldType::DateTime,
            "Event end time (ISO format, UTC when no offset is given)",
        ),
        FieldSpec::optional(
            "attendees",
            FieldType::EmailList,
            "List of attendee email addresses",
        ),
    ])
    .with_ordering("startDateTime", "endDateTime")
}

/// Consent URL plus the manual steps to obtain a refresh token.
pub fn get_auth_url<P: CalendarProvider>(provider: &P, _args: Arguments) -> HandlerFuture<'_> {
    Box::pin(async move {
        let url = provider.authorization_url(&[CALENDAR_SCOPE]);
        Ok(ToolResult::text(format!(
            "Authorize Google Calendar access by visiting:\n{}\n\n\
             Next steps:\n\
             1. Approve access and copy the authorization code.\n\
             2. Exchange it for a refresh token: gcal-mcp exchange-code <CODE>\n\
             3. Set GOOGLE_REFRESH_TOKEN to the printed value and restart the server.",
            url
        )))
    })
}

pub fn list_events<P: CalendarProvider>(provider: &P, args: Arguments) -> HandlerFuture<'_> {
    Box::pin(async move {
        let args: ListEventsArgs = args.decode()?;

        let query = EventQuery {
            calendar_id: args.calendar_id,
            time_min: args.time_min,
            time_max: args.time_max,
            max_results: args.max_results,
        };

        let calendar = provider.calendar()?;
        let events: Vec<CalendarEvent> = calendar
            .list_events(&query)
            .await?
            .into_iter()
            .map(CalendarEvent::from_api)
            .collect();

        tracing::debug!(count = events.len(), calendar = %query.calendar_id, "list_events");
        Ok(ToolResult::text(serde_json::to_string_pretty(&events)?))
    })
}

pub fn create_event<P: CalendarProvider>(provider: &P, args: Arguments) -> HandlerFuture<'_> {
    Box::pin(async move {
        let CreateEventArgs {
            calendar_id,
            summary,
            description,
            start_date_time,
            end_date_time,
            attendees,
        } = args.decode()?;

        let event = NewEvent {
            summary,
            description,
            start: EventDateTime::utc(start_date_time),
            end: EventDateTime::utc(end_date_time),
            attendees: attendees
                .into_iter()
                .map(|email| NewAttendee { email })
                .collect(),
        };

        let calendar = provider.calendar()?;
        let created = calendar.insert_event(&calendar_id, &event).await?;

        Ok(ToolResult::text(format!(
            "Event created successfully!\nEvent ID: {}\nLink: {}",
            created.id,
            created.html_link.as_deref().unwrap_or("(none)")
        )))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::schema::parse_instant;

    #[test]
    fn test_list_events_defaults() {
        let now = parse_instant("2024-05-01T08:30:00Z").unwrap();
        let args: ListEventsArgs = list_events_schema()
            .normalize(serde_json::Value::Null, now)
            .unwrap()
            .decode()
            .unwrap();

        assert_eq!(args.calendar_id, "primary");
        assert_eq!(args.max_results, 10);
        assert_eq!(args.time_min, now);
        assert!(args.time_max.is_none());
    }

    #[test]
    fn test_create_event_args_decode() {
        let now = Utc::now();
        let args: CreateEventArgs = create_event_schema()
            .normalize(
                json!({
                    "summary": "Standup",
                    "startDateTime": "2024-01-01T10:00:00",
                    "endDateTime": "2024-01-01T10:15:00",
                }),
                now,
            )
            .unwrap()
            .decode()
            .unwrap();

        assert_eq!(args.calendar_id, "primary");
        assert_eq!(
            args.start_date_time,
            parse_instant("2024-01-01T10:00:00Z").unwrap()
        );
        assert!(args.attendees.is_empty());
        assert!(args.description.is_none());
    }

    #[test]
    fn test_schemas_enforce_time_ordering() {
        let now = parse_instant("2024-05-01T08:30:00Z").unwrap();

        let err = list_events_schema()
            .normalize(json!({"timeMax": "2024-04-01T00:00:00Z"}), now)
            .unwrap_err();
        assert_eq!(err.to_string(), "timeMax must be after timeMin");

        let err = create_event_schema()
            .normalize(
                json!({
                    "summary": "Zero length",
                    "startDateTime": "2024-01-01T10:00:00Z",
                    "endDateTime": "2024-01-01T11:00:00+01:00",
                }),
                now,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "endDateTime must be after startDateTime");
    }
}
