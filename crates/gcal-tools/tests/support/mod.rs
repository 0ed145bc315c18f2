//! In-memory calendar and provider shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use gcal_auth::AuthError;
use gcal_calendar::{ApiEvent, CalendarApi, CalendarError, EventQuery, NewEvent};
use gcal_tools::{CalendarProvider, Dispatcher, Registry};
use parking_lot::Mutex;
use serde_json::json;

pub const FAKE_AUTH_URL: &str = "https://accounts.example.com/auth";

#[derive(Default)]
pub struct CalendarState {
    pub queries: Vec<EventQuery>,
    pub inserts: Vec<(String, NewEvent)>,
    pub events: Vec<ApiEvent>,
}

#[derive(Clone, Default)]
pub struct FakeCalendar {
    pub state: Arc<Mutex<CalendarState>>,
    delay: Option<Duration>,
}

impl CalendarApi for FakeCalendar {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<ApiEvent>, CalendarError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock();
        state.queries.push(query.clone());
        Ok(state
            .events
            .iter()
            .take(query.max_results as usize)
            .cloned()
            .collect())
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<ApiEvent, CalendarError> {
        let mut state = self.state.lock();
        let id = format!("evt{}", state.events.len() + 1);
        let attendees: Vec<_> = event
            .attendees
            .iter()
            .map(|a| json!({"email": a.email, "responseStatus": "needsAction"}))
            .collect();
        let created: ApiEvent = serde_json::from_value(json!({
            "id": id,
            "summary": event.summary,
            "description": event.description,
            "start": {"dateTime": event.start.date_time, "timeZone": event.start.time_zone},
            "end": {"dateTime": event.end.date_time, "timeZone": event.end.time_zone},
            "attendees": attendees,
            "htmlLink": format!("https://calendar.example.com/event?eid={}", id),
        }))
        .map_err(|e| CalendarError::ApiError(e.to_string()))?;

        state.inserts.push((calendar_id.to_string(), event.clone()));
        state.events.push(created.clone());
        Ok(created)
    }
}

pub struct FakeProvider {
    pub calendar: FakeCalendar,
    authorized: bool,
}

impl FakeProvider {
    pub fn authorized() -> Self {
        Self {
            calendar: FakeCalendar::default(),
            authorized: true,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            calendar: FakeCalendar::default(),
            authorized: false,
        }
    }

    /// Every list call sleeps this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.calendar.delay = Some(delay);
        self
    }

    pub fn state(&self) -> Arc<Mutex<CalendarState>> {
        Arc::clone(&self.calendar.state)
    }
}

impl CalendarProvider for FakeProvider {
    type Calendar = FakeCalendar;

    fn authorization_url(&self, scopes: &[&str]) -> String {
        format!(
            "{}?scope={}&access_type=offline",
            FAKE_AUTH_URL,
            scopes.join("+")
        )
    }

    fn calendar(&self) -> Result<FakeCalendar, AuthError> {
        if self.authorized {
            Ok(self.calendar.clone())
        } else {
            Err(AuthError::AuthorizationRequired)
        }
    }
}

pub fn dispatcher(provider: FakeProvider) -> Dispatcher<FakeProvider> {
    Dispatcher::new(Registry::calendar(), provider, Duration::from_secs(5))
}
