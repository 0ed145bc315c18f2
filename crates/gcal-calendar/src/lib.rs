//! Google Calendar v3 client for the calendar tools.
//!
//! Provides the [`CalendarApi`] seam, its HTTP implementation and the
//! remote/view types the handlers reshape between.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CalendarApi, CalendarClient, CALENDAR_API_BASE};
pub use error::CalendarError;
pub use types::{ApiEvent, CalendarEvent, EventDateTime, EventQuery, NewAttendee, NewEvent};
