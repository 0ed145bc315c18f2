//! Tool layer for the Google Calendar MCP server.
//!
//! A fixed [`Registry`] of capabilities, the [`Dispatcher`] that validates
//! arguments and turns every outcome into a [`ToolResult`], the calendar
//! handlers, and the stdio JSON-RPC [`McpServer`] that carries it all.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod schema;
pub mod server;

pub use dispatch::Dispatcher;
pub use error::ToolError;
pub use protocol::{ContentItem, ToolInvocation, ToolResult};
pub use provider::{CalendarProvider, GoogleCalendarProvider};
pub use registry::{Capability, HandlerFn, HandlerFuture, Registry};
pub use schema::{Arguments, FieldDefault, FieldSpec, FieldType, InputSchema};
pub use server::{McpServer, PROTOCOL_VERSION};
