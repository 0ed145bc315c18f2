//! Fixed catalog of capabilities.

use std::future::Future;
use std::pin::Pin;

use serde_json::{json, Value};

use crate::error::ToolError;
use crate::handlers;
use crate::protocol::ToolResult;
use crate::provider::CalendarProvider;
use crate::schema::{Arguments, InputSchema};

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + 'a>>;

/// Handlers borrow the provider for the duration of one call.
pub type HandlerFn<P> = for<'a> fn(&'a P, Arguments) -> HandlerFuture<'a>;

pub struct Capability<P> {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: InputSchema,
    pub handler: HandlerFn<P>,
}

impl<P> Capability<P> {
    /// `tools/list` entry.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.to_json(),
        })
    }
}

pub struct Registry<P> {
    capabilities: Vec<Capability<P>>,
}

impl<P> Registry<P> {
    /// Later entries reusing an earlier name are dropped.
    pub fn new(capabilities: Vec<Capability<P>>) -> Self {
        let mut unique: Vec<Capability<P>> = Vec::with_capacity(capabilities.len());
        for capability in capabilities {
            if unique.iter().any(|c| c.name == capability.name) {
                tracing::debug!(name = capability.name, "Duplicate capability ignored");
                continue;
            }
            unique.push(capability);
        }
        Self {
            capabilities: unique,
        }
    }

    /// Capabilities in registration order.
    pub fn list(&self) -> &[Capability<P>] {
        &self.capabilities
    }

    pub fn resolve(&self, name: &str) -> Option<&Capability<P>> {
        self.capabilities.iter().find(|c| c.name == name)
    }

    /// `tools/list` result body.
    pub fn catalog(&self) -> Value {
        let tools: Vec<Value> = self.capabilities.iter().map(Capability::descriptor).collect();
        json!({ "tools": tools })
    }
}

impl<P: CalendarProvider> Registry<P> {
    /// The three calendar tools: `get_auth_url`, `list_events`, `create_event`.
    pub fn calendar() -> Self {
        Self::new(vec![
            Capability {
                name: "get_auth_url",
                description: "Get the Google OAuth2 authorization URL for Calendar access",
                input_schema: InputSchema::empty(),
                handler: handlers::get_auth_url::<P>,
            },
            Capability {
                name: "list_events",
                description: "List upcoming events from a Google Calendar",
                input_schema: handlers::list_events_schema(),
                handler: handlers::list_events::<P>,
            },
            Capability {
                name: "create_event",
                description: "Create a new event in a Google Calendar",
                input_schema: handlers::create_event_schema(),
                handler: handlers::create_event::<P>,
            },
        ])
    }
}
