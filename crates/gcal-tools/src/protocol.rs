//! Tool invocation and result envelopes, shaped as MCP `tools/call` params
//! and results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// `tools/call` params. Consumed once by the dispatcher.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// The one error shape callers ever see: `"Error: <message>"`.
    pub fn from_error(err: &ToolError) -> Self {
        Self {
            content: vec![ContentItem::Text {
                text: format!("Error: {}", err),
            }],
            is_error: true,
        }
    }

    /// Text of the first content item.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|item| match item {
            ContentItem::Text { text } => text.as_str(),
        })
    }
}
