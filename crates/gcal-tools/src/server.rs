//! MCP server over newline-delimited JSON-RPC 2.0.

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatch::Dispatcher;
use crate::error::ToolError;
use crate::protocol::{ToolInvocation, ToolResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "gcal-mcp";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
struct Request {
    /// `null` both for an explicit `"id": null` and for an absent member.
    #[serde(default)]
    id: Value,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
}

pub struct McpServer<P> {
    dispatcher: Dispatcher<P>,
    version: &'static str,
}

impl<P> McpServer<P> {
    pub fn new(dispatcher: Dispatcher<P>) -> Self {
        Self {
            dispatcher,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Read requests line by line until EOF, answering each in order.
    ///
    /// # Errors
    ///
    /// Only I/O failures on the transport end the loop.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let mut frame = serde_json::to_string(&response)?;
                frame.push('\n');
                writer.write_all(frame.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::debug!("stdin closed, shutting down");
        Ok(())
    }

    /// Response for one frame, or `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Unparseable frame: {}", e);
                return Some(error_response(Value::Null, PARSE_ERROR, "Parse error"));
            }
        };

        if !value.is_object() {
            return Some(error_response(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: expected a single JSON object",
            ));
        }

        // Notifications are told apart by the absence of the member, not its value.
        let is_notification = value.get("id").is_none();

        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(_) => {
                return Some(error_response(
                    Value::Null,
                    INVALID_REQUEST,
                    "Invalid Request",
                ))
            }
        };

        self.handle_request(request, is_notification).await
    }

    async fn handle_request(&self, request: Request, is_notification: bool) -> Option<Value> {
        let id = request.id;
        let Some(method) = request.method else {
            return Some(error_response(
                id,
                INVALID_REQUEST,
                "Invalid Request: missing method",
            ));
        };

        if is_notification {
            tracing::debug!(%method, "Notification");
            return None;
        }

        tracing::debug!(%method, "Request");
        let result = match method.as_str() {
            "initialize" => json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": self.version },
            }),
            "ping" => json!({}),
            "tools/list" => self.dispatcher.registry().catalog(),
            "tools/call" => {
                let result = match serde_json::from_value::<ToolInvocation>(request.params) {
                    Ok(invocation) => self.dispatcher.handle(invocation).await,
                    Err(e) => ToolResult::from_error(&ToolError::invalid(format!(
                        "Invalid tool call: {}",
                        e
                    ))),
                };
                match serde_json::to_value(result) {
                    Ok(value) => value,
                    Err(e) => return Some(error_response(id, INTERNAL_ERROR, &e.to_string())),
                }
            }
            other => {
                return Some(error_response(
                    id,
                    METHOD_NOT_FOUND,
                    &format!("Method not found: {}", other),
                ))
            }
        };

        Some(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}
