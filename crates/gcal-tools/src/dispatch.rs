//! Dispatch engine: resolve, validate, invoke with a deadline, and convert
//! every failure into an error [`ToolResult`].

use std::time::Duration;

use chrono::Utc;
use tracing::instrument;

use crate::error::ToolError;
use crate::protocol::{ToolInvocation, ToolResult};
use crate::registry::Registry;

pub struct Dispatcher<P> {
    registry: Registry<P>,
    provider: P,
    timeout: Duration,
}

impl<P> Dispatcher<P> {
    pub fn new(registry: Registry<P>, provider: P, timeout: Duration) -> Self {
        Self {
            registry,
            provider,
            timeout,
        }
    }

    pub fn registry(&self) -> &Registry<P> {
        &self.registry
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Never fails: errors come back as `isError` results.
    #[instrument(skip(self, invocation), fields(tool = %invocation.name), level = "debug")]
    pub async fn handle(&self, invocation: ToolInvocation) -> ToolResult {
        match self.try_handle(invocation).await {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!("Tool call failed: {}", err);
                ToolResult::from_error(&err)
            }
        }
    }

    async fn try_handle(&self, invocation: ToolInvocation) -> Result<ToolResult, ToolError> {
        let capability = self
            .registry
            .resolve(&invocation.name)
            .ok_or_else(|| ToolError::UnknownTool(invocation.name.clone()))?;

        let arguments = capability
            .input_schema
            .normalize(invocation.arguments, Utc::now())?;

        let call = (capability.handler)(&self.provider, arguments);
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ToolError::Timeout(self.timeout))?
    }
}
