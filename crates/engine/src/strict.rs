//! Strict sequential tool-call handling.
//!
//! Used when the transcript itself is the contract: one assistant message
//! announcing every call, then exactly one tool message per call, appended
//! in request order. Each call finishes before the next one starts.

use tracing::{debug, warn};

use crate::llm::{Message, ToolResult, Transcript};
use crate::tools::{ToolArguments, ToolCallRequest, ToolError, ToolRegistry, contain_panics};

/// Executes one call at a time and interleaves results into a transcript.
#[derive(Debug)]
pub struct StrictAdapter<R> {
    registry: R,
    strict: bool,
}

impl<R: ToolRegistry> StrictAdapter<R> {
    /// New adapter with strict gating enabled.
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            strict: true,
        }
    }

    /// Toggle strict gating. When off, unregistered names are attempted and
    /// surface as an ordinary `tool not found` failure.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Append the announcement and one response per request.
    ///
    /// The announcement carries the requests unmodified, even when every
    /// call ends up rejected. Failures never stop the remaining calls.
    pub async fn handle_turn<'t>(
        &self,
        transcript: &'t mut Transcript,
        requests: &[ToolCallRequest],
    ) -> &'t mut Transcript {
        transcript.push(Message::tool_calls(requests.iter().cloned()));

        for request in requests {
            let id = request.id_or_generated();

            let result = match self.registry.lookup(&request.name) {
                None if self.strict => {
                    debug!(%id, name = %request.name, "rejecting unregistered tool");
                    ToolResult::rejected(id, &request.name)
                }
                None => ToolResult::error(id, ToolError::NotFound(request.name.clone())),
                Some(tool) => {
                    debug!(%id, name = %request.name, "executing tool");
                    match self.execute(&tool, request).await {
                        Ok(output) => ToolResult::success(id, &output),
                        Err(error) => {
                            warn!(%id, name = %request.name, %error, "tool call failed");
                            ToolResult::error(id, error)
                        }
                    }
                }
            };

            transcript.push(Message::tool_result(result));
        }

        transcript
    }

    async fn execute(
        &self,
        tool: &R::Tool,
        request: &ToolCallRequest,
    ) -> Result<serde_json::Value, ToolError> {
        let arguments = ToolArguments::decode(&request.arguments)?.into_inner();
        contain_panics(async move { self.registry.execute(tool, arguments).await }).await
    }
}
