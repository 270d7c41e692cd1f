//! Panic containment for tool executions.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;

use crate::tools::ToolError;

/// Run one tool execution, turning a panic into [`ToolError::Execution`].
///
/// Pass an `async` block that calls the registry so a panic raised while
/// building the future is caught as well as one raised while polling it.
pub(crate) async fn contain_panics<F>(call: F) -> Result<Value, ToolError>
where
    F: Future<Output = Result<Value, ToolError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Err(ToolError::Execution(format!(
            "tool panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
