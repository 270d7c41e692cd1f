//! Per-call timeout wrapper.

use std::time::Duration;

use serde_json::Value;

use crate::tools::{ToolError, ToolRegistry};

/// Bounds every execution of the wrapped registry.
///
/// Expiry surfaces as [`ToolError::Timeout`], an ordinary execution failure.
/// The engine itself never times calls out.
#[derive(Debug, Clone)]
pub struct WithTimeout<R> {
    inner: R,
    timeout: Duration,
}

impl<R> WithTimeout<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<R: ToolRegistry> ToolRegistry for WithTimeout<R> {
    type Tool = R::Tool;

    fn lookup(&self, name: &str) -> Option<Self::Tool> {
        self.inner.lookup(name)
    }

    async fn execute(&self, tool: &Self::Tool, arguments: Value) -> Result<Value, ToolError> {
        let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        tokio::time::timeout(self.timeout, self.inner.execute(tool, arguments))
            .await
            .map_err(|_| ToolError::Timeout(millis))?
    }
}
