//! Tool registry trait.

use crate::tools::ToolError;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Trait for tool registries.
///
/// Implementations resolve tool names to executable handles and run them.
/// This is the boundary between the orchestration engine and side effects.
pub trait ToolRegistry: Send + Sync {
    /// Handle to a resolved tool.
    type Tool: Send + Sync;

    /// Resolve a tool by name. Must not have side effects.
    fn lookup(&self, name: &str) -> Option<Self::Tool>;

    /// Execute a resolved tool with decoded arguments.
    fn execute(
        &self,
        tool: &Self::Tool,
        arguments: Value,
    ) -> impl Future<Output = Result<Value, ToolError>> + Send;
}

impl<R: ToolRegistry> ToolRegistry for Arc<R> {
    type Tool = R::Tool;

    fn lookup(&self, name: &str) -> Option<Self::Tool> {
        (**self).lookup(name)
    }

    fn execute(
        &self,
        tool: &Self::Tool,
        arguments: Value,
    ) -> impl Future<Output = Result<Value, ToolError>> + Send {
        (**self).execute(tool, arguments)
    }
}
