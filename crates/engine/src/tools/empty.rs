//! Empty registry implementation.

use crate::tools::{ToolError, ToolRegistry};
use serde_json::Value;
use std::convert::Infallible;

/// A registry with no tools.
///
/// Useful for testing or when tools are not needed.
#[derive(Debug, Default)]
pub struct EmptyRegistry;

impl ToolRegistry for EmptyRegistry {
    type Tool = Infallible;

    fn lookup(&self, _name: &str) -> Option<Infallible> {
        None
    }

    async fn execute(&self, tool: &Infallible, _arguments: Value) -> Result<Value, ToolError> {
        match *tool {}
    }
}
