//! In-memory registry of async closures.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;

use crate::tools::{ToolError, ToolRegistry};

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// A resolved tool from a [`ToolSet`].
#[derive(Clone)]
pub struct ToolHandle {
    name: String,
    handler: Handler,
}

impl ToolHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle").field("name", &self.name).finish()
    }
}

/// Registry backed by a map of named async functions.
///
/// Tools can be registered at any time, including while a batch is running.
/// A permissive batch resolves names again at execution time, so a tool
/// registered after gating still runs.
#[derive(Default)]
pub struct ToolSet {
    tools: RwLock<HashMap<String, Handler>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub fn register<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |arguments| f(arguments).boxed());
        self.tools.write().insert(name.into(), handler);
    }

    /// Builder form of [`ToolSet::register`].
    pub fn with<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(name, f);
        self
    }

    /// Remove a tool. Returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.tools.write().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry for ToolSet {
    type Tool = ToolHandle;

    fn lookup(&self, name: &str) -> Option<ToolHandle> {
        self.tools.read().get(name).map(|handler| ToolHandle {
            name: name.to_string(),
            handler: Arc::clone(handler),
        })
    }

    fn execute(
        &self,
        tool: &ToolHandle,
        arguments: Value,
    ) -> impl Future<Output = Result<Value, ToolError>> + Send {
        (tool.handler)(arguments)
    }
}
