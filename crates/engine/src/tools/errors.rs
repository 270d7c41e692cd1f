use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::ErrorKind;

/// Errors that can occur during tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("timeout after {0}ms")]
    Timeout(u64),
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Shorthand for an execution failure.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Category reported on the failed record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::ToolNotFound,
            Self::InvalidInput(_) => ErrorKind::ArgumentDecodeError,
            Self::Timeout(_) | Self::Execution(_) => ErrorKind::ExecutionError,
        }
    }
}
