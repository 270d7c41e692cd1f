//! Per-call record and its lifecycle.
//!
//! ```text
//! Pending ──► Running ──► Ok
//!    │           └──────► Error
//!    ├──────────────────► Error      (arguments failed to decode)
//!    └──────────────────► Rejected   (strict gate)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::tools::{ToolCallRequest, ToolError};
use crate::{Error, Result};

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Refused by the strict gate; never dispatched.
    Rejected,
    /// Dispatched, but the tool could not be resolved.
    ToolNotFound,
    /// The tool ran and failed.
    ExecutionError,
    /// The argument payload could not be decoded.
    ArgumentDecodeError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::ToolNotFound => "tool_not_found",
            Self::ExecutionError => "execution_error",
            Self::ArgumentDecodeError => "argument_decode_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a failed or rejected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallError {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CallError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

impl From<ToolError> for CallError {
    fn from(error: ToolError) -> Self {
        Self::with_detail(error.kind(), error.to_string())
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Lifecycle state of one tool call.
///
/// Payloads live on the variants, so a successful record cannot also carry
/// an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CallState {
    Pending,
    Running,
    Ok { result: Value },
    Error { error: CallError },
    Rejected { error: CallError },
}

/// Payload-free view of [`CallState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Pending,
    Running,
    Ok,
    Error,
    Rejected,
}

impl CallState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Pending => StateKind::Pending,
            Self::Running => StateKind::Running,
            Self::Ok { .. } => StateKind::Ok,
            Self::Error { .. } => StateKind::Error,
            Self::Rejected { .. } => StateKind::Rejected,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ok { .. } | Self::Error { .. } | Self::Rejected { .. }
        )
    }
}

/// One request and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub request: ToolCallRequest,
    #[serde(flatten)]
    state: CallState,
}

impl ToolCallRecord {
    /// New record in `Pending`.
    pub fn new(request: ToolCallRequest) -> Self {
        Self {
            request,
            state: CallState::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.request.id
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Successful output, present only in `Ok`.
    pub fn result(&self) -> Option<&Value> {
        match &self.state {
            CallState::Ok { result } => Some(result),
            _ => None,
        }
    }

    /// Failure, present only in `Error` or `Rejected`.
    pub fn error(&self) -> Option<&CallError> {
        match &self.state {
            CallState::Error { error } | CallState::Rejected { error } => Some(error),
            _ => None,
        }
    }

    /// `Pending` → `Running`.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            CallState::Pending => {
                self.state = CallState::Running;
                Ok(())
            }
            _ => Err(self.illegal("start")),
        }
    }

    /// `Running` → `Ok`.
    pub fn complete(&mut self, result: Value) -> Result<()> {
        match self.state {
            CallState::Running => {
                self.state = CallState::Ok { result };
                Ok(())
            }
            _ => Err(self.illegal("complete")),
        }
    }

    /// `Pending` or `Running` → `Error`.
    pub fn fail(&mut self, error: CallError) -> Result<()> {
        match self.state {
            CallState::Pending | CallState::Running => {
                self.state = CallState::Error { error };
                Ok(())
            }
            _ => Err(self.illegal("fail")),
        }
    }

    /// `Pending` → `Rejected`.
    pub fn reject(&mut self, error: CallError) -> Result<()> {
        match self.state {
            CallState::Pending => {
                self.state = CallState::Rejected { error };
                Ok(())
            }
            _ => Err(self.illegal("reject")),
        }
    }

    fn illegal(&self, transition: &str) -> Error {
        Error::InvalidState(format!(
            "cannot {transition} tool call {} in state {:?}",
            self.request.id,
            self.state.kind()
        ))
    }
}
