//! Core conversation types (provider-agnostic).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::batch::{CallState, ToolCallRecord};
use crate::tools::ToolCallRequest;

/// Role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Outcome of one tool call, as reported back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Tool name, set on rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rendered content.
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result. JSON strings are rendered bare, other values as JSON.
    pub fn success(tool_call_id: impl Into<String>, output: &Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            name: None,
            content: render(output),
            is_error: false,
        }
    }

    /// Failed execution, rendered as `Error: <message>`.
    pub fn error(tool_call_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            name: None,
            content: format!("Error: {message}"),
            is_error: true,
        }
    }

    /// Call refused because the tool is not registered.
    pub fn rejected(tool_call_id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            tool_call_id: tool_call_id.into(),
            content: json!({ "error": "unregistered_tool", "name": name }).to_string(),
            name: Some(name),
            is_error: true,
        }
    }

    /// Render a finished record. Returns `None` for non-terminal records.
    pub fn from_record(record: &ToolCallRecord) -> Option<Self> {
        let id = record.id();
        match record.state() {
            CallState::Ok { result } => Some(Self::success(id, result)),
            CallState::Error { error } => Some(Self::error(id, error)),
            CallState::Rejected { .. } => Some(Self::rejected(id, &record.request.name)),
            CallState::Pending | CallState::Running => None,
        }
    }
}

fn render(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A part of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text content.
    Text { text: String },
    /// Tool call from assistant.
    ToolCall(ToolCallRequest),
    /// Tool result.
    ToolResult(ToolResult),
}

impl Part {
    /// Create a text part.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a message with a role and text content.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Assistant message announcing a set of tool calls.
    pub fn tool_calls(calls: impl IntoIterator<Item = ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            parts: calls.into_iter().map(Part::ToolCall).collect(),
        }
    }

    /// Tool message carrying one result.
    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::Tool,
            parts: vec![Part::ToolResult(result)],
        }
    }

    /// Get combined text content.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all announced tool calls.
    pub fn requested_calls(&self) -> Vec<&ToolCallRequest> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::ToolCall(tc) => Some(tc),
                _ => None,
            })
            .collect()
    }

    /// First tool result in this message, if any.
    pub fn result(&self) -> Option<&ToolResult> {
        self.parts.iter().find_map(|p| match p {
            Part::ToolResult(r) => Some(r),
            _ => None,
        })
    }
}
