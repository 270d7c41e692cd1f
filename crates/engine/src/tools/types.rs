//! Tool-call request types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::ToolError;

/// A tool call requested by the model.
///
/// Deserializes from either the flat `{"id", "name", "arguments"}` shape or
/// the function-call envelope `{"id", "type", "function": {"name",
/// "arguments"}}`. A missing id deserializes as empty and is synthesized
/// before execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawToolCall")]
pub struct ToolCallRequest {
    /// Correlation token, unique within a batch.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments, either structured JSON or a JSON-encoded string.
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Create a request with a freshly generated id.
    pub fn anonymous(name: impl Into<String>, arguments: Value) -> Self {
        Self::new(generate_id(), name, arguments)
    }

    /// Whether the caller supplied an id.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// The supplied id, or a fresh one if none was supplied.
    pub fn id_or_generated(&self) -> String {
        if self.has_id() {
            self.id.clone()
        } else {
            generate_id()
        }
    }

    /// Fill in a generated id if none was supplied.
    pub fn ensure_id(&mut self) -> &str {
        if !self.has_id() {
            self.id = generate_id();
        }
        &self.id
    }
}

fn generate_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToolCall {
    Envelope {
        #[serde(default)]
        id: Option<RawId>,
        function: RawFunction,
    },
    Flat {
        #[serde(default)]
        id: Option<RawId>,
        name: String,
        #[serde(default)]
        arguments: Value,
    },
}

/// Ids arrive as strings from most providers, but bare numbers show up too.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_id(id: Option<Self>) -> String {
        match id {
            Some(Self::Text(text)) => text,
            Some(Self::Number(n)) => n.to_string(),
            None => String::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawFunction {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl From<RawToolCall> for ToolCallRequest {
    fn from(raw: RawToolCall) -> Self {
        match raw {
            RawToolCall::Envelope { id, function } => {
                Self::new(RawId::into_id(id), function.name, function.arguments)
            }
            RawToolCall::Flat {
                id,
                name,
                arguments,
            } => Self::new(RawId::into_id(id), name, arguments),
        }
    }
}

/// Decoded tool arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments(pub Value);

impl ToolArguments {
    /// Decode a raw argument payload.
    ///
    /// Strings are parsed as JSON; an empty string or `null` becomes `{}`.
    /// Any other value is used as-is.
    pub fn decode(raw: &Value) -> Result<Self, ToolError> {
        match raw {
            Value::Null => Ok(Self(Value::Object(Map::new()))),
            Value::String(encoded) if encoded.trim().is_empty() => {
                Ok(Self(Value::Object(Map::new())))
            }
            Value::String(encoded) => serde_json::from_str(encoded)
                .map(Self)
                .map_err(|e| ToolError::InvalidInput(format!("arguments are not valid JSON: {e}"))),
            other => Ok(Self(other.clone())),
        }
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl TryFrom<&Value> for ToolArguments {
    type Error = ToolError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        Self::decode(raw)
    }
}
