//! Conversation types exchanged with the model layer.

mod transcript;
pub mod types;

pub use transcript::Transcript;
pub use types::{Message, Part, Role, ToolResult};
