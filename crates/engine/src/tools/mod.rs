//! Tool registry seam and tool-call types.

pub mod errors;
mod empty;
mod guard;
mod registry;
mod timeout;
mod toolset;
mod types;

pub use empty::EmptyRegistry;
pub(crate) use guard::contain_panics;
pub use errors::ToolError;
pub use registry::ToolRegistry;
pub use timeout::WithTimeout;
pub use toolset::{ToolHandle, ToolSet};
pub use types::{ToolArguments, ToolCallRequest};
