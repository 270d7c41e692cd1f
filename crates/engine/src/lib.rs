//! Toolgate engine: tool-call orchestration for LLM agents.
//!
//! This crate takes the tool calls emitted by one model turn, decides which
//! may run, executes them under a concurrency bound, and reports one
//! terminal outcome per call.
//!
//! # Overview
//!
//! - **ToolRegistry**: the seam to whatever actually runs tools (MCP
//!   servers, local functions). [`ToolSet`] is an in-memory implementation.
//! - **Orchestrator**: runs a batch concurrently under a [`BatchPolicy`] and
//!   returns an [`AggregateReport`] in input order.
//! - **StrictAdapter**: runs calls one at a time and interleaves each
//!   outcome into a [`Transcript`] right after the assistant's announcement.
//!
//! # Example
//!
//! ```no_run
//! use engine::{BatchPolicy, Orchestrator, ToolCallRequest, ToolSet};
//! use serde_json::json;
//!
//! # async fn example() -> engine::Result<()> {
//! let tools = ToolSet::new().with("echo", |args| async move { Ok(args["text"].clone()) });
//! let engine = Orchestrator::new(tools);
//!
//! let report = engine
//!     .run_batch(
//!         vec![
//!             ToolCallRequest::new("call_1", "echo", json!({"text": "hi"})),
//!             ToolCallRequest::new("call_2", "rm_rf", json!({})),
//!         ],
//!         &BatchPolicy::strict(4),
//!     )
//!     .await?;
//!
//! assert_eq!(report.summary().rejected, 1);
//! # Ok(())
//! # }
//! ```

pub mod batch;
mod error;
pub mod llm;
mod strict;
pub mod tools;

pub use batch::{
    AggregateReport, CallError, CallState, ErrorKind, Orchestrator, StateKind, Summary,
    ToolCallRecord,
};
pub use error::{Error, Result};
pub use llm::{Message, Part, Role, ToolResult, Transcript};
pub use policy::BatchPolicy;
pub use strict::StrictAdapter;
pub use tools::{
    EmptyRegistry, ToolArguments, ToolCallRequest, ToolError, ToolHandle, ToolRegistry, ToolSet,
    WithTimeout,
};
