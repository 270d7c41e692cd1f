//! Batch orchestration: per-call records, the aggregate report, and the
//! engine that drives a batch to completion.

mod engine;
mod record;
mod report;

pub use engine::Orchestrator;
pub use record::{CallError, CallState, ErrorKind, StateKind, ToolCallRecord};
pub use report::{AggregateReport, Summary};
