//! Gating policy for tool-call batches.
//!
//! Core principle: **an unregistered tool name never reaches execution in
//! strict mode.** Permissive mode defers the failure to execution time so
//! that lazily-registered tools can still resolve.

mod error;
mod policy;

pub use error::{Error, Result};
pub use policy::{
    BatchPolicy, DEFAULT_MAX_CONCURRENCY, DEFAULT_STRICT, Decision, ENV_MAX_CONCURRENCY,
    ENV_STRICT_TOOLS, parse_flag,
};
