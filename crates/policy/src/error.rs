//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// Every variant is a caller-contract violation: a batch is never started
/// under a policy that produced one of these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A field holds a value no batch can run with.
    #[error("invalid policy: {0}")]
    Invalid(String),

    /// An environment override could not be interpreted.
    #[error("invalid value for {key}: '{value}' ({expected})")]
    Env {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The policy file is not valid TOML for this schema.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// The policy file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
