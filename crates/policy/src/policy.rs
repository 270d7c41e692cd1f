//! Batch policy configuration and gating.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Strict gating unless configured otherwise.
pub const DEFAULT_STRICT: bool = true;

/// Concurrency bound used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Environment variable toggling strict mode.
pub const ENV_STRICT_TOOLS: &str = "TOOLGATE_STRICT_TOOLS";

/// Environment variable overriding the concurrency bound.
pub const ENV_MAX_CONCURRENCY: &str = "TOOLGATE_MAX_CONCURRENCY";

/// Policy applied to one batch of tool calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPolicy {
    /// Reject unregistered tool names before dispatch.
    #[serde(default = "default_strict")]
    pub strict: bool,

    /// Maximum number of calls running at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_strict() -> bool {
    DEFAULT_STRICT
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            strict: DEFAULT_STRICT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Result of gating a single tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The tool is registered; run it once a slot frees up.
    Dispatch,
    /// The tool is unknown but may resolve at execution time.
    Defer,
    /// The call must not run.
    Reject { reason: String },
}

impl Decision {
    /// Whether the call will be handed to the worker pool.
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, Decision::Reject { .. })
    }
}

impl BatchPolicy {
    /// Strict policy with the given bound.
    pub fn strict(max_concurrency: usize) -> Self {
        Self {
            strict: true,
            max_concurrency,
        }
    }

    /// Permissive policy with the given bound.
    pub fn permissive(max_concurrency: usize) -> Self {
        Self {
            strict: false,
            max_concurrency,
        }
    }

    /// Load policy from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse policy from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let policy: Self = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check that the policy can drive a batch.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::Invalid(
                "max_concurrency must be a positive integer".into(),
            ));
        }
        Ok(())
    }

    /// Overlay environment overrides read through `lookup`.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_STRICT_TOOLS) {
            self.strict = parse_flag(&raw).ok_or(Error::Env {
                key: ENV_STRICT_TOOLS,
                value: raw,
                expected: "a boolean",
            })?;
        }

        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            self.max_concurrency = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Env {
                        key: ENV_MAX_CONCURRENCY,
                        value: raw,
                        expected: "a positive integer",
                    });
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Decide what happens to a call given whether its tool is registered.
    pub fn gate(&self, registered: bool) -> Decision {
        match (registered, self.strict) {
            (true, _) => Decision::Dispatch,
            (false, true) => Decision::Reject {
                reason: "tool is not registered".to_string(),
            },
            (false, false) => Decision::Defer,
        }
    }
}

/// Parse a boolean switch as written in environment variables.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
