//! Error types for operations and the registry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code reported when a payload fails without a code of its own
/// (an `anyhow` error or a panic).
pub const GENERIC_FAILURE_CODE: i64 = -1;

/// Failure reported by an operation's work payload.
///
/// The code scheme belongs to the payload and its caller; the operation only
/// stores and reports it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct OperationFailure {
    /// Caller-defined error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl OperationFailure {
    /// Build a failure from a code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build a failure from a caught panic payload.
    pub(crate) fn from_panic(panic: &(dyn std::any::Any + Send)) -> Self {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".into());
        Self::new(GENERIC_FAILURE_CODE, format!("operation panicked: {detail}"))
    }
}

impl From<anyhow::Error> for OperationFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(GENERIC_FAILURE_CODE, format!("{err:#}"))
    }
}

/// Errors produced by the operation registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry already tracks its configured maximum.
    #[error("registry full: {limit} operations tracked")]
    Full {
        /// Configured maximum.
        limit: usize,
    },
    /// An operation with the same id is already tracked.
    #[error("duplicate operation id: {0}")]
    Duplicate(String),
    /// The text is not a well-formed operation id.
    #[error("invalid operation id: {0}")]
    InvalidId(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
