//! Operation lifecycle states.
//!
//! ```text
//! Ready ──run──▶ Executing ──ok──▶ Success
//!   │                 └────err──▶ Failed
//!   └──cancel──▶ Cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
    /// Created and waiting to be run.
    #[serde(rename = "queued")]
    Ready,
    /// The work payload is running.
    #[serde(rename = "executing")]
    Executing,
    /// Cancelled before it started.
    #[serde(rename = "cancelled")]
    Cancelled,
    /// The work payload failed.
    #[serde(rename = "failed")]
    Failed,
    /// The work payload produced a result.
    #[serde(rename = "success")]
    Success,
}

impl OperationState {
    /// All states, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Ready,
        Self::Executing,
        Self::Cancelled,
        Self::Failed,
        Self::Success,
    ];

    /// Name reported to callers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "queued",
            Self::Executing => "executing",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Success => "success",
        }
    }

    /// Whether no further transition can happen.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed | Self::Success)
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Ready, Self::Executing | Self::Cancelled)
                | (Self::Executing, Self::Success | Self::Failed)
        )
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for OperationState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}
