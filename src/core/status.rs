//! Status report handed to the query layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OperationFailure, OperationId, OperationState, ProbeReading};

/// Snapshot of an operation's lifecycle, as returned to external callers.
///
/// `error` is present iff the status is `failed`; `result` and
/// `execution_secs` are present iff the status is `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    /// Operation id.
    pub id: OperationId,
    /// Current state, rendered as its caller-facing name.
    pub status: OperationState,
    /// Creation time, unix seconds.
    pub creation_time: i64,
    /// Failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationFailure>,
    /// Result value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Payload execution time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_secs: Option<f64>,
    /// Probe reading, when a probe is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeReading>,
}

impl OperationStatus {
    /// Render the report as a JSON object.
    pub fn to_value(&self) -> Value {
        // Every field serializes to plain JSON; this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
