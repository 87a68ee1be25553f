//! Work payload abstraction.

use serde_json::Value;

use super::{Operation, OperationFailure};

/// Outcome of a work payload.
pub type WorkResult = Result<Value, OperationFailure>;

/// A unit of work run inside an [`Operation`].
///
/// The operation owns the lifecycle and timing; the work only produces a
/// result value or a failure. It receives the running operation so it can
/// read its id or poll [`Operation::is_cancelled`] before committing side
/// effects.
///
/// Any `FnOnce(&Operation) -> WorkResult + Send` closure is a work payload.
/// Closures usually go straight to [`Operation::run`]; named payload types
/// implement this trait and go through [`Operation::run_work`] or a
/// [`PendingOperation`](super::PendingOperation).
///
/// ```
/// use prometheus_async_op::core::{Operation, OperationFailure, OperationState};
/// use serde_json::json;
///
/// let op = Operation::new();
/// let state = op.run(|op| {
///     if op.id().as_str().is_empty() {
///         return Err(OperationFailure::new(-8, "missing id"));
///     }
///     Ok(json!({ "txid": "abc" }))
/// });
/// assert_eq!(state, OperationState::Success);
/// ```
pub trait OperationWork: Send {
    /// Run the payload to completion.
    fn execute(self: Box<Self>, operation: &Operation) -> WorkResult;
}

impl<F> OperationWork for F
where
    F: FnOnce(&Operation) -> WorkResult + Send,
{
    fn execute(self: Box<Self>, operation: &Operation) -> WorkResult {
        (*self)(operation)
    }
}
