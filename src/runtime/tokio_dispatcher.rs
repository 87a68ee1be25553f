//! Tokio dispatch adapter.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::{OperationState, PendingOperation};

/// Runs pending operations on a tokio runtime's blocking thread pool.
///
/// Operation payloads block their thread, so they go to `spawn_blocking`
/// rather than onto the async workers.
#[derive(Clone)]
pub struct TokioDispatcher {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioDispatcher {
    /// Create a dispatcher from a tokio runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Create a dispatcher for the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Run `pending` on the blocking pool.
    ///
    /// The join handle resolves to the state the operation ended in.
    pub fn dispatch(&self, pending: PendingOperation) -> JoinHandle<OperationState> {
        debug!(operation_id = %pending.id(), "dispatching operation");
        self.handle.spawn_blocking(move || pending.run())
    }
}
