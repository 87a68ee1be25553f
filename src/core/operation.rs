//! The operation state machine.
//!
//! An [`Operation`] is created `Ready` by whoever accepts the request, run
//! exactly once by a scheduler thread, and observed by any number of threads
//! through its accessors.
//!
//! # Locking
//!
//! All mutable fields sit behind one `parking_lot::Mutex`. The lock is taken
//! for the `Ready -> Executing` transition (with the timing start), released
//! while the payload runs, and taken again to stop timing and publish the
//! outcome together with the terminal state. Observers are never blocked for
//! the payload's duration, and a terminal state is never visible without its
//! result or error.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::util::clock::now_secs;

use super::{
    ExecutionProbe, ExecutionTiming, OperationFailure, OperationId, OperationState,
    OperationStatus, OperationWork, ProbeReading, WorkResult,
};

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Terminal outcome of a run.
#[derive(Debug, Clone)]
enum Outcome {
    Success(Value),
    Failed(OperationFailure),
}

/// Fields mutated during the lifecycle.
#[derive(Debug)]
struct Inner {
    state: OperationState,
    timing: ExecutionTiming,
    outcome: Option<Outcome>,
    probe: Option<ProbeReading>,
}

impl Inner {
    const fn new() -> Self {
        Self {
            state: OperationState::Ready,
            timing: ExecutionTiming {
                started_at: None,
                finished_at: None,
            },
            outcome: None,
            probe: None,
        }
    }

    fn transition(&mut self, next: OperationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        self.state = next;
    }
}

/// A trackable unit of deferred work.
///
/// ```
/// use prometheus_async_op::core::{Operation, OperationState};
/// use serde_json::json;
///
/// let op = Operation::new();
/// assert!(op.is_ready());
///
/// op.run(|_| Ok(json!("We have a result!")));
///
/// assert_eq!(op.state(), OperationState::Success);
/// assert_eq!(op.result(), Some(json!("We have a result!")));
/// assert_eq!(op.status().to_value()["status"], "success");
/// ```
pub struct Operation {
    id: OperationId,
    creation_time: i64,
    sequence: u64,
    inner: Mutex<Inner>,
    finished: Condvar,
    probe: Option<Arc<dyn ExecutionProbe>>,
}

impl Operation {
    /// Create a `Ready` operation with a fresh id.
    pub fn new() -> Self {
        let op = Self {
            id: OperationId::generate(),
            creation_time: now_secs(),
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            inner: Mutex::new(Inner::new()),
            finished: Condvar::new(),
            probe: None,
        };
        debug!(operation_id = %op.id, "operation created");
        op
    }

    /// Create a `Ready` operation that samples `probe` around its payload.
    pub fn with_probe(probe: Arc<dyn ExecutionProbe>) -> Self {
        Self {
            probe: Some(probe),
            ..Self::new()
        }
    }

    /// Operation id.
    pub const fn id(&self) -> &OperationId {
        &self.id
    }

    /// Creation time, unix seconds.
    pub const fn creation_time(&self) -> i64 {
        self.creation_time
    }

    /// Creation order within this process. Strictly increasing, so it
    /// orders operations created within the same second.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Cancel the operation if it has not started.
    ///
    /// Returns `true` if the operation moved to `Cancelled`. Cancelling an
    /// operation that is executing or already terminal does nothing; an
    /// in-flight payload is never interrupted.
    pub fn cancel(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != OperationState::Ready {
            debug!(operation_id = %self.id, state = %inner.state, "cancel ignored");
            return false;
        }
        inner.transition(OperationState::Cancelled);
        drop(inner);
        self.finished.notify_all();
        info!(operation_id = %self.id, "operation cancelled");
        true
    }

    /// Run `work` and record its outcome.
    ///
    /// Blocks the calling thread for the duration of the payload and returns
    /// the state the operation ends in. A cancelled operation is left
    /// untouched. Running an operation that is not `Ready` is a scheduler
    /// bug: the work is dropped unexecuted and the current state returned.
    pub fn run<F>(&self, work: F) -> OperationState
    where
        F: FnOnce(&Self) -> WorkResult + Send,
    {
        self.run_work(Box::new(work))
    }

    /// Run a boxed work payload. See [`Operation::run`].
    pub fn run_work(&self, work: Box<dyn OperationWork + '_>) -> OperationState {
        let span = info_span!("operation", operation_id = %self.id);
        let _entered = span.enter();

        {
            let mut inner = self.inner.lock();
            match inner.state {
                OperationState::Ready => {
                    inner.transition(OperationState::Executing);
                    inner.timing.start();
                }
                OperationState::Cancelled => {
                    debug!("skipping cancelled operation");
                    return OperationState::Cancelled;
                }
                state => {
                    warn!(%state, "run called on an operation that is not ready");
                    return state;
                }
            }
        }
        debug!("operation executing");

        let probe_before = self.probe.as_ref().and_then(|p| p.sample());
        let result = panic::catch_unwind(AssertUnwindSafe(|| work.execute(self)))
            .unwrap_or_else(|panic| Err(OperationFailure::from_panic(panic.as_ref())));
        let probe_after = self.probe.as_ref().and_then(|p| p.sample());

        let mut inner = self.inner.lock();
        inner.timing.stop();
        let elapsed = inner.timing.elapsed().unwrap_or_default();
        if let Some(probe) = &self.probe {
            inner.probe = Some(ProbeReading::from_samples(probe.name(), probe_before, probe_after));
        }
        let state = match result {
            Ok(value) => {
                inner.outcome = Some(Outcome::Success(value));
                inner.transition(OperationState::Success);
                info!(elapsed_secs = elapsed.as_secs_f64(), "operation succeeded");
                OperationState::Success
            }
            Err(failure) => {
                info!(
                    elapsed_secs = elapsed.as_secs_f64(),
                    code = failure.code,
                    message = %failure.message,
                    "operation failed"
                );
                inner.outcome = Some(Outcome::Failed(failure));
                inner.transition(OperationState::Failed);
                OperationState::Failed
            }
        };
        drop(inner);
        self.finished.notify_all();
        state
    }

    /// Current state.
    pub fn state(&self) -> OperationState {
        self.inner.lock().state
    }

    /// Current state as its caller-facing name.
    pub fn state_as_str(&self) -> &'static str {
        self.state().as_str()
    }

    /// Whether the operation is waiting to run.
    pub fn is_ready(&self) -> bool {
        self.state() == OperationState::Ready
    }

    /// Whether the payload is running.
    pub fn is_executing(&self) -> bool {
        self.state() == OperationState::Executing
    }

    /// Whether the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state() == OperationState::Cancelled
    }

    /// Whether the payload failed.
    pub fn is_failed(&self) -> bool {
        self.state() == OperationState::Failed
    }

    /// Whether the payload produced a result.
    pub fn is_success(&self) -> bool {
        self.state() == OperationState::Success
    }

    /// Whether the operation reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// The failure, if the operation failed.
    pub fn error(&self) -> Option<OperationFailure> {
        match &self.inner.lock().outcome {
            Some(Outcome::Failed(failure)) => Some(failure.clone()),
            _ => None,
        }
    }

    /// The result, if the operation succeeded.
    pub fn result(&self) -> Option<Value> {
        match &self.inner.lock().outcome {
            Some(Outcome::Success(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Payload execution time, once the payload has returned.
    pub fn execution_time(&self) -> Option<Duration> {
        self.inner.lock().timing.elapsed()
    }

    /// Snapshot of the execution timestamps.
    pub fn timing(&self) -> ExecutionTiming {
        self.inner.lock().timing
    }

    /// Status report, taken as one consistent snapshot.
    pub fn status(&self) -> OperationStatus {
        let inner = self.inner.lock();
        let mut status = OperationStatus {
            id: self.id.clone(),
            status: inner.state,
            creation_time: self.creation_time,
            error: None,
            result: None,
            execution_secs: None,
            probe: None,
        };
        match &inner.outcome {
            Some(Outcome::Failed(failure)) => status.error = Some(failure.clone()),
            Some(Outcome::Success(value)) => {
                status.result = Some(value.clone());
                status.execution_secs =
                    Some(inner.timing.elapsed().unwrap_or_default().as_secs_f64());
                status.probe.clone_from(&inner.probe);
            }
            None => {}
        }
        status
    }

    /// Block until the operation is terminal or `timeout` elapses.
    ///
    /// Returns the terminal state, or `None` on timeout.
    pub fn wait_for(&self, timeout: Duration) -> Option<OperationState> {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return Some(inner.state);
        }
        // wait_while_for rechecks on spurious wakeups.
        let _ = self
            .finished
            .wait_while_for(&mut inner, |inner| !inner.state.is_terminal(), timeout);
        let state = inner.state;
        state.is_terminal().then_some(state)
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("creation_time", &self.creation_time)
            .field("sequence", &self.sequence)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// An operation bundled with the work it will run.
///
/// `run` consumes the bundle, so the work executes at most once. The
/// operation handle stays shared: keep a clone of [`PendingOperation::operation`]
/// (or look it up in a registry) to cancel or observe it.
pub struct PendingOperation {
    operation: Arc<Operation>,
    work: Box<dyn OperationWork>,
}

impl PendingOperation {
    /// Bundle a closure with a fresh operation.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce(&Operation) -> WorkResult + Send + 'static,
    {
        Self::from_work(Arc::new(Operation::new()), Box::new(work))
    }

    /// Bundle boxed work with an existing operation.
    pub fn from_work(operation: Arc<Operation>, work: Box<dyn OperationWork>) -> Self {
        Self { operation, work }
    }

    /// Shared handle to the operation.
    pub const fn operation(&self) -> &Arc<Operation> {
        &self.operation
    }

    /// Operation id.
    pub fn id(&self) -> &OperationId {
        self.operation.id()
    }

    /// Run the work on the current thread. See [`Operation::run`].
    pub fn run(self) -> OperationState {
        self.operation.run_work(self.work)
    }
}

impl fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CountingProbe {
        ticks: AtomicU64,
    }

    impl ExecutionProbe for CountingProbe {
        fn name(&self) -> &str {
            "ticks"
        }

        fn sample(&self) -> Option<u64> {
            Some(self.ticks.fetch_add(7, Ordering::SeqCst))
        }
    }

    struct BrokenProbe;

    impl ExecutionProbe for BrokenProbe {
        fn name(&self) -> &str {
            "broken"
        }

        fn sample(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_new_operation_is_ready() {
        let op = Operation::new();
        assert_eq!(op.state(), OperationState::Ready);
        assert_eq!(op.state_as_str(), "queued");
        assert!(op.error().is_none());
        assert!(op.result().is_none());
        assert!(op.timing().started_at.is_none());
        assert!(op.creation_time() > 0);
    }

    #[test]
    fn test_run_success() {
        let op = Operation::new();
        assert_eq!(op.run(|_| Ok(json!({"amount": 5}))), OperationState::Success);
        assert!(op.is_success());
        assert_eq!(op.result(), Some(json!({"amount": 5})));
        assert!(op.error().is_none());
        assert!(op.execution_time().is_some());
    }

    #[test]
    fn test_run_failure() {
        let op = Operation::new();
        assert_eq!(
            op.run(|_| Err(OperationFailure::new(123, "boom"))),
            OperationState::Failed
        );
        assert!(op.is_failed());
        assert_eq!(op.error(), Some(OperationFailure::new(123, "boom")));
        assert!(op.result().is_none());
    }

    #[test]
    fn test_payload_sees_executing_state() {
        let op = Operation::new();
        op.run(|op| {
            assert!(op.is_executing());
            assert!(!op.is_cancelled());
            Ok(Value::Null)
        });
        assert_eq!(op.result(), Some(Value::Null));
    }

    #[test]
    fn test_panicking_payload_fails_operation() {
        let op = Operation::new();
        let state = op.run(|_| panic!("kaboom"));
        assert_eq!(state, OperationState::Failed);
        let error = op.error().unwrap();
        assert_eq!(error.code, crate::core::GENERIC_FAILURE_CODE);
        assert_eq!(error.message, "operation panicked: kaboom");
        assert!(op.timing().finished_at.is_some());
    }

    #[test]
    fn test_second_run_is_ignored() {
        let op = Operation::new();
        op.run(|_| Ok(json!(1)));
        let state = op.run(|_| Ok(json!(2)));
        assert_eq!(state, OperationState::Success);
        assert_eq!(op.result(), Some(json!(1)));
    }

    #[test]
    fn test_cancel_only_from_ready() {
        let op = Operation::new();
        assert!(op.cancel());
        assert!(op.is_cancelled());
        assert!(!op.cancel());

        let done = Operation::new();
        done.run(|_| Ok(json!(1)));
        assert!(!done.cancel());
        assert!(done.is_success());
    }

    #[test]
    fn test_cancel_during_execution_is_ignored() {
        let op = Operation::new();
        op.run(|op| {
            assert!(!op.cancel());
            Ok(json!("kept"))
        });
        assert!(op.is_success());
    }

    #[test]
    fn test_probe_reading_on_success() {
        let probe = Arc::new(CountingProbe {
            ticks: AtomicU64::new(100),
        });
        let op = Operation::with_probe(probe);
        op.run(|_| Ok(json!(true)));

        let status = op.status();
        assert_eq!(
            status.probe,
            Some(ProbeReading {
                name: "ticks".into(),
                units: Some(7),
            })
        );
    }

    #[test]
    fn test_unavailable_probe_reports_null() {
        let op = Operation::with_probe(Arc::new(BrokenProbe));
        op.run(|_| Ok(json!(true)));
        let value = op.status().to_value();
        assert_eq!(value["probe"], json!({"name": "broken", "units": null}));
    }

    #[test]
    fn test_probe_omitted_on_failure() {
        let op = Operation::with_probe(Arc::new(BrokenProbe));
        op.run(|_| Err(OperationFailure::new(1, "no")));
        assert!(op.status().probe.is_none());
    }

    #[test]
    fn test_wait_for_times_out_while_ready() {
        let op = Operation::new();
        assert_eq!(op.wait_for(Duration::from_millis(10)), None);
        op.cancel();
        assert_eq!(
            op.wait_for(Duration::from_millis(10)),
            Some(OperationState::Cancelled)
        );
    }

    #[test]
    fn test_sequence_follows_creation_order() {
        let ops: Vec<_> = (0..64).map(|_| Operation::new()).collect();
        assert!(ops.windows(2).all(|w| w[0].sequence() < w[1].sequence()));
        assert!(Operation::with_probe(Arc::new(BrokenProbe)).sequence() > ops[63].sequence());
    }

    #[test]
    fn test_pending_operation_id_matches_operation() {
        let pending = PendingOperation::new(|_| Ok(json!(null)));
        assert_eq!(pending.id(), pending.operation().id());
    }

    #[test]
    fn test_pending_operation_runs_once() {
        let pending = PendingOperation::new(|_| Ok(json!("done")));
        let op = Arc::clone(pending.operation());
        assert_eq!(pending.id(), op.id());
        assert_eq!(pending.run(), OperationState::Success);
        assert_eq!(op.result(), Some(json!("done")));
    }
}
