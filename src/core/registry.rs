//! Id-indexed tracking of live operations.
//!
//! The registry is the surface a query layer sits on: it maps ids to shared
//! operation handles and produces status reports in bulk. It never runs work
//! itself; [`OperationRegistry::submit`] hands back a [`PendingOperation`]
//! for the caller's scheduler to run.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;

use super::{
    Operation, OperationId, OperationState, OperationStatus, PendingOperation, RegistryError,
    WorkResult,
};

/// Thread-safe map from operation id to operation.
///
/// Lookups take a read lock; tracking and removal take a brief write lock.
/// Operations never touch the registry, so holding an operation's lock
/// under the map lock cannot deadlock.
pub struct OperationRegistry {
    config: RegistryConfig,
    operations: RwLock<HashMap<OperationId, Arc<Operation>>>,
}

impl OperationRegistry {
    /// Create an empty registry.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate().map_err(RegistryError::InvalidConfig)?;
        info!(
            max_tracked = config.max_tracked,
            evict_finished = config.evict_finished,
            "operation registry initialized"
        );
        Ok(Self {
            config,
            operations: RwLock::new(HashMap::new()),
        })
    }

    /// Registry configuration.
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create and track an operation for `work`.
    ///
    /// The returned bundle is handed to a scheduler; the operation is
    /// visible to queries immediately, in the `queued` state.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Full` if the registry cannot take another
    /// operation.
    pub fn submit<F>(&self, work: F) -> Result<PendingOperation, RegistryError>
    where
        F: FnOnce(&Operation) -> WorkResult + Send + 'static,
    {
        let pending = PendingOperation::new(work);
        self.track(Arc::clone(pending.operation()))?;
        Ok(pending)
    }

    /// Track an existing operation.
    ///
    /// # Errors
    ///
    /// - `RegistryError::Duplicate` if the id is already tracked
    /// - `RegistryError::Full` if the limit is reached and nothing can be evicted
    pub fn track(&self, operation: Arc<Operation>) -> Result<(), RegistryError> {
        let mut operations = self.operations.write();
        if operations.contains_key(operation.id()) {
            return Err(RegistryError::Duplicate(operation.id().to_string()));
        }
        if operations.len() >= self.config.max_tracked {
            let evicted = self
                .config
                .evict_finished
                .then(|| oldest_finished(&operations))
                .flatten();
            let Some(evicted) = evicted else {
                warn!(limit = self.config.max_tracked, "operation registry is full");
                return Err(RegistryError::Full {
                    limit: self.config.max_tracked,
                });
            };
            operations.remove(&evicted);
            debug!(operation_id = %evicted, "evicted finished operation");
        }
        debug!(operation_id = %operation.id(), "operation tracked");
        operations.insert(operation.id().clone(), operation);
        Ok(())
    }

    /// Look up an operation.
    pub fn get(&self, id: &str) -> Option<Arc<Operation>> {
        self.operations.read().get(id).cloned()
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: &str) -> bool {
        self.operations.read().contains_key(id)
    }

    /// Number of tracked operations.
    pub fn len(&self) -> usize {
        self.operations.read().len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.operations.read().is_empty()
    }

    /// Stop tracking an operation, returning it.
    pub fn remove(&self, id: &str) -> Option<Arc<Operation>> {
        self.operations.write().remove(id)
    }

    /// Cancel a tracked operation.
    ///
    /// Returns `None` for an unknown id, otherwise whether the operation
    /// moved to `Cancelled`.
    pub fn cancel(&self, id: &str) -> Option<bool> {
        self.get(id).map(|op| op.cancel())
    }

    /// Ids of tracked operations, optionally only those in `filter` state.
    ///
    /// Sorted oldest first.
    pub fn ids(&self, filter: Option<OperationState>) -> Vec<OperationId> {
        let mut ops: Vec<_> = self
            .snapshot()
            .into_iter()
            .filter(|op| filter.is_none_or(|state| op.state() == state))
            .collect();
        sort_by_age(&mut ops);
        ops.into_iter().map(|op| op.id().clone()).collect()
    }

    /// Status reports for `ids`, or for every tracked operation when `ids`
    /// is empty. Unknown ids are skipped.
    pub fn statuses<S: AsRef<str>>(&self, ids: &[S]) -> Vec<OperationStatus> {
        self.select(ids).iter().map(|op| op.status()).collect()
    }

    /// Status reports for the finished operations among `ids` (all tracked
    /// operations when `ids` is empty), which stop being tracked.
    ///
    /// Operations still queued or executing stay tracked and are not
    /// reported.
    pub fn take_finished<S: AsRef<str>>(&self, ids: &[S]) -> Vec<OperationStatus> {
        let mut reports = Vec::new();
        for op in self.select(ids) {
            let status = op.status();
            if !status.status.is_terminal() {
                continue;
            }
            // Terminal states are final, so the report stays accurate after removal.
            if self.operations.write().remove(op.id()).is_some() {
                reports.push(status);
            }
        }
        reports
    }

    fn snapshot(&self) -> Vec<Arc<Operation>> {
        self.operations.read().values().cloned().collect()
    }

    fn select<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Arc<Operation>> {
        if ids.is_empty() {
            let mut ops = self.snapshot();
            sort_by_age(&mut ops);
            return ops;
        }
        let operations = self.operations.read();
        ids.iter()
            .filter_map(|id| operations.get(id.as_ref()).cloned())
            .collect()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self {
            config: RegistryConfig::default(),
            operations: RwLock::new(HashMap::new()),
        }
    }
}

fn sort_by_age(ops: &mut [Arc<Operation>]) {
    ops.sort_by_key(|op| op.sequence());
}

fn oldest_finished(operations: &HashMap<OperationId, Arc<Operation>>) -> Option<OperationId> {
    operations
        .values()
        .filter(|op| op.is_finished())
        .min_by_key(|op| op.sequence())
        .map(|op| op.id().clone())
}
