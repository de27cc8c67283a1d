//! The live workspace: current snapshot plus the store behind it.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::error::Result;

use super::solution::Solution;
use super::store::{DocumentStore, PendingWrite};

/// Owns the current [`Solution`]. Readers get an `Arc` to an immutable
/// snapshot; [`Workspace::try_apply_changes`] is the only writer.
pub struct Workspace {
    current: RwLock<Arc<Solution>>,
    commit_lock: Mutex<()>,
    store: Arc<dyn DocumentStore>,
}

impl Workspace {
    pub fn new(solution: Solution, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            current: RwLock::new(Arc::new(solution)),
            commit_lock: Mutex::new(()),
            store,
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn current_solution(&self) -> Arc<Solution> {
        Arc::clone(&self.current.read())
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Compare-and-swap the live snapshot.
    ///
    /// Returns `Ok(false)` when `proposed` was derived from a version other
    /// than the live one. Returns `Err` when the store fails; the snapshot is
    /// left as it was in both cases.
    pub fn try_apply_changes(&self, proposed: Solution) -> Result<bool> {
        let _guard = self.commit_lock.lock();
        let live = self.current_solution();

        if proposed.version() != live.version() {
            warn!(
                base = proposed.version(),
                live = live.version(),
                "rejecting change set built against a stale snapshot"
            );
            return Ok(false);
        }

        let writes: Vec<PendingWrite> = proposed
            .changed_documents(&live)
            .into_iter()
            .filter_map(|id| {
                let new_doc = proposed.document(id)?;
                let previous = live
                    .document(id)
                    .map_or_else(|| Arc::from(""), super::Document::shared_text);
                Some(PendingWrite {
                    path: new_doc.path().to_path_buf(),
                    previous,
                    text: new_doc.shared_text(),
                })
            })
            .collect();

        self.store.write_all(&writes)?;

        let next_version = live.version() + 1;
        *self.current.write() = Arc::new(proposed.with_version(next_version));
        info!(version = next_version, files = writes.len(), "committed change set");
        Ok(true)
    }
}
