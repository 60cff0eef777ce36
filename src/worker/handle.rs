//! # WorkerHandle: stop flag and checkpoint of one worker run.
//!
//! A handle is created by the driver, passed to the loop at construction and
//! shared (by clone) with the [`WorkerRegistry`](crate::WorkerRegistry).
//!
//! ## Rules
//! - `request_stop` is idempotent; only the first call reports `true`.
//! - The stop is **advisory**: the loop observes it at the top of its next iteration.
//! - The checkpoint is written at most once, by the loop honouring the stop.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Global counter for worker ids.
static WORKER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identifier of one worker run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

struct Inner {
    id: WorkerId,
    stop_requested: AtomicBool,
    stop: CancellationToken,
    checkpoint: OnceLock<usize>,
}

/// Cooperative stop flag plus checkpoint for one worker run. Cheap to clone.
#[derive(Clone)]
pub struct WorkerHandle {
    inner: Arc<Inner>,
}

impl WorkerHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                id: WorkerId(WORKER_SEQ.fetch_add(1, Ordering::Relaxed)),
                stop_requested: AtomicBool::new(false),
                stop: CancellationToken::new(),
                checkpoint: OnceLock::new(),
            }),
        }
    }

    pub fn id(&self) -> WorkerId {
        self.inner.id
    }

    /// Asks the worker to stop at its next iteration boundary.
    ///
    /// Returns `true` if this call set the flag, `false` if it was already set.
    pub fn request_stop(&self) -> bool {
        let first = !self.inner.stop_requested.swap(true, Ordering::AcqRel);
        self.inner.stop.cancel();
        first
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.stop_requested.load(Ordering::Acquire)
    }

    /// Token cancelled by [`request_stop`](Self::request_stop).
    ///
    /// Lets scanners abort long waits (see [`wait_for`](crate::ui::wait_for)).
    pub fn stop_token(&self) -> &CancellationToken {
        &self.inner.stop
    }

    /// Iteration index at which the stop was honoured, if the run was stopped.
    pub fn checkpoint(&self) -> Option<usize> {
        self.inner.checkpoint.get().copied()
    }

    /// Records the checkpoint; later calls are ignored.
    pub(crate) fn record_checkpoint(&self, iteration: usize) -> bool {
        self.inner.checkpoint.set(iteration).is_ok()
    }

    /// True if both handles refer to the same worker.
    pub fn same_as(&self, other: &WorkerHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for WorkerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.inner.id)
            .field("stop_requested", &self.is_stop_requested())
            .field("checkpoint", &self.checkpoint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_stop_is_idempotent() {
        let h = WorkerHandle::new();
        assert!(!h.is_stop_requested());

        assert!(h.request_stop());
        assert!(!h.request_stop());
        assert!(!h.request_stop());

        assert!(h.is_stop_requested());
        assert!(h.stop_token().is_cancelled());
        assert_eq!(h.checkpoint(), None);
    }

    #[test]
    fn checkpoint_is_write_once() {
        let h = WorkerHandle::new();
        assert!(h.record_checkpoint(3));
        assert!(!h.record_checkpoint(5));
        assert_eq!(h.checkpoint(), Some(3));
    }

    #[test]
    fn clones_share_state_and_ids_are_unique() {
        let a = WorkerHandle::new();
        let b = a.clone();
        b.request_stop();
        assert!(a.is_stop_requested());
        assert!(a.same_as(&b));

        let c = WorkerHandle::new();
        assert_ne!(a.id(), c.id());
        assert!(!a.same_as(&c));
    }
}
