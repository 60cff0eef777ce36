//! # Job identity and callback type.
//!
//! [`JobId`] is an opaque token naming one scheduled watchdog callback. Ids are
//! derived from the wall-clock run time plus a process-wide monotonic sequence,
//! so two arms issued within the same millisecond still get distinct ids.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use futures::future::BoxFuture;

/// Global sequence counter making job ids unique.
static JOB_SEQ: AtomicU64 = AtomicU64::new(0);

/// One-shot async callback executed by a scheduler.
pub type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + 'static>;

/// Wraps an async closure into a [`Job`].
///
/// # Example
/// ```
/// use duelvisor::scheduler::job_fn;
///
/// let job = job_fn(|| async { /* re-check something */ });
/// # drop(job);
/// ```
pub fn job_fn<F, Fut>(f: F) -> Job
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move || f().boxed())
}

/// Opaque, unique identifier of a scheduled callback.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(Arc<str>);

impl JobId {
    /// Derives a fresh id for a callback due at `run_at`.
    ///
    /// Never returns the same id twice within a process.
    pub fn derive(run_at: SystemTime) -> Self {
        let ms = run_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = JOB_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        Self(format!("check_battle_at_{ms}_{seq}").into())
    }

    /// Wraps an existing id string (for tests and external schedulers).
    pub fn from_raw(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&JobId> for Arc<str> {
    fn from(id: &JobId) -> Self {
        Arc::clone(&id.0)
    }
}
