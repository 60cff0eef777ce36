//! # Tokio-backed delayed callback service.
//!
//! [`TokioScheduler`] runs every registration on its own tokio task that sleeps
//! until the requested instant and then executes the callback.
//!
//! ## Architecture
//! ```text
//! schedule(id, run_at, job)
//!   ├─► jobs.insert(id, token)
//!   └─► spawn ─► select { token.cancelled() → exit
//!                         sleep_until(run_at) → jobs.remove(id)?
//!                                                 ├─ Some → job().await
//!                                                 └─ None → exit (cancel won) }
//!
//! cancel(id)
//!   └─► jobs.remove(id)
//!         ├─ Some(token) → token.cancel(), Ok
//!         └─ None        → JobNotFound (unknown, fired or executing)
//! ```
//!
//! ## Rules
//! - Firing and cancelling race on **one** map removal; exactly one side wins.
//! - A job that has been removed for firing can no longer be cancelled.
//! - After [`TokioScheduler::shutdown`] every registration is rejected with `Closed`;
//!   the check happens under the job table lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{Job, JobId, WatchdogScheduler};
use crate::error::SchedulerError;

struct Inner {
    jobs: Mutex<HashMap<JobId, CancellationToken>>,
    runtime: Handle,
    closed: CancellationToken,
}

impl Inner {
    fn jobs(&self) -> MutexGuard<'_, HashMap<JobId, CancellationToken>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Delayed-callback service running jobs on a tokio runtime.
///
/// Cheap to clone; clones share the same job table.
#[derive(Clone)]
pub struct TokioScheduler {
    inner: Arc<Inner>,
}

impl TokioScheduler {
    /// Creates a scheduler bound to the current tokio runtime.
    ///
    /// Fails with [`SchedulerError::NoRuntime`] outside a runtime context.
    pub fn new() -> Result<Self, SchedulerError> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        Ok(Self::with_handle(runtime))
    }

    /// Creates a scheduler that spawns callbacks on `runtime`.
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                jobs: Mutex::new(HashMap::new()),
                runtime,
                closed: CancellationToken::new(),
            }),
        }
    }

    /// Number of registered, not yet fired jobs.
    pub fn pending(&self) -> usize {
        self.inner.jobs().len()
    }

    /// Cancels every pending job and rejects further registrations.
    ///
    /// Callbacks already executing are not interrupted.
    pub fn shutdown(&self) {
        self.inner.closed.cancel();
        let drained: Vec<CancellationToken> = self.inner.jobs().drain().map(|(_, t)| t).collect();
        for token in drained {
            token.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }
}

impl WatchdogScheduler for TokioScheduler {
    fn schedule(&self, id: JobId, run_at: Instant, job: Job) -> Result<(), SchedulerError> {
        let token = self.inner.closed.child_token();
        {
            let mut jobs = self.inner.jobs();
            // Under the table lock: shutdown sets `closed` before draining.
            if self.is_closed() {
                return Err(SchedulerError::Closed);
            }
            if jobs.contains_key(&id) {
                return Err(SchedulerError::Duplicate { id });
            }
            jobs.insert(id.clone(), token.clone());
        }

        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(run_at) => {}
            }
            if inner.jobs().remove(&id).is_none() {
                return;
            }
            tracing::trace!(job = %id, "watchdog job firing");
            job().await;
        });
        Ok(())
    }

    fn cancel(&self, id: &JobId) -> Result<(), SchedulerError> {
        match self.inner.jobs().remove(id) {
            Some(token) => {
                token.cancel();
                Ok(())
            }
            None => Err(SchedulerError::JobNotFound { id: id.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::job_fn;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, SystemTime};
    use tokio::sync::{Notify, oneshot};

    fn fresh_id() -> JobId {
        JobId::derive(SystemTime::now())
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_run_at_is_reached() {
        let sched = TokioScheduler::new().unwrap();
        let (tx, rx) = oneshot::channel();
        let start = Instant::now();

        sched
            .schedule(
                fresh_id(),
                start + Duration::from_secs(5),
                job_fn(move || async move {
                    let _ = tx.send(Instant::now());
                }),
            )
            .unwrap();
        assert_eq!(sched.pending(), 1);

        let fired_at = rx.await.unwrap();
        assert!(fired_at - start >= Duration::from_secs(5));
        assert_eq!(sched.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_job_never_runs() {
        let sched = TokioScheduler::new().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        let id = fresh_id();
        let flag = ran.clone();

        sched
            .schedule(
                id.clone(),
                Instant::now() + Duration::from_secs(5),
                job_fn(move || async move { flag.store(true, Ordering::SeqCst) }),
            )
            .unwrap();
        sched.cancel(&id).unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(
            sched.cancel(&id),
            Err(SchedulerError::JobNotFound { id: id.clone() })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fire_is_not_found() {
        let sched = TokioScheduler::new().unwrap();
        let (tx, rx) = oneshot::channel();
        let id = fresh_id();

        sched
            .schedule(
                id.clone(),
                Instant::now() + Duration::from_secs(1),
                job_fn(move || async move {
                    let _ = tx.send(());
                }),
            )
            .unwrap();
        rx.await.unwrap();

        assert!(sched.cancel(&id).unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_executing_is_not_found() {
        let sched = TokioScheduler::new().unwrap();
        let (started_tx, started_rx) = oneshot::channel();
        let release = Arc::new(Notify::new());
        let gate = release.clone();
        let id = fresh_id();

        sched
            .schedule(
                id.clone(),
                Instant::now() + Duration::from_millis(10),
                job_fn(move || async move {
                    let _ = started_tx.send(());
                    gate.notified().await;
                }),
            )
            .unwrap();
        started_rx.await.unwrap();

        assert!(sched.cancel(&id).unwrap_err().is_not_found());
        release.notify_one();
    }

    #[tokio::test]
    async fn unknown_and_duplicate_ids_are_rejected() {
        let sched = TokioScheduler::new().unwrap();
        let id = fresh_id();
        assert!(sched.cancel(&id).unwrap_err().is_not_found());

        let later = Instant::now() + Duration::from_secs(60);
        sched.schedule(id.clone(), later, job_fn(|| async {})).unwrap();
        assert_eq!(
            sched.schedule(id.clone(), later, job_fn(|| async {})),
            Err(SchedulerError::Duplicate { id })
        );
        sched.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_and_rejects_new_jobs() {
        let sched = TokioScheduler::new().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        sched
            .schedule(
                fresh_id(),
                Instant::now() + Duration::from_secs(1),
                job_fn(move || async move { flag.store(true, Ordering::SeqCst) }),
            )
            .unwrap();

        sched.shutdown();
        assert_eq!(sched.pending(), 0);
        assert_eq!(
            sched.schedule(fresh_id(), Instant::now(), job_fn(|| async {})),
            Err(SchedulerError::Closed)
        );

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn schedule_racing_shutdown_is_rejected() {
        let sched = TokioScheduler::new().unwrap();
        let guard = sched.inner.jobs();

        let racer = sched.clone();
        let blocked = std::thread::spawn(move || {
            racer.schedule(
                fresh_id(),
                Instant::now() + Duration::from_secs(1),
                job_fn(|| async {}),
            )
        });
        std::thread::sleep(Duration::from_millis(50));

        // First half of shutdown lands while the registration waits for the table.
        sched.inner.closed.cancel();
        drop(guard);

        assert_eq!(blocked.join().unwrap(), Err(SchedulerError::Closed));
        assert_eq!(sched.pending(), 0);
        assert!(sched.cancel(&fresh_id()).unwrap_err().is_not_found());
    }

    #[test]
    fn new_outside_runtime_fails() {
        assert!(matches!(TokioScheduler::new(), Err(SchedulerError::NoRuntime)));
    }
}
