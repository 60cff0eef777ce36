//! # Delayed-callback scheduling.
//!
//! [`WatchdogScheduler`] abstracts the service the battle coordinator uses to
//! run a check later. [`TokioScheduler`] is the runtime implementation; tests
//! substitute a manual one.
//!
//! ## Contract
//! - `schedule` registers a one-shot callback to run **at or after** `run_at`
//!   on a scheduler-owned task, never on the caller's. It only does bookkeeping.
//! - `cancel` removes a registration that has not fired yet. Cancelling an id
//!   that never existed, already fired, or is executing right now fails with
//!   [`SchedulerError::JobNotFound`](crate::SchedulerError::JobNotFound); the
//!   caller cannot tell these apart.

mod job;
mod timer;

use tokio::time::Instant;

pub use job::{Job, JobId, job_fn};
pub use timer::TokioScheduler;

use crate::error::SchedulerError;

/// Delayed-callback execution service.
pub trait WatchdogScheduler: Send + Sync + 'static {
    /// Registers `job` under `id` to run once at or after `run_at`.
    fn schedule(&self, id: JobId, run_at: Instant, job: Job) -> Result<(), SchedulerError>;

    /// Removes a not-yet-fired registration.
    fn cancel(&self, id: &JobId) -> Result<(), SchedulerError>;
}
