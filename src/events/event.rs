//! # Runtime events emitted by the coordinator and worker loops.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Watchdog events**: arming, debouncing, firing and settling of battle checks
//! - **Worker events**: registration, iterations, stop requests and checkpoints
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job id,
//! worker id, iteration index and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use duelvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WatchdogArmed)
//!     .with_job("check_battle_at_1700000000000_0")
//!     .with_delay(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::WatchdogArmed);
//! assert_eq!(ev.delay_ms, Some(5000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Watchdog events ===
    /// A battle check was registered with the scheduler.
    ///
    /// Sets: `job`, `delay_ms`
    WatchdogArmed,

    /// A pending check was cancelled to make room for a fresh one.
    ///
    /// Sets: `job` (the cancelled id)
    WatchdogDebounced,

    /// Cancelling a pending check lost the race against its firing.
    ///
    /// Sets: `job` (the already-fired id)
    WatchdogRaced,

    /// A battle check callback started.
    ///
    /// Sets: `job`
    WatchdogFired,

    /// Re-arming from inside a fired check failed.
    ///
    /// Sets: `job` (the fired id), `reason`
    WatchdogRearmFailed,

    /// The coordinator settled to idle (battle over, no check pending).
    ///
    /// Sets: `job` (the check that observed the end, if any), `reason`
    BattleSettled,

    // === Worker events ===
    /// A worker handle was placed in the registry slot.
    ///
    /// Sets: `worker`
    WorkerRegistered,

    /// A stop was requested on a worker handle.
    ///
    /// Sets: `worker`
    WorkerStopRequested,

    /// A worker completed one scan/act iteration.
    ///
    /// Sets: `worker`, `iteration`
    WorkerIteration,

    /// A worker honoured a stop and recorded its checkpoint.
    ///
    /// Sets: `worker`, `iteration` (checkpoint)
    WorkerCheckpoint,

    /// A worker left its loop and cleared the registry slot.
    ///
    /// Sets: `worker`, `iteration` (completed iterations), `reason` on error
    WorkerFinished,

    /// The scanner returned an error.
    ///
    /// Sets: `worker`, `iteration`, `reason`
    ScanFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Watchdog job id, if applicable.
    pub job: Option<Arc<str>>,
    /// Worker id, if applicable.
    pub worker: Option<u64>,
    /// Iteration index or count.
    pub iteration: Option<u32>,
    /// Scheduling delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, decisions).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            worker: None,
            iteration: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a job id.
    #[inline]
    pub fn with_job(mut self, job: impl Into<Arc<str>>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, worker: u64) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches an iteration index (saturates at `u32::MAX`).
    #[inline]
    pub fn with_iteration(mut self, i: usize) -> Self {
        self.iteration = Some(u32::try_from(i).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn is_watchdog(&self) -> bool {
        matches!(
            self.kind,
            EventKind::WatchdogArmed
                | EventKind::WatchdogDebounced
                | EventKind::WatchdogRaced
                | EventKind::WatchdogFired
                | EventKind::WatchdogRearmFailed
                | EventKind::BattleSettled
        )
    }
}
