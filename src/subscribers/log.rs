//! # LogWriter: events as `tracing` records
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! DEBUG duelvisor::log: armed seq=4 job="check_battle_at_1700000005000_3" delay_ms=5000
//! DEBUG duelvisor::log: raced seq=7 job="check_battle_at_1700000005000_3"
//!  INFO duelvisor::log: battle settled seq=8 job="check_battle_at_1700000005000_3" reason="already_fired"
//!  INFO duelvisor::log: worker checkpoint seq=9 worker=1 iteration=3
//! ```
//!
//! Fields whose value is absent on the event are omitted from the record.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref();
        match e.kind {
            EventKind::WatchdogArmed => {
                tracing::debug!(target: "duelvisor::log", seq = e.seq, job, delay_ms = e.delay_ms, "armed");
            }
            EventKind::WatchdogDebounced => {
                tracing::debug!(target: "duelvisor::log", seq = e.seq, job, "debounced");
            }
            EventKind::WatchdogRaced => {
                tracing::debug!(target: "duelvisor::log", seq = e.seq, job, "raced");
            }
            EventKind::WatchdogFired => {
                tracing::debug!(target: "duelvisor::log", seq = e.seq, job, "fired");
            }
            EventKind::WatchdogRearmFailed => {
                tracing::error!(target: "duelvisor::log", seq = e.seq, job, reason = e.reason.as_deref(), "re-arm failed");
            }
            EventKind::BattleSettled => {
                tracing::info!(target: "duelvisor::log", seq = e.seq, job, reason = e.reason.as_deref(), "battle settled");
            }
            EventKind::WorkerRegistered => {
                tracing::info!(target: "duelvisor::log", seq = e.seq, worker = e.worker, "worker registered");
            }
            EventKind::WorkerStopRequested => {
                tracing::info!(target: "duelvisor::log", seq = e.seq, worker = e.worker, "stop requested");
            }
            EventKind::WorkerIteration => {
                tracing::trace!(target: "duelvisor::log", seq = e.seq, worker = e.worker, iteration = e.iteration, "iteration done");
            }
            EventKind::WorkerCheckpoint => {
                tracing::info!(target: "duelvisor::log", seq = e.seq, worker = e.worker, iteration = e.iteration, "worker checkpoint");
            }
            EventKind::WorkerFinished => {
                tracing::info!(target: "duelvisor::log", seq = e.seq, worker = e.worker, iterations = e.iteration, reason = e.reason.as_deref(), "worker finished");
            }
            EventKind::ScanFailed => {
                tracing::warn!(target: "duelvisor::log", seq = e.seq, worker = e.worker, iteration = e.iteration, reason = e.reason.as_deref(), "scan failed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
