//! # BattleCoordinator: single-flight battle watchdog.
//!
//! Keeps **one** delayed battle check pending while a battle is believed to be
//! running, and settles to idle once a check observes that it ended.
//!
//! ## State machine
//! ```text
//!            arm()                        fire: still battling → arm()
//!   Idle ───────────► Scheduled ◄──────────────────────────────┐
//!    ▲                  │  │                                    │
//!    │                  │  └── fire ──► probe (outside lock) ───┘
//!    │                  │                  │
//!    │   fire: ended    │                  ▼
//!    └──────────────────┴─────────── ended: clear flag, Idle
//!
//!   arm() while Scheduled:
//!     cancel(pending) ─┬─ Ok           → fresh Scheduled (debounce)
//!                      └─ JobNotFound  ─┬─ signal_done → Idle, flag cleared
//!                                       └─ otherwise   → fresh Scheduled
//! ```
//!
//! ## Rules
//! - `{pending, battle_active}` is guarded by one mutex; `arm` holds it across
//!   read → cancel → decide → schedule → write.
//! - Nothing awaits while the mutex is held; the status probe runs outside it.
//! - `JobNotFound` on cancel is a benign race, never surfaced.
//! - A failed registration leaves `pending` as it was before the attempt.
//! - An out-of-range delay is rejected before anything is cancelled.
//!
//! ## Known race
//! With `signal_done`, "previous check already fired" is read as "battle over"
//! even though that check may be about to observe an ongoing battle and re-arm.
//! The flag is cleared first; the in-flight check may then re-arm and set it again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, SystemTime};

use tokio::time::Instant;

use crate::config::Config;
use crate::error::SchedulerError;
use crate::events::{Bus, Event, EventKind};
use crate::scheduler::{JobId, WatchdogScheduler, job_fn};
use crate::ui::StatusProbe;

/// Result of a successful [`BattleCoordinator::arm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArmOutcome {
    /// A fresh check was registered under this id.
    Scheduled(JobId),
    /// The previous check had already fired and done-detection was requested:
    /// the coordinator is idle and the battle flag cleared.
    Settled,
}

#[derive(Debug, Default)]
struct WatchState {
    pending: Option<JobId>,
    battle_active: bool,
}

/// Owns the single-pending-check invariant and the battle-active flag.
///
/// Construct with [`BattleCoordinator::new`] and share the returned `Arc`
/// with every context that needs to arm checks.
pub struct BattleCoordinator {
    scheduler: Arc<dyn WatchdogScheduler>,
    probe: Arc<dyn StatusProbe>,
    state: Mutex<WatchState>,
    default_delay: Duration,
    bus: Option<Bus>,
    me: Weak<BattleCoordinator>,
}

impl BattleCoordinator {
    /// Creates an idle coordinator; re-poll interval is `cfg.check_delay`.
    pub fn new(
        cfg: &Config,
        scheduler: Arc<dyn WatchdogScheduler>,
        probe: Arc<dyn StatusProbe>,
    ) -> Arc<Self> {
        Self::build(cfg, scheduler, probe, None)
    }

    /// Like [`new`](Self::new), publishing watchdog events on `bus`.
    pub fn with_bus(
        cfg: &Config,
        scheduler: Arc<dyn WatchdogScheduler>,
        probe: Arc<dyn StatusProbe>,
        bus: Bus,
    ) -> Arc<Self> {
        Self::build(cfg, scheduler, probe, Some(bus))
    }

    fn build(
        cfg: &Config,
        scheduler: Arc<dyn WatchdogScheduler>,
        probe: Arc<dyn StatusProbe>,
        bus: Option<Bus>,
    ) -> Arc<Self> {
        let default_delay = cfg.check_delay_clamped();
        Arc::new_cyclic(|me| Self {
            scheduler,
            probe,
            state: Mutex::new(WatchState::default()),
            default_delay,
            bus,
            me: me.clone(),
        })
    }

    /// Arms (or re-arms) the battle check to run after `delay`.
    ///
    /// With `signal_done`, losing the cancel race against an already fired
    /// check settles the coordinator instead of scheduling a new one.
    ///
    /// ### Errors
    /// `InvalidDelay` if `delay` overflows the clock; nothing is cancelled then.
    /// Propagates scheduler faults other than `JobNotFound`; state is left as
    /// it was before the failed registration.
    pub fn arm(&self, delay: Duration, signal_done: bool) -> Result<ArmOutcome, SchedulerError> {
        let (run_at, due) = Instant::now()
            .checked_add(delay)
            .zip(SystemTime::now().checked_add(delay))
            .ok_or(SchedulerError::InvalidDelay { delay })?;

        let mut state = self.lock();

        if let Some(prev) = state.pending.clone() {
            match self.scheduler.cancel(&prev) {
                Ok(()) => self.publish(Event::new(EventKind::WatchdogDebounced).with_job(&prev)),
                Err(e) if e.is_not_found() => {
                    self.publish(Event::new(EventKind::WatchdogRaced).with_job(&prev));
                    if signal_done {
                        state.pending = None;
                        state.battle_active = false;
                        drop(state);

                        tracing::debug!(job = %prev, "previous battle check already fired; settling");
                        self.publish(
                            Event::new(EventKind::BattleSettled)
                                .with_job(&prev)
                                .with_reason("already_fired"),
                        );
                        return Ok(ArmOutcome::Settled);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let id = JobId::derive(due);
        let me = self.me.clone();
        let fired = id.clone();
        self.scheduler.schedule(
            id.clone(),
            run_at,
            job_fn(move || async move {
                if let Some(me) = me.upgrade() {
                    me.on_fire(fired).await;
                }
            }),
        )?;

        state.pending = Some(id.clone());
        state.battle_active = true;
        drop(state);

        tracing::debug!(job = %id, ?delay, "battle check armed");
        self.publish(
            Event::new(EventKind::WatchdogArmed)
                .with_job(&id)
                .with_delay(delay),
        );
        Ok(ArmOutcome::Scheduled(id))
    }

    /// [`arm`](Self::arm) with the configured re-poll interval.
    pub fn arm_default(&self, signal_done: bool) -> Result<ArmOutcome, SchedulerError> {
        self.arm(self.default_delay, signal_done)
    }

    /// Scheduled check body: probe, then re-arm or settle.
    ///
    /// Normally invoked by the scheduler; `id` is the job that fired.
    pub async fn on_fire(&self, id: JobId) {
        self.publish(Event::new(EventKind::WatchdogFired).with_job(&id));

        let ongoing = self.probe.is_battle_ongoing().await;
        tracing::debug!(job = %id, ongoing, "battle status probed");

        if ongoing {
            if let Err(e) = self.arm(self.default_delay, false) {
                tracing::error!(job = %id, error = %e, "failed to re-arm battle check");
                self.publish(
                    Event::new(EventKind::WatchdogRearmFailed)
                        .with_job(&id)
                        .with_reason(e.as_label()),
                );
            }
            return;
        }

        let settled = {
            let mut state = self.lock();
            if state.pending.as_ref() == Some(&id) {
                state.pending = None;
                state.battle_active = false;
                true
            } else {
                false
            }
        };
        if settled {
            self.publish(
                Event::new(EventKind::BattleSettled)
                    .with_job(&id)
                    .with_reason("battle_ended"),
            );
        }
    }

    /// Best-effort view of the battle flag; may lag by one check interval.
    pub fn is_active(&self) -> bool {
        self.lock().battle_active
    }

    /// Id of the currently pending check, if any.
    pub fn pending_job(&self) -> Option<JobId> {
        self.lock().pending.clone()
    }

    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    fn lock(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}
