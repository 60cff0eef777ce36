//! Battle watchdog.
//!
//! [`BattleCoordinator`] arms delayed checks through a
//! [`WatchdogScheduler`](crate::WatchdogScheduler) and keeps the battle flag
//! in sync with what those checks observe.

mod coordinator;

pub use coordinator::{ArmOutcome, BattleCoordinator};
