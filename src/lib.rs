//! # duelvisor
//!
//! **Duelvisor** is the coordination core of a UI automation agent that
//! scans a game screen for battle opportunities and watches battles until
//! they end.
//!
//! It provides a battle watchdog that keeps exactly one delayed check
//! pending, a bounded scan loop that can be stopped cooperatively from
//! another task, and the event plumbing both of them report through. Screen
//! capture, OCR, shape detection and input injection stay behind traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   driver ──► WorkerRegistry::request_stop()
//!                    │
//!                    ▼ (flag)
//!     ┌─────────────────────────────┐        arm(delay, signal_done)
//!     │  AutomationLoop             │ ─────────────────────────────┐
//!     │  - ensure_reference         │                              ▼
//!     │  - wait_for_ui / swipe      │              ┌───────────────────────────┐
//!     │  - Scanner::scan            │              │  BattleCoordinator        │
//!     └──────────────┬──────────────┘              │  - pending JobId (≤ 1)    │
//!                    │                             │  - battle_active flag     │
//!                    │                             └──────┬─────────────▲──────┘
//!                    │                          schedule/ │             │ on_fire(id)
//!                    │                             cancel ▼             │
//!                    │                             ┌───────────────────────────┐
//!                    │                             │  WatchdogScheduler        │
//!                    │                             │  (TokioScheduler)         │
//!                    │                             └───────────────────────────┘
//!                    │ publish(Event)                       │ publish(Event)
//!                    ▼                                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                     (capacity: Config::bus_capacity)              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       subscribers::spawn_listener
//!                                   ▼
//!                             SubscriberSet
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     LogWriter   sub2      subN
//! ```
//!
//! ### Watchdog lifecycle
//! ```text
//! arm(delay, signal_done)
//!   ├─► now + delay overflows? ─► Err(InvalidDelay), nothing cancelled
//!   ├─► pending? cancel it
//!   │     └─ JobNotFound (already fired) && signal_done ─► settle, exit
//!   ├─► schedule(new id, now + delay)   (Err ─► return, pending unchanged)
//!   └─► pending = new id, battle_active = true
//!
//! on_fire(id)  (scheduler task)
//!   ├─► StatusProbe::is_battle_ongoing()
//!   ├─ true  ─► arm(default_delay, false)
//!   └─ false ─► pending == id ? clear pending, battle_active = false
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Watchdog**      | Single pending battle check, re-armed while a battle lasts.   | [`BattleCoordinator`], [`ArmOutcome`]      |
//! | **Scheduling**    | One-shot delayed callbacks with cancellation.                 | [`WatchdogScheduler`], [`TokioScheduler`]  |
//! | **Workers**       | Bounded scan loop with cooperative stop and checkpoint.       | [`AutomationLoop`], [`Scanner`]            |
//! | **Stop control**  | "Current worker" slot for external stop requests.             | [`WorkerRegistry`], [`WorkerHandle`]       |
//! | **UI helpers**    | Collaborator traits and bounded polling.                      | [`ui::Navigator`], [`ui::wait_for`]        |
//! | **Subscriber API**| Hook into watchdog and worker events.                         | [`Subscribe`], [`LogWriter`]               |
//! | **Errors**        | Typed errors for scheduling, recognition and loops.           | [`SchedulerError`], [`LoopError`]          |
//! | **Configuration** | Centralize delays, bounds and capacities.                     | [`Config`], [`PollPolicy`]                 |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use duelvisor::ui::{Direction, Navigator, StatusProbe, Target};
//! use duelvisor::{
//!     AutomationLoop, BattleCoordinator, Config, LoopError, ScanContext, Scanner, TokioScheduler,
//!     WorkerRegistry,
//! };
//!
//! struct Idle;
//!
//! #[async_trait]
//! impl Navigator for Idle {
//!     async fn ensure_reference(&self) {}
//!     async fn wait_for_ui(&self, _delay: std::time::Duration) {}
//!     async fn swipe(&self, _direction: Direction) {}
//!     async fn click(&self, _target: Target) {}
//! }
//!
//! struct NeverOngoing;
//!
//! #[async_trait]
//! impl StatusProbe for NeverOngoing {
//!     async fn is_battle_ongoing(&self) -> bool { false }
//! }
//!
//! struct StartBattle;
//!
//! #[async_trait]
//! impl Scanner for StartBattle {
//!     async fn scan(&self, cx: &ScanContext<'_>) -> Result<(), LoopError> {
//!         if let Some(coord) = cx.coordinator {
//!             coord.arm_default(false)?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let scheduler = Arc::new(TokioScheduler::new()?);
//!     let coordinator = BattleCoordinator::new(&cfg, scheduler.clone(), Arc::new(NeverOngoing));
//!     let registry = WorkerRegistry::new();
//!
//!     let worker = AutomationLoop::builder(cfg, Arc::new(Idle))
//!         .with_registry(registry.clone())
//!         .with_scanner(Arc::new(StartBattle))
//!         .with_coordinator(coordinator.clone())
//!         .build();
//!
//!     let report = worker.run_for(2).await?;
//!     assert_eq!(report.completed, 2);
//!     assert!(coordinator.is_active());
//!     assert!(registry.is_empty().await);
//!
//!     scheduler.shutdown();
//!     Ok(())
//! }
//! ```
mod battle;
mod config;
mod error;
mod events;
pub mod scheduler;
pub mod subscribers;
pub mod ui;
mod worker;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use battle::{ArmOutcome, BattleCoordinator};
pub use config::{Config, PollPolicy};
pub use error::{LoopError, RecognitionError, SchedulerError};
pub use events::{Bus, Event, EventKind};
pub use scheduler::{JobId, TokioScheduler, WatchdogScheduler};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use worker::{
    AutomationLoop, LoopBuilder, RunReport, ScanContext, Scanner, WorkerHandle, WorkerId,
    WorkerRegistry,
};
