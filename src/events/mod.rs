//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the battle coordinator, its
//! scheduled checks and the worker loops.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `BattleCoordinator` (arm/fire/settle), `AutomationLoop`
//!   (register/iterate/checkpoint/finish), `WorkerRegistry` (stop requests).
//! - **Consumers**: [`SubscriberSet`](crate::SubscriberSet) via [`spawn_listener`](crate::subscribers::spawn_listener).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
