//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//!   BattleCoordinator / AutomationLoop ── publish(Event) ──► Bus
//!                                                             │
//!                                                   spawn_listener()
//!                                                             │
//!                                                     SubscriberSet::emit
//!                                                   ┌─────────┼─────────┐
//!                                                   ▼         ▼         ▼
//!                                               LogWriter  Metrics   Custom
//! ```

mod log;
mod set;
mod subscribe;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

use crate::events::Bus;

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
///
/// The listener exits once every bus sender is dropped.
pub fn spawn_listener(bus: &Bus, set: Arc<SubscriberSet>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "event listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
