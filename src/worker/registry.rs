//! # Worker registry: the "current worker" slot.
//!
//! Lets an outside actor find the running worker and ask it to stop without
//! holding a reference to the loop itself.
//!
//! ## Rules
//! - The slot holds **at most one** handle (a single concurrent worker loop is assumed).
//! - `register` overwrites whatever was there.
//! - `unregister` clears the slot regardless of which handle it holds.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::handle::WorkerHandle;
use crate::events::{Bus, Event, EventKind};

/// Process-wide slot for the active worker. Construct once and share via `Arc`.
pub struct WorkerRegistry {
    slot: RwLock<Option<WorkerHandle>>,
    bus: Option<Bus>,
}

impl WorkerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: RwLock::new(None),
            bus: None,
        })
    }

    /// Creates an empty registry that publishes stop requests on `bus`.
    pub fn with_bus(bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            slot: RwLock::new(None),
            bus: Some(bus),
        })
    }

    /// Places `handle` in the slot; returns the handle it replaced, if any.
    pub async fn register(&self, handle: &WorkerHandle) -> Option<WorkerHandle> {
        self.slot.write().await.replace(handle.clone())
    }

    /// Clears the slot; returns the handle that was there, if any.
    pub async fn unregister(&self) -> Option<WorkerHandle> {
        self.slot.write().await.take()
    }

    /// Returns a clone of the registered handle.
    pub async fn current(&self) -> Option<WorkerHandle> {
        self.slot.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }

    /// Requests a stop on the registered worker.
    ///
    /// Returns `false` if no worker is registered.
    pub async fn request_stop(&self) -> bool {
        let Some(handle) = self.current().await else {
            return false;
        };
        if handle.request_stop() {
            if let Some(bus) = &self.bus {
                bus.publish(Event::new(EventKind::WorkerStopRequested).with_worker(handle.id().get()));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_unregister_restores_empty_slot() {
        let reg = WorkerRegistry::new();
        assert!(reg.is_empty().await);

        let h = WorkerHandle::new();
        assert!(reg.register(&h).await.is_none());
        assert!(reg.current().await.is_some_and(|c| c.same_as(&h)));

        let removed = reg.unregister().await.expect("registered handle");
        assert!(removed.same_as(&h));
        assert!(reg.is_empty().await);
    }

    #[tokio::test]
    async fn register_overwrites_and_unregister_clears_any() {
        let reg = WorkerRegistry::new();
        let a = WorkerHandle::new();
        let b = WorkerHandle::new();

        reg.register(&a).await;
        let displaced = reg.register(&b).await.expect("a displaced");
        assert!(displaced.same_as(&a));

        reg.unregister().await;
        assert!(reg.is_empty().await);
        assert!(reg.unregister().await.is_none());
    }

    #[tokio::test]
    async fn external_stop_reaches_registered_worker_once() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let reg = WorkerRegistry::with_bus(bus);
        assert!(!reg.request_stop().await);

        let h = WorkerHandle::new();
        reg.register(&h).await;
        assert!(reg.request_stop().await);
        assert!(reg.request_stop().await);
        assert!(h.is_stop_requested());

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerStopRequested);
        assert_eq!(ev.worker, Some(h.id().get()));
        assert!(rx.try_recv().is_err());
    }
}
