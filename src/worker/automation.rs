//! # AutomationLoop: bounded, cooperatively stoppable scan/act loop.
//!
//! ## Architecture
//! ```text
//! run_for(max)
//!   ├─► no scanner? ─► Err(Configuration)
//!   ├─► registry.register(handle)
//!   ├─► for i in 0..max {
//!   │     ├─► handle stop requested? ─► checkpoint = i, break
//!   │     ├─► navigator.ensure_reference()
//!   │     ├─► navigator.wait_for_ui(ui_settle)
//!   │     ├─► navigator.swipe(Right)
//!   │     └─► scanner.scan(cx)   (Err ─► leave loop with error)
//!   │   }
//!   └─► registry.unregister()          (always)
//! ```
//!
//! ## Rules
//! - Stop requests never preempt in-flight work; they are observed only at the
//!   top of an iteration, and that iteration performs no work.
//! - The registry slot is cleared on every exit path that got past registration.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::handle::{WorkerHandle, WorkerId};
use super::registry::WorkerRegistry;
use crate::battle::BattleCoordinator;
use crate::config::Config;
use crate::error::LoopError;
use crate::events::{Bus, Event, EventKind};
use crate::ui::{Direction, Navigator};

/// What a scanner sees during one iteration.
pub struct ScanContext<'a> {
    /// 0-based iteration index.
    pub iteration: usize,
    /// Handle of the running worker (stop flag, stop token).
    pub handle: &'a WorkerHandle,
    /// Battle watchdog to arm when a battle starts, if configured.
    pub coordinator: Option<&'a Arc<BattleCoordinator>>,
}

/// Detects opportunities on the current screen and acts on them.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use duelvisor::{LoopError, ScanContext, Scanner};
///
/// struct ArmOnEveryScan;
///
/// #[async_trait]
/// impl Scanner for ArmOnEveryScan {
///     async fn scan(&self, cx: &ScanContext<'_>) -> Result<(), LoopError> {
///         if let Some(coord) = cx.coordinator {
///             coord.arm_default(false)?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Scanner: Send + Sync + 'static {
    async fn scan(&self, cx: &ScanContext<'_>) -> Result<(), LoopError>;
}

/// Outcome of a run that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub worker: WorkerId,
    /// Iterations whose work was performed.
    pub completed: usize,
    /// Iteration index at which a stop was honoured.
    pub checkpoint: Option<usize>,
}

/// Bounded scan/act loop bound to one [`WorkerHandle`].
pub struct AutomationLoop {
    cfg: Config,
    handle: WorkerHandle,
    registry: Arc<WorkerRegistry>,
    navigator: Arc<dyn Navigator>,
    scanner: Option<Arc<dyn Scanner>>,
    coordinator: Option<Arc<BattleCoordinator>>,
    bus: Option<Bus>,
}

impl AutomationLoop {
    /// Starts building a loop driven by `navigator`.
    pub fn builder(cfg: Config, navigator: Arc<dyn Navigator>) -> LoopBuilder {
        LoopBuilder::new(cfg, navigator)
    }

    pub fn handle(&self) -> &WorkerHandle {
        &self.handle
    }

    /// Runs `cfg.max_iterations` iterations (see [`run_for`](Self::run_for)).
    pub async fn run(&self) -> Result<RunReport, LoopError> {
        self.run_for(self.cfg.max_iterations).await
    }

    /// Runs up to `max_iterations` iterations.
    ///
    /// A cooperative stop ends the run with `Ok` and a checkpoint. Scanner
    /// errors end it with `Err`; the registry slot is cleared either way.
    pub async fn run_for(&self, max_iterations: usize) -> Result<RunReport, LoopError> {
        let scanner = self.scanner.as_deref().ok_or_else(|| LoopError::Configuration {
            reason: "no scanner configured".to_string(),
        })?;

        let worker = self.handle.id();
        self.registry.register(&self.handle).await;
        self.publish(Event::new(EventKind::WorkerRegistered).with_worker(worker.get()));
        tracing::debug!(%worker, max_iterations, "worker started");

        let res = self.iterate(scanner, max_iterations).await;

        self.registry.unregister().await;
        let mut done = Event::new(EventKind::WorkerFinished).with_worker(worker.get());
        match &res {
            Ok(completed) => done = done.with_iteration(*completed),
            Err(e) => done = done.with_reason(e.as_label()),
        }
        self.publish(done);

        let completed = res?;
        Ok(RunReport {
            worker,
            completed,
            checkpoint: self.handle.checkpoint(),
        })
    }

    /// Runs the loop on its own tokio task.
    pub fn spawn(self) -> JoinHandle<Result<RunReport, LoopError>> {
        tokio::spawn(async move { self.run().await })
    }

    async fn iterate(&self, scanner: &dyn Scanner, max_iterations: usize) -> Result<usize, LoopError> {
        let worker = self.handle.id().get();
        for i in 0..max_iterations {
            if self.handle.is_stop_requested() {
                self.handle.record_checkpoint(i);
                tracing::debug!(worker, checkpoint = i, "stop honoured");
                self.publish(
                    Event::new(EventKind::WorkerCheckpoint)
                        .with_worker(worker)
                        .with_iteration(i),
                );
                return Ok(i);
            }

            self.navigator.ensure_reference().await;
            self.navigator.wait_for_ui(self.cfg.ui_settle).await;
            self.navigator.swipe(Direction::Right).await;

            let cx = ScanContext {
                iteration: i,
                handle: &self.handle,
                coordinator: self.coordinator.as_ref(),
            };
            if let Err(e) = scanner.scan(&cx).await {
                tracing::warn!(worker, iteration = i, error = %e, "scan failed");
                self.publish(
                    Event::new(EventKind::ScanFailed)
                        .with_worker(worker)
                        .with_iteration(i)
                        .with_reason(e.to_string()),
                );
                return Err(e);
            }
            self.publish(
                Event::new(EventKind::WorkerIteration)
                    .with_worker(worker)
                    .with_iteration(i),
            );
        }
        Ok(max_iterations)
    }

    fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}

/// Builder for [`AutomationLoop`].
pub struct LoopBuilder {
    cfg: Config,
    navigator: Arc<dyn Navigator>,
    handle: Option<WorkerHandle>,
    registry: Option<Arc<WorkerRegistry>>,
    scanner: Option<Arc<dyn Scanner>>,
    coordinator: Option<Arc<BattleCoordinator>>,
    bus: Option<Bus>,
}

impl LoopBuilder {
    pub fn new(cfg: Config, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            cfg,
            navigator,
            handle: None,
            registry: None,
            scanner: None,
            coordinator: None,
            bus: None,
        }
    }

    /// Uses an existing handle (so the driver can request a stop). Default: fresh handle.
    pub fn with_handle(mut self, handle: WorkerHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Shares a registry with other components. Default: private registry.
    pub fn with_registry(mut self, registry: Arc<WorkerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn Scanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_coordinator(mut self, coordinator: Arc<BattleCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the loop. A missing scanner is reported when the loop runs.
    pub fn build(self) -> AutomationLoop {
        AutomationLoop {
            cfg: self.cfg,
            handle: self.handle.unwrap_or_default(),
            registry: self.registry.unwrap_or_else(WorkerRegistry::new),
            navigator: self.navigator,
            scanner: self.scanner,
            coordinator: self.coordinator,
            bus: self.bus,
        }
    }
}
