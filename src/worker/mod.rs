//! Worker side: the bounded automation loop and its stop plumbing.
//!
//! - [`WorkerHandle`]: cooperative stop flag + checkpoint of one run
//! - [`WorkerRegistry`]: "current worker" slot for external stop requests
//! - [`AutomationLoop`]: the scan/act loop itself, with its [`Scanner`] extension point

mod automation;
mod handle;
mod registry;

pub use automation::{AutomationLoop, LoopBuilder, RunReport, ScanContext, Scanner};
pub use handle::{WorkerHandle, WorkerId};
pub use registry::WorkerRegistry;
