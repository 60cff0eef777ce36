//! Error types used by the scheduler, the battle coordinator and the worker loop.
//!
//! This module defines three enums:
//!
//! - [`SchedulerError`]: failures of the delayed-callback service.
//! - [`RecognitionError`]: faults reported by screen/OCR collaborators.
//! - [`LoopError`]: errors surfaced by [`AutomationLoop`](crate::AutomationLoop) and the polling helpers.
//!
//! All types provide `as_label` (stable snake_case label for logs/metrics).

use thiserror::Error;

use crate::scheduler::JobId;

/// # Errors produced by a [`WatchdogScheduler`](crate::WatchdogScheduler).
///
/// [`SchedulerError::JobNotFound`] is the only variant callers are expected to
/// recover from: it is returned when cancelling an id that was never registered
/// **or** already fired (including one that is executing right now). The two
/// causes are deliberately indistinguishable.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No pending registration exists for this id.
    #[error("job {id} not found")]
    JobNotFound {
        /// The id that could not be cancelled.
        id: JobId,
    },

    /// A pending registration already uses this id.
    #[error("job {id} already registered")]
    Duplicate {
        /// The conflicting id.
        id: JobId,
    },

    /// Scheduler was shut down; no further registrations are accepted.
    #[error("scheduler closed")]
    Closed,

    /// No tokio runtime is reachable to run callbacks on.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// The requested delay does not fit the clock.
    #[error("delay {delay:?} is out of range")]
    InvalidDelay {
        /// The rejected delay.
        delay: std::time::Duration,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use duelvisor::SchedulerError;
    ///
    /// assert_eq!(SchedulerError::Closed.as_label(), "scheduler_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::JobNotFound { .. } => "scheduler_job_not_found",
            SchedulerError::Duplicate { .. } => "scheduler_duplicate_job",
            SchedulerError::Closed => "scheduler_closed",
            SchedulerError::NoRuntime => "scheduler_no_runtime",
            SchedulerError::InvalidDelay { .. } => "scheduler_invalid_delay",
        }
    }

    /// True for the benign cancel/fire race.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SchedulerError::JobNotFound { .. })
    }
}

/// # Faults reported by screen capture and text recognition collaborators.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// The recognizer could not read the supplied image.
    #[error("unreadable input: {reason}")]
    Unreadable {
        /// Recognizer-provided detail.
        reason: String,
    },

    /// The frame has no pixels.
    #[error("frame is empty")]
    EmptyFrame,

    /// The screen could not be captured.
    #[error("capture failed: {reason}")]
    Capture {
        /// Capture-provided detail.
        reason: String,
    },
}

impl RecognitionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RecognitionError::Unreadable { .. } => "recognition_unreadable",
            RecognitionError::EmptyFrame => "recognition_empty_frame",
            RecognitionError::Capture { .. } => "recognition_capture_failed",
        }
    }
}

/// # Errors surfaced by the worker loop and UI polling helpers.
///
/// A cooperative stop is **not** an error: a stopped loop returns `Ok` with a
/// checkpoint recorded on its handle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LoopError {
    /// The loop was started without the pieces it needs (e.g. no scanner).
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is missing.
        reason: String,
    },

    /// A recognition collaborator failed.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    /// A scheduler registration failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The scanner reported a failure.
    #[error("scan failed: {reason}")]
    Scan {
        /// Scanner-provided detail.
        reason: String,
    },

    /// A polled condition never became true.
    #[error("waiting for {what} exceeded {attempts} attempts")]
    Exhausted {
        /// Human-readable description of the awaited condition.
        what: String,
        /// Number of evaluations performed.
        attempts: u32,
    },
}

impl LoopError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use duelvisor::LoopError;
    ///
    /// let err = LoopError::Configuration { reason: "no scanner".into() };
    /// assert_eq!(err.as_label(), "loop_configuration");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LoopError::Configuration { .. } => "loop_configuration",
            LoopError::Recognition(e) => e.as_label(),
            LoopError::Scheduler(e) => e.as_label(),
            LoopError::Scan { .. } => "loop_scan_failed",
            LoopError::Exhausted { .. } => "loop_exhausted",
        }
    }

    /// Indicates whether the error is a setup mistake rather than a runtime fault.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoopError::Configuration { .. } | LoopError::Scheduler(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let id = JobId::from_raw("check_battle_at_1_0");
        assert_eq!(
            SchedulerError::JobNotFound { id: id.clone() }.as_label(),
            "scheduler_job_not_found"
        );
        assert_eq!(SchedulerError::Duplicate { id }.as_label(), "scheduler_duplicate_job");
        assert_eq!(
            SchedulerError::InvalidDelay { delay: std::time::Duration::MAX }.as_label(),
            "scheduler_invalid_delay"
        );
        assert_eq!(
            LoopError::from(RecognitionError::EmptyFrame).as_label(),
            "recognition_empty_frame"
        );
    }

    #[test]
    fn only_not_found_is_benign() {
        let id = JobId::from_raw("x");
        assert!(SchedulerError::JobNotFound { id }.is_not_found());
        assert!(!SchedulerError::Closed.is_not_found());
        assert!(LoopError::from(SchedulerError::Closed).is_fatal());
        assert!(!LoopError::Scan { reason: "x".into() }.is_fatal());
    }
}
