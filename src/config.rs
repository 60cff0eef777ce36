//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the watchdog and the worker loop,
//! and [`PollPolicy`] for the bounded UI polling helpers.
//!
//! ## Sentinel values
//! - `check_delay = 0s` → clamped to 1ms (a watchdog must never spin)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration shared by [`BattleCoordinator`](crate::BattleCoordinator)
/// and [`AutomationLoop`](crate::AutomationLoop).
///
/// ## Field semantics
/// - `check_delay`: re-poll interval of the battle watchdog
/// - `max_iterations`: iterations of one worker run
/// - `ui_settle`: wait between the reference check and the navigation gesture
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `poll`: retry knobs for UI polling
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay between watchdog checks while a battle is believed active.
    pub check_delay: Duration,

    /// Number of scan/act iterations in one worker run.
    pub max_iterations: usize,

    /// How long to let the UI settle before navigating.
    pub ui_settle: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Retry policy for UI polling helpers.
    pub poll: PollPolicy,
}

impl Config {
    /// Returns the watchdog delay, never shorter than one millisecond.
    #[inline]
    pub fn check_delay_clamped(&self) -> Duration {
        self.check_delay.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `check_delay = 5s`
    /// - `max_iterations = 8`
    /// - `ui_settle = 1s`
    /// - `bus_capacity = 1024`
    /// - `poll = PollPolicy::default()`
    fn default() -> Self {
        Self {
            check_delay: Duration::from_secs(5),
            max_iterations: 8,
            ui_settle: Duration::from_secs(1),
            bus_capacity: 1024,
            poll: PollPolicy::default(),
        }
    }
}

/// Retry knobs for [`wait_for`](crate::ui::wait_for) and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of condition evaluations (min 1).
    pub attempts: u32,
    /// Wait after an evaluation that failed with an error.
    pub on_error_wait: Duration,
    /// Wait after an evaluation that returned `false`.
    pub on_false_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            on_error_wait: Duration::from_secs(1),
            on_false_wait: Duration::from_secs(2),
        }
    }
}
