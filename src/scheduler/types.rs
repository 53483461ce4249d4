/*!
 * Scheduler Types
 * Controller lifecycle states and control outcomes
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller lifecycle
///
/// `Inactive -> Active -> StopRequested -> Inactive`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// No worker cores running
    Inactive,
    /// Worker cores polling the ready queue
    Active,
    /// Stop signalled; cores are finishing their current process
    StopRequested,
}

/// Result of a start/stop request
///
/// Redundant requests are no-ops, reported here rather than as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Worker cores spawned
    Started { cores: usize },
    /// Start while already active
    AlreadyActive,
    /// Stop signalled to every core
    StopRequested,
    /// Start or stop while a previous stop is still draining
    StopPending,
    /// Stop while inactive
    NotActive,
}

impl fmt::Display for ControlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlOutcome::Started { cores } => {
                write!(f, "Scheduler started with {} cores.", cores)
            }
            ControlOutcome::AlreadyActive => f.write_str("Scheduler is already active."),
            ControlOutcome::StopRequested => f.write_str(
                "Scheduler stopping. Running processes will finish; no new processes will start.",
            ),
            ControlOutcome::StopPending => {
                f.write_str("Scheduler is still stopping. Try again shortly.")
            }
            ControlOutcome::NotActive => f.write_str("Scheduler is not active."),
        }
    }
}
