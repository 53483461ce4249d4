/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{CoreId, Units};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state
///
/// States only move forward: `Waiting -> Running -> Finished | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ProcessState {
    /// Admitted to the ready queue, not yet claimed by a core
    Waiting = 0,
    /// Claimed by a core and executing work units
    Running = 1,
    /// All work units executed and the output artifact closed
    Finished = 2,
    /// Execution stopped because the output artifact could not be written
    Failed = 3,
}

impl ProcessState {
    #[inline]
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ProcessState::Waiting,
            1 => ProcessState::Running,
            2 => ProcessState::Finished,
            _ => ProcessState::Failed,
        }
    }

    /// Whether no further mutation can happen
    #[inline(always)]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Finished | ProcessState::Failed)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessState::Waiting => "waiting",
            ProcessState::Running => "running",
            ProcessState::Finished => "finished",
            ProcessState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Mutation events accepted by a process record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Waiting -> Running on the given core
    Claim(CoreId),
    /// One work unit completed
    Advance,
    /// Running -> Finished, only once every unit is done
    Finish,
    /// Running -> Failed
    Fail,
}

/// Point-in-time copy of a process record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessView {
    pub name: String,
    pub created_at: String,
    pub state: ProcessState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core: Option<CoreId>,
    pub progress: Units,
    pub total: Units,
}

impl ProcessView {
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, ProcessState::Running)
    }

    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, ProcessState::Finished)
    }
}
