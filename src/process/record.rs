/*!
 * Process Record
 * Unit of schedulable work and its runtime state
 */

use super::types::{ProcessState, ProcessView, Transition};
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::{now_timestamp, CoreId, Units};
use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};

/// Sentinel for "no core assigned"
const NO_CORE: usize = usize::MAX;

/// A schedulable process
///
/// Name, timestamp and unit total are fixed at construction. State, core and
/// progress are atomics written only by the core that claimed the record, so
/// readers never take a lock. The only way to mutate a record is
/// [`ProcessRecord::apply`].
#[derive(Debug)]
pub struct ProcessRecord {
    name: String,
    created_at: String,
    total: Units,
    state: AtomicU8,
    core: AtomicUsize,
    progress: AtomicU32,
}

impl ProcessRecord {
    /// Create a waiting record stamped with the current time
    pub fn new(name: impl Into<String>, total: Units) -> Self {
        Self {
            name: name.into(),
            created_at: now_timestamp(),
            total,
            state: AtomicU8::new(ProcessState::Waiting as u8),
            core: AtomicUsize::new(NO_CORE),
            progress: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    #[inline]
    pub fn total(&self) -> Units {
        self.total
    }

    #[inline]
    pub fn state(&self) -> ProcessState {
        ProcessState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn core(&self) -> Option<CoreId> {
        match self.core.load(Ordering::Acquire) {
            NO_CORE => None,
            core => Some(core),
        }
    }

    #[inline]
    pub fn progress(&self) -> Units {
        self.progress.load(Ordering::Acquire)
    }

    /// Copy the current field values
    ///
    /// State is read first; since it only advances and progress only grows,
    /// a concurrent writer can make the view slightly stale but never
    /// backwards.
    pub fn view(&self) -> ProcessView {
        let state = self.state();
        ProcessView {
            name: self.name.clone(),
            created_at: self.created_at.clone(),
            state,
            core: self.core(),
            progress: self.progress(),
            total: self.total,
        }
    }

    /// Apply a state transition
    ///
    /// Illegal transitions leave the record untouched.
    pub(crate) fn apply(&self, event: Transition) -> ProcessResult<()> {
        let from = self.state();
        match event {
            Transition::Claim(core) => {
                if from != ProcessState::Waiting {
                    return Err(self.rejected(from, event));
                }
                // Core ownership is taken before the state is published so
                // a reader that sees Running always sees the core.
                self.core
                    .compare_exchange(NO_CORE, core, Ordering::AcqRel, Ordering::Acquire)
                    .map_err(|_| self.rejected(from, event))?;
                self.state
                    .store(ProcessState::Running as u8, Ordering::Release);
            }
            Transition::Advance => {
                if from != ProcessState::Running || self.progress() >= self.total {
                    return Err(self.rejected(from, event));
                }
                self.progress.fetch_add(1, Ordering::AcqRel);
            }
            Transition::Finish => {
                if from != ProcessState::Running || self.progress() != self.total {
                    return Err(self.rejected(from, event));
                }
                self.state
                    .store(ProcessState::Finished as u8, Ordering::Release);
            }
            Transition::Fail => {
                if from != ProcessState::Running {
                    return Err(self.rejected(from, event));
                }
                self.state.store(ProcessState::Failed as u8, Ordering::Release);
            }
        }
        Ok(())
    }

    fn rejected(&self, from: ProcessState, event: Transition) -> ProcessError {
        ProcessError::InvalidTransition {
            name: self.name.clone(),
            from,
            event,
        }
    }
}
