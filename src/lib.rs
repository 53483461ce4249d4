/*!
 * CSOPESY Kernel Library
 * Multi-core FCFS process scheduler emulator exposed as a library
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod shell;

// Re-exports
pub use crate::core::errors::{
    ConfigError, ProcessError, ProcessResult, SchedulerError, SchedulerResult, WorkerError,
};
pub use crate::core::types::{CoreId, Units};
pub use monitoring::{init_tracing, Snapshot};
pub use process::{ProcessState, ProcessView};
pub use scheduler::{ControlOutcome, Scheduler, SchedulerConfig, SchedulerState};
pub use shell::{Command, Console, Reply};
