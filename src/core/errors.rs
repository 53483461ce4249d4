/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use crate::core::types::CoreId;
use crate::process::types::{ProcessState, Transition};
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result of a controller-level operation
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Result of a process record transition
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors raised by the scheduler controller and returned synchronously to the caller
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    #[error("Process '{0}' already exists")]
    #[diagnostic(
        code(scheduler::duplicate_name),
        help("Process names are unique. Pick another name or resume the existing process with `screen -r`.")
    )]
    DuplicateName(String),

    #[error("Process '{0}' not found")]
    #[diagnostic(
        code(scheduler::not_found),
        help("List known processes with `screen -ls`.")
    )]
    NotFound(String),

    #[error("Invalid process name: {0:?}")]
    #[diagnostic(
        code(scheduler::invalid_name),
        help("Names must be non-empty, at most 64 characters, and must not contain path separators.")
    )]
    InvalidName(String),

    #[error("Invalid scheduler configuration: {0}")]
    #[diagnostic(
        code(scheduler::invalid_config),
        help("Core count and work units must both be greater than zero.")
    )]
    InvalidConfig(String),

    #[error("No async runtime available to host worker cores")]
    #[diagnostic(
        code(scheduler::no_runtime),
        help("Start the scheduler from within a multi-threaded tokio runtime.")
    )]
    NoRuntime,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Illegal process record transitions
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ProcessError {
    #[error("Process '{name}' cannot apply {event:?} while {from}")]
    #[diagnostic(
        code(process::invalid_transition),
        help("Process state only moves forward: waiting -> running -> finished.")
    )]
    InvalidTransition {
        name: String,
        from: ProcessState,
        event: Transition,
    },
}

/// Failures of a worker core during unattended execution
#[derive(Error, Debug, Diagnostic)]
pub enum WorkerError {
    #[error("Core {core} failed writing output for process '{name}': {source}")]
    #[diagnostic(
        code(worker::artifact_write),
        help("Check that the output directory exists and is writable.")
    )]
    ArtifactWrite {
        name: String,
        core: CoreId,
        #[source]
        source: std::io::Error,
    },

    #[error("Core {core} rejected a state transition: {source}")]
    #[diagnostic(code(worker::transition))]
    Transition {
        core: CoreId,
        #[source]
        source: ProcessError,
    },

    #[error("Core {core} task ended abnormally: {reason}")]
    #[diagnostic(code(worker::aborted))]
    Aborted { core: CoreId, reason: String },
}

impl WorkerError {
    /// Core index the failure happened on
    pub fn core(&self) -> CoreId {
        match self {
            WorkerError::ArtifactWrite { core, .. }
            | WorkerError::Transition { core, .. }
            | WorkerError::Aborted { core, .. } => *core,
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    #[diagnostic(
        code(config::parse),
        help("The config file is a JSON object with keys such as num-cpu and work-units.")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {var}: {value:?}")]
    #[diagnostic(code(config::invalid_env))]
    InvalidEnv { var: &'static str, value: String },
}
