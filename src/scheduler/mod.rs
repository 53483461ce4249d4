/*!
 * Scheduler Module
 * FCFS controller, worker cores and configuration
 */

pub mod config;
pub mod controller;
pub mod types;
mod worker;

// Re-export public API
pub use config::SchedulerConfig;
pub use controller::Scheduler;
pub use types::{ControlOutcome, SchedulerState};
