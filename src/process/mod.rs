/*!
 * Process Module
 * Process records, the ready queue and the process registry
 */

pub mod queue;
pub mod record;
pub mod registry;
pub mod types;

// Re-export for convenience
pub use queue::ReadyQueue;
pub use record::ProcessRecord;
pub use registry::ProcessRegistry;
pub use types::{ProcessState, ProcessView, Transition};
