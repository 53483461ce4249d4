/*!
 * Monitoring
 * Structured tracing and process status reporting
 */

mod status;
mod tracer;

pub use status::Snapshot;
pub use tracer::{init_tracing, ENV_TRACE_JSON};
