/*!
 * Structured Tracing
 * tracing-subscriber setup for the scheduler and its worker cores
 */

use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Enable JSON log output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "CSOPESY_TRACE_JSON";

/// Initialize structured tracing
///
/// Logs go to stderr so they never interleave with console output on stdout.
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: `default_directive`)
/// - CSOPESY_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_tracing(default_directive: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok()
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
}
