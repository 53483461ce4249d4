/*!
 * CSOPESY - Main Entry Point
 *
 * Console front end for the multi-core FCFS scheduler emulator:
 * - Process creation and screens
 * - Scheduler start/stop
 * - Process listing and utilization report
 */

use csopesy_kernel::{init_tracing, Console, SchedulerConfig};
use miette::IntoDiagnostic;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Warnings only by default so logs stay out of the way of the console
    init_tracing("warn");

    let config = SchedulerConfig::from_env()?;
    info!(
        cores = config.num_cpu,
        work_units = config.work_units,
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    let mut console = Console::new(config);
    console
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .into_diagnostic()?;

    info!("Console exited");
    Ok(())
}
