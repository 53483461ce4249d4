/*!
 * System Limits and Constants
 *
 * Centralized location for scheduler defaults and fixed sizes.
 */

use super::types::Units;
use std::time::Duration;

// =============================================================================
// SCHEDULER DEFAULTS
// =============================================================================

/// Worker cores spawned by `scheduler-start` unless configured otherwise
pub const DEFAULT_NUM_CORES: usize = 4;

/// Work units (output lines) each process executes
pub const DEFAULT_WORK_UNITS: Units = 100;

/// How long an idle core sleeps before polling the ready queue again
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Simulated duration of one work unit
pub const DEFAULT_UNIT_DELAY: Duration = Duration::from_millis(20);

// =============================================================================
// OUTPUT
// =============================================================================

/// Directory process artifacts and reports are written to
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Extension of the per-process output artifact
pub const ARTIFACT_EXTENSION: &str = "txt";

/// File written by `report-util`
pub const REPORT_FILE_NAME: &str = "csopesy-log.txt";

/// File written by `report-util --json`
pub const REPORT_JSON_FILE_NAME: &str = "csopesy-log.json";

// =============================================================================
// PROCESS NAMES
// =============================================================================

/// Longest accepted process name (bytes)
pub const MAX_PROCESS_NAME_LEN: usize = 64;
