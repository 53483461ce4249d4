/*!
 * Scheduler Configuration
 *
 * Defaults, JSON config files and environment overrides
 */

use crate::core::errors::{ConfigError, SchedulerError, SchedulerResult};
use crate::core::limits::{
    ARTIFACT_EXTENSION, DEFAULT_NUM_CORES, DEFAULT_OUTPUT_DIR, DEFAULT_POLL_INTERVAL,
    DEFAULT_UNIT_DELAY, DEFAULT_WORK_UNITS, REPORT_FILE_NAME, REPORT_JSON_FILE_NAME,
};
use crate::core::types::Units;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path to a JSON config file
pub const ENV_CONFIG: &str = "CSOPESY_CONFIG";
/// Core count override
pub const ENV_NUM_CPU: &str = "CSOPESY_NUM_CPU";
/// Work unit override
pub const ENV_UNITS: &str = "CSOPESY_UNITS";
/// Output directory override
pub const ENV_OUTPUT_DIR: &str = "CSOPESY_OUTPUT_DIR";

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SchedulerConfig {
    /// Worker cores spawned by `start`
    pub num_cpu: usize,
    /// Work units each process executes
    pub work_units: Units,
    /// Idle poll interval (milliseconds)
    pub poll_interval_ms: u64,
    /// Simulated duration of one work unit (milliseconds)
    pub unit_delay_ms: u64,
    /// Where process artifacts and reports are written
    pub output_dir: PathBuf,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_cpu: DEFAULT_NUM_CORES,
            work_units: DEFAULT_WORK_UNITS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            unit_delay_ms: DEFAULT_UNIT_DELAY.as_millis() as u64,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for fast test runs: short delays, few units
    pub fn quick(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            num_cpu: 2,
            work_units: 10,
            poll_interval_ms: 5,
            unit_delay_ms: 1,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_cores(mut self, num_cpu: usize) -> Self {
        self.num_cpu = num_cpu;
        self
    }

    pub fn with_work_units(mut self, work_units: Units) -> Self {
        self.work_units = work_units;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_unit_delay(mut self, delay: Duration) -> Self {
        self.unit_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn unit_delay(&self) -> Duration {
        Duration::from_millis(self.unit_delay_ms)
    }

    /// Output artifact of a process: `<output_dir>/<name>.txt`
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", name, ARTIFACT_EXTENSION))
    }

    /// Target of `report-util`
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    /// Target of `report-util --json`
    pub fn report_json_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_JSON_FILE_NAME)
    }

    /// Reject configurations the scheduler cannot run
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.num_cpu == 0 {
            return Err(SchedulerError::InvalidConfig(
                "num-cpu must be at least 1".into(),
            ));
        }
        if self.work_units == 0 {
            return Err(SchedulerError::InvalidConfig(
                "work-units must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Load a JSON config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `CSOPESY_*` overrides from a variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_NUM_CPU) {
            self.num_cpu = parse_var(ENV_NUM_CPU, value)?;
        }
        if let Some(value) = lookup(ENV_UNITS) {
            self.work_units = parse_var(ENV_UNITS, value)?;
        }
        if let Some(value) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(value);
        }
        Ok(self)
    }

    /// Build from the process environment
    ///
    /// Environment variables:
    /// - CSOPESY_CONFIG: JSON config file to start from (default: built-in defaults)
    /// - CSOPESY_NUM_CPU, CSOPESY_UNITS, CSOPESY_OUTPUT_DIR: per-field overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var(ENV_CONFIG) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.apply_overrides(|var| std::env::var(var).ok())
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
