/*!
 * Status Reporter
 * Point-in-time process listing grouped by state
 */

use crate::process::{ProcessState, ProcessView};
use serde::Serialize;
use std::fmt;

const RULE: &str = "--------------------------------------";

/// Snapshot of every process, grouped by state and ordered by name
///
/// Not linearizable: each record is copied independently, so a process may
/// be seen slightly behind its true progress. It is never seen going
/// backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub running: Vec<ProcessView>,
    pub finished: Vec<ProcessView>,
    pub waiting: Vec<ProcessView>,
    pub failed: Vec<ProcessView>,
    pub cores_total: usize,
}

impl Snapshot {
    /// Partition views by state
    pub fn collect(views: impl IntoIterator<Item = ProcessView>, cores_total: usize) -> Self {
        let mut snapshot = Snapshot {
            cores_total,
            ..Default::default()
        };

        for view in views {
            let group = match view.state {
                ProcessState::Running => &mut snapshot.running,
                ProcessState::Finished => &mut snapshot.finished,
                ProcessState::Waiting => &mut snapshot.waiting,
                ProcessState::Failed => &mut snapshot.failed,
            };
            group.push(view);
        }

        for group in [
            &mut snapshot.running,
            &mut snapshot.finished,
            &mut snapshot.waiting,
            &mut snapshot.failed,
        ] {
            group.sort_by(|a, b| a.name.cmp(&b.name));
        }
        snapshot
    }

    /// Total processes across all groups
    pub fn len(&self) -> usize {
        self.running.len() + self.finished.len() + self.waiting.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cores_used(&self) -> usize {
        self.running.len().min(self.cores_total)
    }

    pub fn cores_available(&self) -> usize {
        self.cores_total.saturating_sub(self.cores_used())
    }

    /// Percentage of cores running a process
    pub fn utilization(&self) -> f64 {
        if self.cores_total == 0 {
            return 0.0;
        }
        self.cores_used() as f64 * 100.0 / self.cores_total as f64
    }

    /// Text listing shown by `screen -ls` and written by `report-util`
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Pretty-printed JSON written by `report-util --json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CPU utilization: {:.0}%", self.utilization())?;
        writeln!(f, "Cores used: {}", self.cores_used())?;
        writeln!(f, "Cores available: {}", self.cores_available())?;
        writeln!(f)?;
        writeln!(f, "{}", RULE)?;

        write_group(f, "Running processes:", &self.running)?;
        writeln!(f)?;
        write_group(f, "Finished processes:", &self.finished)?;
        writeln!(f)?;
        write_group(f, "Waiting processes:", &self.waiting)?;
        if !self.failed.is_empty() {
            writeln!(f)?;
            write_group(f, "Failed processes:", &self.failed)?;
        }

        writeln!(f, "{}", RULE)
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, title: &str, views: &[ProcessView]) -> fmt::Result {
    writeln!(f, "{}", title)?;
    for view in views {
        let placement = match (view.state, view.core) {
            (ProcessState::Finished, _) => "Finished".to_string(),
            (_, Some(core)) => format!("Core: {}", core),
            (_, None) => "Core: -".to_string(),
        };
        writeln!(
            f,
            "{:<12} ({})    {:<10} {} / {}",
            view.name, view.created_at, placement, view.progress, view.total
        )?;
    }
    Ok(())
}
