/*!
 * Scheduler Controller
 *
 * Owns the registry, the ready queue and the worker pool. Every collaborator
 * goes through a `Scheduler` instance; there is no global state.
 *
 * # Shutdown
 *
 * `stop()` is cooperative: cores finish the process they are running and
 * then exit instead of dequeuing another. `join().await` waits for that and
 * hands back any core failures. Dropping a `Scheduler` whose cores are still
 * alive aborts them and logs a warning.
 */

use super::config::SchedulerConfig;
use super::types::{ControlOutcome, SchedulerState};
use super::worker::{Shared, WorkerCore};
use crate::core::errors::{SchedulerError, SchedulerResult, WorkerError};
use crate::core::limits::MAX_PROCESS_NAME_LEN;
use crate::core::types::CoreId;
use crate::monitoring::Snapshot;
use crate::process::{ProcessRecord, ProcessView};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Worker pool bookkeeping, guarded by one lock
///
/// Handles stay in `workers` until the core has exited, so the pool never
/// reports Inactive while a core is still running.
struct Pool {
    state: SchedulerState,
    stop_tx: Option<watch::Sender<bool>>,
    workers: Vec<JoinHandle<()>>,
    /// Finished cores not yet collected by `join`
    exited: Vec<(CoreId, JoinHandle<()>)>,
}

impl Pool {
    /// Move to Inactive once every core has exited its loop
    fn refresh(&mut self) {
        if self.state != SchedulerState::Inactive
            && self.workers.iter().all(JoinHandle::is_finished)
        {
            debug!(previous = ?self.state, "All worker cores exited");
            self.exited.extend(self.workers.drain(..).enumerate());
            self.stop_tx = None;
            self.state = SchedulerState::Inactive;
        }
    }

    /// Cores that can still take a process
    fn live_cores(&self) -> usize {
        self.workers.iter().filter(|h| !h.is_finished()).count()
    }
}

/// FCFS multi-core scheduler
pub struct Scheduler {
    shared: Arc<Shared>,
    pool: Mutex<Pool>,
}

impl Scheduler {
    /// Create an inactive scheduler
    pub fn new(config: SchedulerConfig) -> SchedulerResult<Self> {
        config.validate()?;
        info!(
            cores = config.num_cpu,
            work_units = config.work_units,
            output_dir = %config.output_dir.display(),
            "Scheduler initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared::new(config)),
            pool: Mutex::new(Pool {
                state: SchedulerState::Inactive,
                stop_tx: None,
                workers: Vec::new(),
                exited: Vec::new(),
            }),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Admit a new process
    ///
    /// The record is in the registry before its name reaches the queue, so a
    /// core never dequeues a name without a record.
    pub fn create_process(&self, name: &str) -> SchedulerResult<()> {
        validate_name(name)?;

        let record = ProcessRecord::new(name, self.shared.config.work_units);
        self.shared.registry.insert(record)?;
        self.shared.queue.enqueue(name.to_string());

        info!(process = name, queued = self.shared.queue.len(), "Process created");
        Ok(())
    }

    /// Look up one process
    pub fn process(&self, name: &str) -> SchedulerResult<ProcessView> {
        self.shared
            .registry
            .get(name)
            .map(|record| record.view())
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))
    }

    /// Names still waiting in the ready queue
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Point-in-time view of every process, grouped by state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::collect(self.shared.registry.views(), self.capacity())
    }

    /// Cores counted by the snapshot
    ///
    /// The configured count while inactive; while running, only the cores
    /// that have not halted.
    pub fn capacity(&self) -> usize {
        let mut pool = self.pool.lock();
        pool.refresh();
        match pool.state {
            SchedulerState::Inactive => self.shared.config.num_cpu,
            _ => pool.live_cores(),
        }
    }

    /// Start the configured number of cores
    pub fn start(&self) -> SchedulerResult<ControlOutcome> {
        self.start_with(self.shared.config.num_cpu)
    }

    /// Start `cores` worker cores
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_with(&self, cores: usize) -> SchedulerResult<ControlOutcome> {
        if cores == 0 {
            return Err(SchedulerError::InvalidConfig(
                "core count must be at least 1".into(),
            ));
        }

        let mut pool = self.pool.lock();
        pool.refresh();
        match pool.state {
            SchedulerState::Active => return Ok(ControlOutcome::AlreadyActive),
            SchedulerState::StopRequested => return Ok(ControlOutcome::StopPending),
            SchedulerState::Inactive => {}
        }

        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let (stop_tx, stop_rx) = watch::channel(false);
        pool.workers = (0..cores)
            .map(|id| {
                let core = WorkerCore::new(id, Arc::clone(&self.shared), stop_rx.clone());
                runtime.spawn(core.run())
            })
            .collect();
        pool.stop_tx = Some(stop_tx);
        pool.state = SchedulerState::Active;

        info!(cores, queued = self.shared.queue.len(), "Scheduler started");
        Ok(ControlOutcome::Started { cores })
    }

    /// Ask every core to stop after its current process
    pub fn stop(&self) -> ControlOutcome {
        let mut pool = self.pool.lock();
        pool.refresh();
        match pool.state {
            SchedulerState::Active => {
                if let Some(tx) = &pool.stop_tx {
                    tx.send_replace(true);
                }
                pool.state = SchedulerState::StopRequested;
                info!("Scheduler stop requested");
                ControlOutcome::StopRequested
            }
            SchedulerState::StopRequested => ControlOutcome::StopPending,
            SchedulerState::Inactive => ControlOutcome::NotActive,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        let mut pool = self.pool.lock();
        pool.refresh();
        pool.state
    }

    /// Wait for every core to exit and collect core failures
    ///
    /// Cores only exit after `stop()` or a failure; joining an active
    /// scheduler waits until one of those happens. The pool keeps its
    /// handles while this waits, so `state()`, `start()` and `stop()` stay
    /// accurate in the meantime.
    pub async fn join(&self) -> Vec<WorkerError> {
        let interval = self.shared.config.poll_interval();
        loop {
            {
                let mut pool = self.pool.lock();
                pool.refresh();
                if pool.state == SchedulerState::Inactive {
                    break;
                }
            }
            tokio::time::sleep(interval).await;
        }

        let exited = std::mem::take(&mut self.pool.lock().exited);
        let mut failures = Vec::new();
        for (core, handle) in exited {
            if let Err(e) = handle.await {
                failures.push(WorkerError::Aborted {
                    core,
                    reason: e.to_string(),
                });
            }
        }

        let mut halted = std::mem::take(&mut *self.shared.failures.lock());
        halted.append(&mut failures);
        halted.sort_by_key(WorkerError::core);
        halted
    }

    /// `stop()` followed by `join()`
    pub async fn shutdown(&self) -> Vec<WorkerError> {
        self.stop();
        self.join().await
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let pool = self.pool.get_mut();
        let live = pool.workers.iter().filter(|h| !h.is_finished()).count();
        if live > 0 {
            warn!(
                live,
                "Scheduler dropped with running cores - aborting them. \
                 Use `scheduler.shutdown().await` for graceful cleanup."
            );
            for handle in &pool.workers {
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.shared.config)
            .field("processes", &self.shared.registry.len())
            .field("queued", &self.shared.queue.len())
            .finish()
    }
}

/// Names double as artifact file names
fn validate_name(name: &str) -> SchedulerResult<()> {
    let invalid = name.trim().is_empty()
        || name.len() > MAX_PROCESS_NAME_LEN
        || name == "."
        || name == ".."
        || name.chars().any(|c| matches!(c, '/' | '\\') || c.is_control());
    if invalid {
        return Err(SchedulerError::InvalidName(name.to_string()));
    }
    Ok(())
}
