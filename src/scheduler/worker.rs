/*!
 * Worker Core
 *
 * One polling loop per core. A core takes the head of the ready queue,
 * claims the named process, runs every work unit to completion and then
 * goes back to polling. Stop requests are only observed between processes.
 */

use super::config::SchedulerConfig;
use crate::core::errors::WorkerError;
use crate::core::types::CoreId;
use crate::process::{ProcessRecord, ProcessRegistry, ReadyQueue, Transition};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// State shared between the controller and its worker cores
#[derive(Debug)]
pub(crate) struct Shared {
    pub registry: ProcessRegistry,
    pub queue: ReadyQueue,
    pub config: SchedulerConfig,
    /// Failures of cores that halted, drained by `Scheduler::join`
    pub failures: Mutex<Vec<WorkerError>>,
}

impl Shared {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            registry: ProcessRegistry::new(),
            queue: ReadyQueue::new(),
            config,
            failures: Mutex::new(Vec::new()),
        }
    }
}

/// A single worker core
pub(crate) struct WorkerCore {
    id: CoreId,
    shared: Arc<Shared>,
    stop: watch::Receiver<bool>,
}

impl WorkerCore {
    pub fn new(id: CoreId, shared: Arc<Shared>, stop: watch::Receiver<bool>) -> Self {
        Self { id, shared, stop }
    }

    /// Poll loop; returns once a stop is observed or the core fails
    pub async fn run(mut self) {
        info!(core = self.id, "Worker core started");

        loop {
            if *self.stop.borrow() {
                break;
            }

            match self.shared.queue.dequeue() {
                Some(name) => {
                    if let Err(e) = self.execute(&name).await {
                        error!(core = self.id, error = %e, "Worker core halted");
                        self.shared.failures.lock().push(e);
                        return;
                    }
                }
                None => {
                    if !self.idle().await {
                        break;
                    }
                }
            }
        }

        info!(core = self.id, "Worker core stopped");
    }

    /// Sleep one poll interval, waking early on a stop request.
    /// Returns false if the controller is gone.
    async fn idle(&mut self) -> bool {
        let interval = self.shared.config.poll_interval();
        tokio::select! {
            _ = tokio::time::sleep(interval) => true,
            changed = self.stop.changed() => changed.is_ok(),
        }
    }

    #[instrument(level = "debug", skip(self), fields(core = self.id))]
    async fn execute(&self, name: &str) -> Result<(), WorkerError> {
        let Some(record) = self.shared.registry.get(name) else {
            warn!("Dequeued process has no registry entry");
            return Ok(());
        };

        if let Err(e) = record.apply(Transition::Claim(self.id)) {
            warn!(error = %e, "Skipping process that could not be claimed");
            return Ok(());
        }
        debug!("Process claimed");

        let outcome = match self.open_artifact(&record).await {
            Ok(artifact) => self.run_units(&record, artifact).await,
            Err(e) => Err(e),
        };
        self.settle(&record, outcome)
    }

    /// Finish the process, or mark it failed and pass the error on
    fn settle(
        &self,
        record: &ProcessRecord,
        outcome: Result<(), WorkerError>,
    ) -> Result<(), WorkerError> {
        match outcome {
            Ok(()) => {
                record
                    .apply(Transition::Finish)
                    .map_err(|source| WorkerError::Transition {
                        core: self.id,
                        source,
                    })?;
                info!(core = self.id, process = record.name(), "Process finished");
                Ok(())
            }
            Err(e) => {
                if let Err(fail) = record.apply(Transition::Fail) {
                    warn!(error = %fail, "Could not mark process failed");
                }
                Err(e)
            }
        }
    }

    fn artifact_error(&self, record: &ProcessRecord, source: std::io::Error) -> WorkerError {
        WorkerError::ArtifactWrite {
            name: record.name().to_string(),
            core: self.id,
            source,
        }
    }

    /// Create (or truncate) `<output_dir>/<name>.txt`
    async fn open_artifact(&self, record: &ProcessRecord) -> Result<File, WorkerError> {
        let path = self.shared.config.artifact_path(record.name());
        File::create(&path)
            .await
            .map_err(|e| self.artifact_error(record, e))
    }

    /// Execute every work unit, appending one artifact line per unit
    ///
    /// Progress only counts units whose line was flushed.
    async fn run_units<W>(
        &self,
        record: &ProcessRecord,
        mut artifact: W,
    ) -> Result<(), WorkerError>
    where
        W: AsyncWrite + Unpin,
    {
        let line = format!(
            "{} Core: {} \"Hello world from {}!\"\n",
            record.created_at(),
            self.id,
            record.name()
        );
        let delay = self.shared.config.unit_delay();

        for _ in 0..record.total() {
            artifact
                .write_all(line.as_bytes())
                .await
                .map_err(|e| self.artifact_error(record, e))?;
            artifact
                .flush()
                .await
                .map_err(|e| self.artifact_error(record, e))?;
            record
                .apply(Transition::Advance)
                .map_err(|source| WorkerError::Transition {
                    core: self.id,
                    source,
                })?;
            tokio::time::sleep(delay).await;
        }

        artifact
            .shutdown()
            .await
            .map_err(|e| self.artifact_error(record, e))
    }
}
