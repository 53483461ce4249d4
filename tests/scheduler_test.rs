/*!
 * Scheduler Tests
 * FCFS dispatch, worker cores, artifacts and controller lifecycle
 */

use csopesy_kernel::{
    ControlOutcome, ProcessState, Scheduler, SchedulerConfig, SchedulerError, SchedulerState,
    WorkerError,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WAIT_LIMIT: Duration = Duration::from_secs(20);

fn config(dir: &Path, cores: usize, units: u32) -> SchedulerConfig {
    SchedulerConfig::quick(dir)
        .with_cores(cores)
        .with_work_units(units)
        .with_poll_interval(Duration::from_millis(2))
        .with_unit_delay(Duration::from_millis(2))
}

/// Poll until `done` holds or the wait limit passes
async fn wait_until(scheduler: &Scheduler, mut done: impl FnMut(&Scheduler) -> bool) {
    tokio::time::timeout(WAIT_LIMIT, async {
        while !done(scheduler) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn state_of(scheduler: &Scheduler, name: &str) -> ProcessState {
    scheduler.process(name).unwrap().state
}

#[test]
fn test_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 2, 5)).unwrap();

    let snapshot = scheduler.snapshot();
    assert!(snapshot.running.is_empty());
    assert!(snapshot.finished.is_empty());
    assert!(snapshot.waiting.is_empty());
    assert!(snapshot.failed.is_empty());
}

#[test]
fn test_created_processes_start_waiting() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 2, 5)).unwrap();

    for name in ["p3", "p1", "p2"] {
        scheduler.create_process(name).unwrap();
    }

    let snapshot = scheduler.snapshot();
    let waiting: Vec<&str> = snapshot.waiting.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(waiting, vec!["p1", "p2", "p3"]);
    assert!(snapshot.running.is_empty());
    assert!(snapshot.finished.is_empty());
    assert!(snapshot.waiting.iter().all(|v| v.progress == 0 && v.core.is_none()));
    assert_eq!(scheduler.queued(), 3);
}

#[test]
fn test_duplicate_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 1, 5)).unwrap();

    scheduler.create_process("p1").unwrap();
    let before = scheduler.process("p1").unwrap();

    let err = scheduler.create_process("p1").unwrap_err();
    assert!(matches!(err, SchedulerError::DuplicateName(ref n) if n == "p1"));
    assert_eq!(scheduler.process("p1").unwrap(), before);
    assert_eq!(scheduler.queued(), 1);
    assert_eq!(scheduler.snapshot().len(), 1);
}

proptest! {
    #[test]
    fn prop_every_created_name_listed_once(
        names in prop::collection::hash_set("[a-z][a-z0-9_]{0,12}", 0..24)
    ) {
        let dir = TempDir::new().unwrap();
        let scheduler = Scheduler::new(config(dir.path(), 2, 5)).unwrap();
        for name in &names {
            scheduler.create_process(name).unwrap();
        }

        let snapshot = scheduler.snapshot();
        prop_assert_eq!(snapshot.waiting.len(), names.len());
        let listed: HashSet<String> = snapshot.waiting.into_iter().map(|v| v.name).collect();
        prop_assert_eq!(listed, names);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_process_runs_to_completion_with_artifact() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 1, 10)).unwrap();
    scheduler.create_process("p1").unwrap();

    assert_eq!(scheduler.start().unwrap(), ControlOutcome::Started { cores: 1 });
    wait_until(&scheduler, |s| state_of(s, "p1") == ProcessState::Finished).await;

    let view = scheduler.process("p1").unwrap();
    assert_eq!(view.progress, 10);
    assert_eq!(view.core, Some(0));

    let artifact = std::fs::read_to_string(dir.path().join("p1.txt")).unwrap();
    let expected_line = format!("{} Core: 0 \"Hello world from p1!\"", view.created_at);
    let lines: Vec<&str> = artifact.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|line| *line == expected_line));

    assert!(scheduler.shutdown().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_core_runs_in_arrival_order() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 1, 20)).unwrap();
    scheduler.create_process("P1").unwrap();
    scheduler.create_process("P2").unwrap();
    scheduler.start().unwrap();

    // P2 stays Waiting for as long as P1 is unfinished
    tokio::time::timeout(WAIT_LIMIT, async {
        loop {
            let p2 = state_of(&scheduler, "P2");
            let p1 = state_of(&scheduler, "P1");
            if p1 != ProcessState::Finished {
                assert_eq!(p2, ProcessState::Waiting, "P2 left Waiting before P1 finished");
            } else {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap();

    wait_until(&scheduler, |s| state_of(s, "P2") == ProcessState::Finished).await;
    assert_eq!(scheduler.process("P1").unwrap().progress, 20);
    assert_eq!(scheduler.process("P2").unwrap().core, Some(0));

    assert!(scheduler.shutdown().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_progress_and_state_only_move_forward() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 1, 25)).unwrap();
    scheduler.create_process("mono").unwrap();
    scheduler.start().unwrap();

    let mut last_progress = 0;
    let mut last_state = ProcessState::Waiting;
    tokio::time::timeout(WAIT_LIMIT, async {
        loop {
            let view = scheduler.process("mono").unwrap();
            assert!(view.progress >= last_progress, "progress went backwards");
            assert!(view.state >= last_state, "state regressed");
            if view.state == ProcessState::Finished {
                assert_eq!(view.progress, 25);
                break;
            }
            last_progress = view.progress;
            last_state = view.state;
            tokio::time::sleep(Duration::from_micros(500)).await;
        }
    })
    .await
    .unwrap();

    assert!(scheduler.shutdown().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_processes_land_on_distinct_cores() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 3, 40)).unwrap();
    for name in ["a", "b", "c"] {
        scheduler.create_process(name).unwrap();
    }
    scheduler.start().unwrap();

    tokio::time::timeout(WAIT_LIMIT, async {
        loop {
            let snapshot = scheduler.snapshot();
            let busy: Vec<usize> = snapshot.running.iter().filter_map(|v| v.core).collect();
            let distinct: HashSet<usize> = busy.iter().copied().collect();
            assert_eq!(busy.len(), distinct.len(), "one core running two processes");
            if snapshot.finished.len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap();

    let cores: HashSet<usize> = ["a", "b", "c"]
        .iter()
        .filter_map(|name| scheduler.process(name).unwrap().core)
        .collect();
    assert_eq!(cores, HashSet::from([0, 1, 2]));

    assert!(scheduler.shutdown().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_lets_running_process_finish() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 1, 30)).unwrap();
    scheduler.create_process("first").unwrap();
    scheduler.create_process("second").unwrap();
    scheduler.start().unwrap();

    wait_until(&scheduler, |s| state_of(s, "first") == ProcessState::Running).await;
    assert_eq!(scheduler.stop(), ControlOutcome::StopRequested);
    assert_eq!(scheduler.stop(), ControlOutcome::StopPending);
    assert_eq!(scheduler.start().unwrap(), ControlOutcome::StopPending);

    assert!(scheduler.join().await.is_empty());
    assert_eq!(scheduler.state(), SchedulerState::Inactive);

    let first = scheduler.process("first").unwrap();
    assert_eq!(first.state, ProcessState::Finished);
    assert_eq!(first.progress, 30);
    let artifact = std::fs::read_to_string(dir.path().join("first.txt")).unwrap();
    assert_eq!(artifact.lines().count(), 30);

    // Nothing further was claimed
    assert_eq!(state_of(&scheduler, "second"), ProcessState::Waiting);
    assert_eq!(scheduler.queued(), 1);
    assert!(!dir.path().join("second.txt").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restart_resumes_queue() {
    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(config(dir.path(), 1, 5)).unwrap();

    scheduler.create_process("late").unwrap();
    scheduler.start().unwrap();
    scheduler.stop();
    scheduler.join().await;

    scheduler.start().unwrap();
    wait_until(&scheduler, |s| state_of(s, "late") == ProcessState::Finished).await;
    assert!(scheduler.shutdown().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unwritable_output_fails_process_and_core() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does/not/exist");
    let scheduler = Scheduler::new(config(&missing, 1, 5)).unwrap();
    scheduler.create_process("doomed").unwrap();
    scheduler.create_process("next").unwrap();
    scheduler.start().unwrap();

    let failures = scheduler.join().await;
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        WorkerError::ArtifactWrite { name, core: 0, .. } if name == "doomed"
    ));

    let doomed = scheduler.process("doomed").unwrap();
    assert_eq!(doomed.state, ProcessState::Failed);
    assert_eq!(doomed.progress, 0);
    assert_eq!(scheduler.snapshot().failed.len(), 1);

    // The halted core claims nothing else
    assert_eq!(state_of(&scheduler, "next"), ProcessState::Waiting);
    assert_eq!(scheduler.state(), SchedulerState::Inactive);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_controls_during_join_see_draining_cores() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), 1, 50).with_unit_delay(Duration::from_millis(10));
    let scheduler = Arc::new(Scheduler::new(config).unwrap());
    scheduler.create_process("a").unwrap();
    scheduler.create_process("b").unwrap();
    scheduler.start().unwrap();

    wait_until(&scheduler, |s| state_of(s, "a") == ProcessState::Running).await;
    assert_eq!(scheduler.stop(), ControlOutcome::StopRequested);

    let joiner = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.join().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Core 0 is still running "a"
    assert_eq!(scheduler.state(), SchedulerState::StopRequested);
    assert_eq!(scheduler.start().unwrap(), ControlOutcome::StopPending);
    assert_eq!(scheduler.stop(), ControlOutcome::StopPending);
    assert_eq!(state_of(&scheduler, "b"), ProcessState::Waiting);

    assert!(joiner.await.unwrap().is_empty());
    assert_eq!(scheduler.state(), SchedulerState::Inactive);
    assert_eq!(state_of(&scheduler, "a"), ProcessState::Finished);
    assert_eq!(state_of(&scheduler, "b"), ProcessState::Waiting);
    assert!(!dir.path().join("b.txt").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_halted_core_leaves_capacity() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does/not/exist");
    let scheduler = Scheduler::new(config(&missing, 2, 5)).unwrap();
    assert_eq!(scheduler.capacity(), 2);

    scheduler.create_process("doomed").unwrap();
    scheduler.start().unwrap();

    wait_until(&scheduler, |s| s.snapshot().cores_total == 1).await;
    assert_eq!(scheduler.state(), SchedulerState::Active);

    let snapshot = scheduler.snapshot();
    assert_eq!(snapshot.failed.len(), 1);
    assert_eq!(snapshot.cores_available(), 1);
    assert!(snapshot.render().starts_with("CPU utilization: 0%\nCores used: 0\nCores available: 1\n"));

    let failures = scheduler.shutdown().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(scheduler.capacity(), 2);
}
