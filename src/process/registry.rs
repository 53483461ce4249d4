/*!
 * Process Registry
 * Name-keyed map of every process ever created
 */

use super::record::ProcessRecord;
use super::types::ProcessView;
use crate::core::errors::{SchedulerError, SchedulerResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent process registry
///
/// Records are never removed, so finished processes stay visible to the
/// status reporter.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    records: DashMap<String, Arc<ProcessRecord>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, rejecting a name that is already present
    ///
    /// The check and the insert happen under one shard lock.
    pub fn insert(&self, record: ProcessRecord) -> SchedulerResult<Arc<ProcessRecord>> {
        match self.records.entry(record.name().to_string()) {
            Entry::Occupied(slot) => Err(SchedulerError::DuplicateName(slot.key().clone())),
            Entry::Vacant(slot) => {
                let record = Arc::new(record);
                slot.insert(Arc::clone(&record));
                Ok(record)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ProcessRecord>> {
        self.records.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy every record's current values (unordered)
    pub fn views(&self) -> Vec<ProcessView> {
        self.records.iter().map(|entry| entry.value().view()).collect()
    }
}
