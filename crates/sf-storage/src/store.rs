//! Materialized state built from WAL replay, and the `Store` facade that
//! other components persist runs and checkpoints through. Grounded on
//! `oj-storage::state::MaterializedState`'s replay-on-open shape, simplified
//! to this crate's two record types (no per-subsystem `apply` dispatch is
//! needed with only runs and checkpoints to track).

use crate::error::StorageResult;
use crate::wal::{Record, Wal};
use parking_lot::Mutex;
use sf_core::{CheckpointConfig, CheckpointRecord, RunId, WorkflowState};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct MaterializedState {
    pub runs: HashMap<RunId, WorkflowState>,
    pub checkpoints: HashMap<RunId, Vec<CheckpointRecord>>,
}

impl MaterializedState {
    /// Idempotent by construction: replaying the same upsert twice just
    /// overwrites the run with the same value, and a delete tombstones both
    /// the run and every checkpoint taken for it — a cascade, not a
    /// per-checkpoint delete, since a checkpoint without its run is useless.
    fn apply(&mut self, record: &Record) {
        match record {
            Record::RunUpserted { state } => {
                self.runs.insert(state.run_id, state.clone());
            }
            Record::CheckpointUpserted { checkpoint } => {
                self.checkpoints.entry(checkpoint.run_id).or_default().push(checkpoint.clone());
            }
            Record::RunDeleted { run_id } => {
                self.runs.remove(run_id);
                self.checkpoints.remove(run_id);
            }
        }
    }
}

struct StoreInner {
    wal: Wal,
    state: MaterializedState,
    checkpoint_config: CheckpointConfig,
}

/// Persists workflow runs and their checkpoints to an append-only log on
/// disk, keeping a materialized in-memory view for fast reads.
pub struct Store {
    inner: Mutex<StoreInner>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>, checkpoint_config: CheckpointConfig) -> StorageResult<Self> {
        let wal = Wal::open(path)?;
        let mut state = MaterializedState::default();
        for entry in wal.all_entries() {
            state.apply(&entry.record);
        }
        Ok(Self { inner: Mutex::new(StoreInner { wal, state, checkpoint_config }) })
    }

    pub fn save_run(&self, state: &WorkflowState) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let record = Record::RunUpserted { state: state.clone() };
        inner.wal.append(&record)?;
        inner.wal.flush()?;
        inner.state.apply(&record);
        Ok(())
    }

    pub fn get_run(&self, run_id: RunId) -> Option<WorkflowState> {
        self.inner.lock().state.runs.get(&run_id).cloned()
    }

    pub fn list_runs(&self) -> Vec<WorkflowState> {
        self.inner.lock().state.runs.values().cloned().collect()
    }

    /// Appends a checkpoint and enforces the configured retention cap for
    /// its run, dropping the oldest checkpoints first.
    pub fn save_checkpoint(&self, checkpoint: CheckpointRecord) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let run_id = checkpoint.run_id;
        let record = Record::CheckpointUpserted { checkpoint };
        inner.wal.append(&record)?;
        inner.wal.flush()?;
        inner.state.apply(&record);

        let max = inner.checkpoint_config.max_checkpoints;
        if let Some(list) = inner.state.checkpoints.get_mut(&run_id) {
            if list.len() > max {
                let excess = list.len() - max;
                list.drain(0..excess);
            }
        }
        Ok(())
    }

    pub fn list_checkpoints(&self, run_id: RunId) -> Vec<CheckpointRecord> {
        self.inner.lock().state.checkpoints.get(&run_id).cloned().unwrap_or_default()
    }

    /// Tombstones a run and cascades the delete to its checkpoints.
    pub fn delete_run(&self, run_id: RunId) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let record = Record::RunDeleted { run_id };
        inner.wal.append(&record)?;
        inner.wal.flush()?;
        inner.state.apply(&record);
        Ok(())
    }

    pub fn close(&self) -> StorageResult<()> {
        self.inner.lock().wal.flush()
    }
}
