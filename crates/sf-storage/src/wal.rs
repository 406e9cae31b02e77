//! Append-only JSONL write-ahead log. Grounded on `oj-storage`'s WAL
//! (`crates/storage/src/wal_tests.rs`): sequence-numbered entries, a
//! buffered-write threshold before `flush()` is required, and a corrupt-tail
//! rotation scheme on `open()`. Adapted to this crate's record model — there
//! is no `processed_seq` cursor here, since runs/checkpoints are upserted by
//! id rather than replayed as a single ordered command stream.

use crate::error::StorageResult;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use sf_core::{CheckpointRecord, RunId, WorkflowState};

/// A single record appended to the log. Upserts carry the full value so
/// replay never needs to merge partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Record {
    RunUpserted { state: WorkflowState },
    CheckpointUpserted { checkpoint: CheckpointRecord },
    RunDeleted { run_id: RunId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub record: Record,
}

const NEEDS_FLUSH_THRESHOLD: usize = 100;

pub struct Wal {
    path: PathBuf,
    file: File,
    entries: Vec<WalEntry>,
    unflushed: usize,
}

impl Wal {
    /// Opens (creating if absent) the log at `path`, replaying every valid
    /// entry into memory. A line that fails to parse — truncated write,
    /// non-UTF8 bytes, a half-written record from a crash — marks everything
    /// from that point on as corrupt; the corrupt tail is rotated out to a
    /// `.bak` file (keeping up to three generations) and the log is rewritten
    /// with only the entries that parsed cleanly.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read(&path).unwrap_or_default();

        let mut entries = Vec::new();
        let mut corrupted = false;

        match String::from_utf8(raw) {
            Ok(text) => {
                for line in text.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<WalEntry>(line) {
                        Ok(entry) => entries.push(entry),
                        Err(_) => {
                            corrupted = true;
                            break;
                        }
                    }
                }
            }
            Err(_) => corrupted = true,
        }

        if corrupted && path.exists() {
            rotate_backup(&path)?;
        }

        let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
        for entry in &entries {
            writeln!(file, "{}", serde_json::to_string(entry)?)?;
        }
        file.sync_all()?;
        let file = OpenOptions::new().append(true).open(&path)?;

        Ok(Self { path, file, entries, unflushed: 0 })
    }

    pub fn write_seq(&self) -> u64 {
        self.entries.last().map(|e| e.seq).unwrap_or(0)
    }

    pub fn needs_flush(&self) -> bool {
        self.unflushed >= NEEDS_FLUSH_THRESHOLD
    }

    pub fn append(&mut self, record: &Record) -> StorageResult<u64> {
        let seq = self.write_seq() + 1;
        self.entries.push(WalEntry { seq, record: record.clone() });
        self.unflushed += 1;
        Ok(seq)
    }

    pub fn flush(&mut self) -> StorageResult<()> {
        if self.unflushed == 0 {
            return Ok(());
        }
        let start = self.entries.len() - self.unflushed;
        for entry in &self.entries[start..] {
            writeln!(self.file, "{}", serde_json::to_string(entry)?)?;
        }
        self.file.sync_all()?;
        self.unflushed = 0;
        Ok(())
    }

    pub fn entries_after(&self, seq: u64) -> Vec<&WalEntry> {
        self.entries.iter().filter(|e| e.seq > seq).collect()
    }

    pub fn all_entries(&self) -> &[WalEntry] {
        &self.entries
    }

    /// Drops every entry with `seq` below `threshold` and rewrites the log,
    /// matching the original WAL's compaction-after-snapshot behavior.
    pub fn truncate_before(&mut self, threshold: u64) -> StorageResult<()> {
        self.entries.retain(|e| e.seq >= threshold);
        self.rewrite()
    }

    fn rewrite(&mut self) -> StorageResult<()> {
        let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        for entry in &self.entries {
            writeln!(file, "{}", serde_json::to_string(entry)?)?;
        }
        file.sync_all()?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.unflushed = 0;
        Ok(())
    }
}

fn rotate_backup(path: &Path) -> StorageResult<()> {
    let bak3 = path.with_extension("bak.3");
    let bak2 = path.with_extension("bak.2");
    let bak1 = path.with_extension("bak");
    let _ = std::fs::remove_file(&bak3);
    if bak2.exists() {
        std::fs::rename(&bak2, &bak3)?;
    }
    if bak1.exists() {
        std::fs::rename(&bak1, &bak2)?;
    }
    std::fs::copy(path, &bak1)?;
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
