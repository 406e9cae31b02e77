use super::*;
use sf_core::{RunContext, RunId, ScanTarget, TargetType, WorkflowType};
use std::collections::HashMap;
use std::io::Write as _;
use tempfile::tempdir;

fn sample_record(run_id: RunId) -> Record {
    let context = RunContext {
        workflow_type: WorkflowType::CodeCommit,
        target: ScanTarget::new(TargetType::SourceRepo, "/repo"),
        tool_ids: vec!["sast-default".into()],
        tool_options: HashMap::new(),
        created_by: None,
        tags: vec![],
    };
    Record::RunUpserted { state: WorkflowState::new(run_id, context, chrono::Utc::now()) }
}

#[test]
fn open_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let wal = Wal::open(&path).unwrap();
    assert!(path.exists());
    assert_eq!(wal.write_seq(), 0);
}

#[test]
fn append_and_flush_persists_to_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path).unwrap();

    let seq1 = wal.append(&sample_record(RunId::new())).unwrap();
    let seq2 = wal.append(&sample_record(RunId::new())).unwrap();
    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);

    wal.flush().unwrap();
    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn entries_after_returns_only_newer_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path).unwrap();
    wal.append(&sample_record(RunId::new())).unwrap();
    wal.append(&sample_record(RunId::new())).unwrap();
    wal.append(&sample_record(RunId::new())).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(1);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 2);
    assert_eq!(entries[1].seq, 3);
}

#[test]
fn reopen_replays_every_flushed_entry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&sample_record(RunId::new())).unwrap();
        wal.append(&sample_record(RunId::new())).unwrap();
        wal.flush().unwrap();
    }

    let wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 2);
    assert_eq!(wal.all_entries().len(), 2);
}

#[test]
fn truncate_before_drops_earlier_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path).unwrap();
    wal.append(&sample_record(RunId::new())).unwrap();
    wal.append(&sample_record(RunId::new())).unwrap();
    wal.append(&sample_record(RunId::new())).unwrap();
    wal.flush().unwrap();

    wal.truncate_before(2).unwrap();
    let entries = wal.entries_after(0);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 2);
    assert_eq!(entries[1].seq, 3);
}

#[test]
fn needs_flush_reflects_unflushed_threshold() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path).unwrap();
    assert!(!wal.needs_flush());
    for _ in 0..101 {
        wal.append(&sample_record(RunId::new())).unwrap();
    }
    assert!(wal.needs_flush());
}

#[test]
fn open_with_corrupt_tail_rotates_backup_and_preserves_valid_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&sample_record(RunId::new())).unwrap();
        wal.append(&sample_record(RunId::new())).unwrap();
        wal.flush().unwrap();
    }
    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"not-valid-json\n").unwrap();
    }

    let wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 2);

    let bak = path.with_extension("bak");
    assert!(bak.exists());
}

#[test]
fn open_with_binary_data_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    std::fs::write(&path, b"\x80\x81\x82\xff\xfe\n").unwrap();

    let wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 0);
    assert!(path.with_extension("bak").exists());
}
