//! Persistence for workflow runs and checkpoints: an append-only JSONL log
//! on disk, replayed into an in-memory materialized view on open.

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod checkpoint_sink;
pub mod error;
pub mod store;
pub mod wal;

pub use error::{StorageError, StorageResult};
pub use store::{MaterializedState, Store};
pub use wal::{Record, Wal, WalEntry};
