//! Bridges [`Store`] into [`sf_engine::CheckpointSink`] so the graph
//! executor can persist a checkpoint after every node without depending on
//! this crate directly.

use crate::store::Store;
use async_trait::async_trait;
use sf_core::CheckpointRecord;
use sf_engine::CheckpointSink;

#[async_trait]
impl CheckpointSink for Store {
    async fn save_checkpoint(&self, record: CheckpointRecord) {
        if let Err(err) = Store::save_checkpoint(self, record) {
            tracing::error!(error = %err, "failed to persist checkpoint");
        }
    }
}
