//! Checkpoint records persisted at node boundaries.

use crate::ids::{CheckpointId, RunId};
use crate::workflow::{NodeKind, WorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub checkpoint_id: CheckpointId,
    pub run_id: RunId,
    pub node_name: String,
    pub node_type: NodeKind,
    pub state_snapshot: WorkflowState,
    pub compressed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Byte length of the encoded `state_snapshot`, matching the original
    /// implementation's `len(json.encode('utf-8'))` accounting.
    pub state_size: usize,
}

impl CheckpointRecord {
    pub fn new(run_id: RunId, node_name: impl Into<String>, node_type: NodeKind, state_snapshot: WorkflowState, now: DateTime<Utc>) -> Self {
        let encoded = serde_json::to_vec(&state_snapshot).unwrap_or_default();
        Self {
            checkpoint_id: CheckpointId::new(),
            run_id,
            node_name: node_name.into(),
            node_type,
            state_snapshot,
            compressed: false,
            created_at: now,
            metadata: HashMap::new(),
            state_size: encoded.len(),
        }
    }
}
