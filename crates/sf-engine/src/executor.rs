//! Graph executor: walks a [`WorkflowTemplate`]'s node sequence against a
//! [`WorkflowState`], dispatching scan nodes through the [`ToolService`] and
//! deciding the human-review gate. Grounded on
//! `original_source/safeflow/orchestration/engine.py`'s `_execute_simple_mode`
//! node-walking loop; the individual node bodies (`nodes.py`) were not part
//! of the retrieved source, so each node's behavior below is built from the
//! specification's description of what that node does.

use crate::tool_service::ToolService;
use async_trait::async_trait;
use chrono::Utc;
use sf_adapters::AdapterRequest;
use sf_core::{CheckpointRecord, Clock, Finding, NodeKind, NodeResult, RunStatus, WorkflowConfig, WorkflowState, WorkflowTemplate};
use std::collections::HashMap;
use std::sync::Arc;

/// A finding's `confidence` (0-100) clears the validate node's
/// `confidence_threshold` (0.0-1.0), matching §4.7's "drops findings with
/// `confidence.score < threshold`".
fn passes_confidence_threshold(finding: &Finding, threshold: f64) -> bool {
    finding.confidence as f64 >= threshold * 100.0
}

/// Sink for checkpoint records emitted after every node. Implemented by
/// `sf-storage`; a no-op default lets the engine run without persistence
/// wired up.
#[async_trait]
pub trait CheckpointSink: Send + Sync {
    async fn save_checkpoint(&self, record: CheckpointRecord);
}

pub struct NoopCheckpointSink;

#[async_trait]
impl CheckpointSink for NoopCheckpointSink {
    async fn save_checkpoint(&self, _record: CheckpointRecord) {}
}

pub struct GraphExecutor<C: Clock> {
    tool_service: Arc<ToolService<C>>,
    config: WorkflowConfig,
}

impl<C: Clock + 'static> GraphExecutor<C> {
    pub fn new(tool_service: Arc<ToolService<C>>, config: WorkflowConfig) -> Self {
        Self { tool_service, config }
    }

    /// Runs every node in `template.node_sequence` against `state` in order,
    /// stopping early on a node failure or a human-review pause. Returns the
    /// updated state; the caller owns deciding what to do with a paused run
    /// (the specification's C9 facade resumes it later via [`Self::resume`]).
    pub async fn run(&self, template: &WorkflowTemplate, state: WorkflowState, checkpoints: &dyn CheckpointSink) -> WorkflowState {
        self.execute_nodes(template.node_sequence.clone(), state, checkpoints, true).await
    }

    /// Continues a paused run from where it left off: every node already
    /// present in `state.node_results` (including the human-review gate
    /// itself) is skipped, and `requires_human_review` is cleared since a
    /// resume is the reviewer's approval to proceed.
    pub async fn resume(&self, template: &WorkflowTemplate, state: WorkflowState, checkpoints: &dyn CheckpointSink) -> WorkflowState {
        let remaining: Vec<NodeKind> = template.node_sequence.iter().copied().skip(state.node_results.len()).collect();
        self.execute_nodes(remaining, state, checkpoints, false).await
    }

    async fn execute_nodes(&self, nodes: Vec<NodeKind>, mut state: WorkflowState, checkpoints: &dyn CheckpointSink, fresh_start: bool) -> WorkflowState {
        state.status = RunStatus::Running;
        state.requires_human_review = false;
        if fresh_start {
            state.started_at = Some(Utc::now());
        }

        for node_kind in nodes {
            let node_result = self.execute_node(node_kind, &state).await;
            let node_status = node_result.status;
            let node_name = node_result.node_name.clone();

            state.add_node_result(node_result);

            if node_kind == NodeKind::Validate {
                self.drop_low_confidence_findings(&mut state);
            }

            if node_kind == NodeKind::HumanReview {
                state.requires_human_review = true;
                state.human_review_data = Some(serde_json::json!({
                    "total_vulnerabilities": state.total_vulnerabilities,
                    "reviewed_nodes": state.node_results.len(),
                }));
            }

            checkpoints
                .save_checkpoint(CheckpointRecord::new(state.run_id, node_name, node_kind, state.clone(), Utc::now()))
                .await;

            match node_status {
                RunStatus::Failed => {
                    state.status = RunStatus::Failed;
                    break;
                }
                RunStatus::Paused => {
                    state.status = RunStatus::Paused;
                    break;
                }
                _ => {}
            }
        }

        if !state.status.is_terminal() && !state.is_paused() {
            state.status = RunStatus::Success;
        }
        state.completed_at = Some(Utc::now());
        if let Some(started) = state.started_at {
            state.duration_ms = Some(sf_core::elapsed_since(Some(started), state.completed_at.unwrap()).as_millis() as u64);
        }
        state
    }

    /// Removes findings with `confidence < confidence_threshold * 100` from
    /// every already-recorded node's tool results and recomputes the
    /// vulnerability counts those nodes carry, per §4.7's validate node.
    fn drop_low_confidence_findings(&self, state: &mut WorkflowState) {
        let threshold = self.config.validation.confidence_threshold;
        let mut total_removed = 0u32;
        for node in state.node_results.iter_mut() {
            for tool_result in node.tool_results.iter_mut() {
                let before = tool_result.findings.len();
                tool_result.findings.retain(|f| passes_confidence_threshold(f, threshold));
                total_removed += (before - tool_result.findings.len()) as u32;
            }
            node.vulnerabilities_found = node.tool_results.iter().map(|t| t.findings.len() as u32).sum();
        }
        state.total_vulnerabilities = state.total_vulnerabilities.saturating_sub(total_removed);
    }

    async fn execute_node(&self, kind: NodeKind, state: &WorkflowState) -> NodeResult {
        let started_at = Utc::now();
        let request = AdapterRequest { run_id: state.run_id.to_string(), target: state.target.clone(), options: state.tool_options.clone() };

        let (status, vulnerabilities_found, tool_results, error, metadata) = match kind {
            NodeKind::Initialize => (RunStatus::Success, 0, Vec::new(), None, HashMap::new()),

            NodeKind::Scan => match state.tool_ids.first() {
                Some(tool_id) => {
                    let result = self.tool_service.scan_with_tool(tool_id, request).await;
                    let count = result.findings.len() as u32;
                    let status = if result.success { RunStatus::Success } else { RunStatus::Failed };
                    let error = result.error.clone();
                    (status, count, vec![result], error, HashMap::new())
                }
                None => (RunStatus::Failed, 0, Vec::new(), Some("no tool configured for scan node".to_string()), HashMap::new()),
            },

            NodeKind::ParallelScan => {
                let results = self.tool_service.scan_with_multiple_tools(&state.tool_ids, request).await;
                let count = results.iter().map(|r| r.findings.len() as u32).sum();
                let any_succeeded = results.iter().any(|r| r.success);
                let status = if any_succeeded { RunStatus::Success } else { RunStatus::Failed };
                (status, count, results, None, HashMap::new())
            }

            NodeKind::Collect => (RunStatus::Success, 0, Vec::new(), None, HashMap::new()),

            NodeKind::Validate => {
                let threshold = self.config.validation.confidence_threshold;
                let findings: Vec<&Finding> = state.node_results.iter().flat_map(|r| r.tool_results.iter()).flat_map(|t| t.findings.iter()).collect();
                let kept = findings.iter().filter(|f| passes_confidence_threshold(f, threshold)).count();
                let dropped = findings.len() - kept;
                let mut metadata = HashMap::new();
                metadata.insert("kept_count".to_string(), serde_json::json!(kept));
                metadata.insert("dropped_count".to_string(), serde_json::json!(dropped));
                (RunStatus::Success, 0, Vec::new(), None, metadata)
            }

            NodeKind::HumanReview => (RunStatus::Paused, 0, Vec::new(), None, HashMap::new()),

            NodeKind::Retry => (RunStatus::Success, 0, Vec::new(), None, HashMap::new()),

            NodeKind::Finalize => (RunStatus::Success, 0, Vec::new(), None, HashMap::new()),
        };

        let completed_at = Utc::now();
        NodeResult {
            node_name: node_name_for(kind).to_string(),
            node_type: kind,
            status,
            started_at,
            completed_at: Some(completed_at),
            duration_ms: Some((completed_at - started_at).num_milliseconds().max(0) as u64),
            vulnerabilities_found,
            error,
            tool_results,
            metadata,
        }
    }
}

fn node_name_for(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Initialize => "initialize",
        NodeKind::Scan => "scan",
        NodeKind::ParallelScan => "parallel_scan",
        NodeKind::Collect => "collect",
        NodeKind::Validate => "validate",
        NodeKind::HumanReview => "human_review",
        NodeKind::Retry => "retry",
        NodeKind::Finalize => "finalize",
    }
}
