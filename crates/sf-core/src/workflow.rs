//! Workflow run state machine: statuses, node kinds, and the mutable
//! [`WorkflowState`] a graph executor threads through a template's node
//! sequence. Grounded on
//! `original_source/safeflow/orchestration/models.py`.

use crate::finding::Finding;
use crate::ids::RunId;
use crate::target::ScanTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    CodeCommit,
    DependencyUpdate,
    EmergencyVuln,
    ReleaseRegression,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Initialize,
    Scan,
    ParallelScan,
    Collect,
    Validate,
    HumanReview,
    Retry,
    Finalize,
}

/// Run- and node-level execution status. A single enum covers both, matching
/// the original implementation's `TaskStatus`, which workflow runs and
/// individual node results both use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failed,
    Retry,
    Paused,
    Cancelled,
    Skipped,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Cancelled | Self::Skipped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub tool_id: String,
    pub tool_name: String,
    pub success: bool,
    #[serde(default)]
    pub findings: Vec<Finding>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub node_name: String,
    pub node_type: NodeKind,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub vulnerabilities_found: u32,
    pub error: Option<String>,
    #[serde(default)]
    pub tool_results: Vec<ToolExecutionResult>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NodeResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running)
    }
}

/// Immutable request parameters used to create a new run, analogous to the
/// original implementation's `WorkflowContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub workflow_type: WorkflowType,
    pub target: ScanTarget,
    pub tool_ids: Vec<String>,
    #[serde(default)]
    pub tool_options: HashMap<String, serde_json::Value>,
    pub created_by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub run_id: RunId,
    pub workflow_type: WorkflowType,
    pub status: RunStatus,
    pub current_node: Option<String>,
    pub target: ScanTarget,
    pub tool_ids: Vec<String>,
    #[serde(default)]
    pub tool_options: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub node_results: Vec<NodeResult>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub total_vulnerabilities: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub created_by: Option<String>,
    pub requires_human_review: bool,
    pub human_review_data: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WorkflowState {
    pub fn new(run_id: RunId, context: RunContext, now: DateTime<Utc>) -> Self {
        Self {
            run_id,
            workflow_type: context.workflow_type,
            status: RunStatus::Pending,
            current_node: None,
            target: context.target,
            tool_ids: context.tool_ids,
            tool_options: context.tool_options,
            node_results: Vec::new(),
            errors: Vec::new(),
            total_vulnerabilities: 0,
            created_at: now,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            created_by: context.created_by,
            requires_human_review: false,
            human_review_data: None,
            tags: context.tags,
        }
    }

    pub fn add_node_result(&mut self, result: NodeResult) {
        self.total_vulnerabilities += result.vulnerabilities_found;
        self.current_node = Some(result.node_name.clone());
        self.node_results.push(result);
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.status, RunStatus::Paused)
    }

    pub fn total_vulnerabilities(&self) -> u32 {
        self.total_vulnerabilities
    }

    /// Progress as a fraction of nodes completed against the template's full
    /// node sequence. Must be monotonically non-decreasing across the life
    /// of a run and exactly 1.0 on success — see DESIGN.md's resolution of
    /// the progress-formula open question.
    pub fn progress(&self, total_nodes_in_template: usize) -> f64 {
        if total_nodes_in_template == 0 {
            return 0.0;
        }
        if matches!(self.status, RunStatus::Success) {
            return 1.0;
        }
        let completed = self
            .node_results
            .iter()
            .filter(|r| r.is_success())
            .count()
            .min(total_nodes_in_template);
        completed as f64 / total_nodes_in_template as f64
    }

    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            run_id: self.run_id,
            status: self.status,
            total_vulnerabilities: self.total_vulnerabilities,
            node_count: self.node_results.len(),
            error_count: self.errors.len(),
            requires_human_review: self.requires_human_review,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub run_id: RunId,
    pub status: RunStatus,
    pub total_vulnerabilities: u32,
    pub node_count: usize,
    pub error_count: usize,
    pub requires_human_review: bool,
}

/// Wall-clock duration since `started_at`, or zero if the run hasn't started.
pub fn elapsed_since(since: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    match since {
        Some(t) if now >= t => (now - t).to_std().unwrap_or_default(),
        _ => Duration::ZERO,
    }
}
