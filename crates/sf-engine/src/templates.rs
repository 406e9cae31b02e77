//! Built-in workflow templates. Node sequences and required/optional tool
//! ids are grounded on
//! `original_source/safeflow/orchestration/templates.py`, generalized away
//! from specific scanner product names.

use sf_core::{NodeKind, WorkflowTemplate, WorkflowType};
use std::collections::HashMap;

fn template(
    id: &str,
    name: &str,
    workflow_type: WorkflowType,
    description: &str,
    required_tools: &[&str],
    optional_tools: &[&str],
    node_sequence: &[NodeKind],
) -> WorkflowTemplate {
    WorkflowTemplate {
        template_id: id.to_string(),
        template_name: name.to_string(),
        workflow_type,
        description: description.to_string(),
        required_tools: required_tools.iter().map(|s| s.to_string()).collect(),
        optional_tools: optional_tools.iter().map(|s| s.to_string()).collect(),
        node_sequence: node_sequence.to_vec(),
        default_config: HashMap::new(),
    }
}

pub fn code_commit() -> WorkflowTemplate {
    template(
        "code_commit",
        "Code Commit Scan",
        WorkflowType::CodeCommit,
        "Fast static analysis on a single commit or diff",
        &["sast-default"],
        &[],
        &[NodeKind::Initialize, NodeKind::Scan, NodeKind::Collect, NodeKind::Finalize],
    )
}

pub fn dependency_update() -> WorkflowTemplate {
    template(
        "dependency_update",
        "Dependency Update Scan",
        WorkflowType::DependencyUpdate,
        "Software composition analysis triggered by a manifest change",
        &["sca-default"],
        &["sca-secondary"],
        &[NodeKind::Initialize, NodeKind::Scan, NodeKind::Validate, NodeKind::Finalize],
    )
}

pub fn emergency_vuln() -> WorkflowTemplate {
    template(
        "emergency_vuln",
        "Emergency Vulnerability Scan",
        WorkflowType::EmergencyVuln,
        "Wide, parallel scan across SAST and SCA tooling for an urgent advisory",
        &["sast-default", "sca-default"],
        &[],
        &[NodeKind::Initialize, NodeKind::ParallelScan, NodeKind::Collect, NodeKind::Validate, NodeKind::Finalize],
    )
}

pub fn release_regression() -> WorkflowTemplate {
    template(
        "release_regression",
        "Release Regression Scan",
        WorkflowType::ReleaseRegression,
        "Full pre-release scan ending in a human sign-off gate",
        &["sast-default", "sca-default"],
        &[],
        &[
            NodeKind::Initialize,
            NodeKind::ParallelScan,
            NodeKind::Collect,
            NodeKind::Validate,
            NodeKind::HumanReview,
            NodeKind::Finalize,
        ],
    )
}

pub fn custom(required_tools: Vec<String>, node_sequence: Vec<NodeKind>) -> WorkflowTemplate {
    WorkflowTemplate {
        template_id: "custom".to_string(),
        template_name: "Custom".to_string(),
        workflow_type: WorkflowType::Custom,
        description: "User-defined node sequence".to_string(),
        required_tools,
        optional_tools: Vec::new(),
        node_sequence,
        default_config: HashMap::new(),
    }
}

/// In-memory registry of the built-in templates, looked up by id or type.
pub struct TemplateRegistry {
    templates: HashMap<String, WorkflowTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut templates = HashMap::new();
        for t in [code_commit(), dependency_update(), emergency_vuln(), release_regression()] {
            templates.insert(t.template_id.clone(), t);
        }
        Self { templates }
    }
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, template_id: &str) -> Option<&WorkflowTemplate> {
        self.templates.get(template_id)
    }

    pub fn get_by_type(&self, workflow_type: WorkflowType) -> Option<&WorkflowTemplate> {
        self.templates.values().find(|t| t.workflow_type == workflow_type)
    }

    pub fn list(&self) -> Vec<&WorkflowTemplate> {
        let mut templates: Vec<_> = self.templates.values().collect();
        templates.sort_by(|a, b| a.template_id.cmp(&b.template_id));
        templates
    }

    pub fn register_custom(&mut self, id: impl Into<String>, template: WorkflowTemplate) {
        self.templates.insert(id.into(), template);
    }
}
