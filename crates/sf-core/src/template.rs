//! Workflow template descriptor: the data shape a template registry hands
//! back. Template *behavior* (building the node sequence, per-template
//! validation) lives in `sf-engine`; this crate only defines the shape.

use crate::workflow::{NodeKind, WorkflowType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub template_id: String,
    pub template_name: String,
    pub workflow_type: WorkflowType,
    pub description: String,
    pub required_tools: Vec<String>,
    pub optional_tools: Vec<String>,
    pub node_sequence: Vec<NodeKind>,
    #[serde(default)]
    pub default_config: HashMap<String, serde_json::Value>,
}

impl WorkflowTemplate {
    pub fn total_nodes(&self) -> usize {
        self.node_sequence.len()
    }

    /// A target/tool-id combination is acceptable to this template only if
    /// every required tool id is present and the target has a non-empty
    /// path, matching `WorkflowTemplateBase.validate_input` in the original
    /// implementation.
    pub fn validate_tool_ids(&self, tool_ids: &[String]) -> Result<(), String> {
        let missing: Vec<&str> = self
            .required_tools
            .iter()
            .filter(|t| !tool_ids.iter().any(|id| id == *t))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required tools: {}", missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> WorkflowTemplate {
        WorkflowTemplate {
            template_id: "code_commit".into(),
            template_name: "Code Commit".into(),
            workflow_type: WorkflowType::CodeCommit,
            description: "desc".into(),
            required_tools: vec!["sast-default".into()],
            optional_tools: vec![],
            node_sequence: vec![NodeKind::Initialize, NodeKind::Scan, NodeKind::Collect, NodeKind::Finalize],
            default_config: HashMap::new(),
        }
    }

    #[test]
    fn validate_tool_ids_passes_when_required_present() {
        assert!(template().validate_tool_ids(&["sast-default".to_string()]).is_ok());
    }

    #[test]
    fn validate_tool_ids_fails_when_required_missing() {
        assert!(template().validate_tool_ids(&[]).is_err());
    }

    #[test]
    fn total_nodes_counts_sequence() {
        assert_eq!(template().total_nodes(), 4);
    }
}
