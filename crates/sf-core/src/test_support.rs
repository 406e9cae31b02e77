//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::ids::RunId;
use crate::severity::Severity;
use crate::target::{ScanTarget, TargetType};
use crate::workflow::{RunContext, WorkflowType};
use std::collections::HashMap;

/// Proptest strategies for core domain types.
pub mod strategies {
    use crate::severity::Severity;
    use proptest::prelude::*;

    pub fn arb_score() -> impl Strategy<Value = f64> {
        0.0f64..=10.0
    }

    pub fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Info),
            Just(Severity::Low),
            Just(Severity::Medium),
            Just(Severity::High),
            Just(Severity::Critical),
        ]
    }
}

pub fn sample_target(path: &str) -> ScanTarget {
    ScanTarget::new(TargetType::SourceRepo, path)
}

pub fn sample_context(workflow_type: WorkflowType, tool_ids: &[&str]) -> RunContext {
    RunContext {
        workflow_type,
        target: sample_target("/repo"),
        tool_ids: tool_ids.iter().map(|s| s.to_string()).collect(),
        tool_options: HashMap::new(),
        created_by: Some("test-harness".into()),
        tags: vec![],
    }
}

pub fn fresh_run_id() -> RunId {
    RunId::new()
}

pub fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Info => 0,
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 3,
        Severity::Critical => 4,
    }
}
