//! Deterministic fake adapter for tests, gated behind
//! `#[cfg(any(test, feature = "test-support"))]`.

use crate::contract::{AdapterRequest, RawOutput, ToolAdapter};
use async_trait::async_trait;
use sf_core::{
    Capabilities, CoreError, CoreResult, ExecutionConfig, Finding, InputRequirements, Metadata,
    OutputFormat, ResourceRequirements, Severity, ToolCapability, ToolType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Configurable stand-in for a real tool adapter. Each call to `run`/`execute`
/// returns a fixed outcome and, optionally, sleeps first — used to exercise
/// scheduler timeout/retry behavior deterministically.
pub struct StubAdapter {
    capability: ToolCapability,
    outcome: StubOutcome,
    delay: Duration,
    call_count: AtomicUsize,
}

enum StubOutcome {
    Findings(Vec<Finding>),
    Fail(String),
    FailNTimesThenSucceed(usize, Vec<Finding>),
}

impl StubAdapter {
    fn base_capability(tool_id: &str) -> ToolCapability {
        ToolCapability {
            tool_id: tool_id.to_string(),
            tool_name: format!("stub:{tool_id}"),
            tool_type: ToolType::Sast,
            capabilities: Capabilities {
                supported_languages: vec!["Rust".into()],
                detection_types: vec!["generic".into()],
                cwe_coverage: vec![],
            },
            input_requirements: InputRequirements { requires_source_code: true, ..Default::default() },
            output_format: OutputFormat::default(),
            execution_config: ExecutionConfig {
                command_template: String::new(),
                timeout_seconds: 60,
                resource_requirements: ResourceRequirements::default(),
                findings_exit_codes: vec![],
            },
            metadata: Metadata::default(),
        }
    }

    pub fn success(tool_id: &str) -> Self {
        Self {
            capability: Self::base_capability(tool_id),
            outcome: StubOutcome::Findings(Vec::new()),
            delay: Duration::ZERO,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_findings(tool_id: &str, count: usize) -> Self {
        let findings = (0..count)
            .map(|i| Finding {
                finding_id: Finding::derive_id("stub-run", tool_id, i),
                tool_id: tool_id.to_string(),
                rule_id: Some("RULE-001".into()),
                title: format!("finding {i}"),
                description: "stub finding".into(),
                severity: Severity::Medium,
                score: Severity::Medium.default_score(),
                confidence: Severity::Medium.default_confidence(),
                cwe_id: None,
                file_path: None,
                line_number: None,
                raw_payload: serde_json::Value::Null,
                metadata: Default::default(),
            })
            .collect();
        Self {
            capability: Self::base_capability(tool_id),
            outcome: StubOutcome::Findings(findings),
            delay: Duration::ZERO,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Like [`Self::with_findings`] but with caller-supplied findings, for
    /// tests that need to control severity rather than accept the default
    /// all-`MEDIUM` set.
    pub fn with_custom_findings(tool_id: &str, findings: Vec<Finding>) -> Self {
        Self {
            capability: Self::base_capability(tool_id),
            outcome: StubOutcome::Findings(findings),
            delay: Duration::ZERO,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn failure(tool_id: &str, message: &str) -> Self {
        Self {
            capability: Self::base_capability(tool_id),
            outcome: StubOutcome::Fail(message.to_string()),
            delay: Duration::ZERO,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Fails the first `n` calls, then succeeds — for exercising retry logic.
    pub fn flaky(tool_id: &str, fail_times: usize) -> Self {
        Self {
            capability: Self::base_capability(tool_id),
            outcome: StubOutcome::FailNTimesThenSucceed(fail_times, Vec::new()),
            delay: Duration::ZERO,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolAdapter for StubAdapter {
    fn capability(&self) -> &ToolCapability {
        &self.capability
    }

    async fn validate_input(&self, request: &AdapterRequest) -> CoreResult<()> {
        crate::contract::validate_target_path(request)
    }

    async fn execute(&self, _request: &AdapterRequest) -> CoreResult<RawOutput> {
        let attempt = self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            StubOutcome::Findings(_) => Ok(RawOutput { stdout: String::new(), stderr: String::new(), exit_code: 0 }),
            StubOutcome::Fail(msg) => Err(CoreError::ExecutionError(msg.clone())),
            StubOutcome::FailNTimesThenSucceed(n, _) => {
                if attempt < *n {
                    Err(CoreError::ExecutionError(format!("flaky failure on attempt {attempt}")))
                } else {
                    Ok(RawOutput { stdout: String::new(), stderr: String::new(), exit_code: 0 })
                }
            }
        }
    }

    fn parse_output(&self, _raw: &RawOutput, _request: &AdapterRequest) -> CoreResult<Vec<Finding>> {
        match &self.outcome {
            StubOutcome::Findings(findings) => Ok(findings.clone()),
            StubOutcome::FailNTimesThenSucceed(_, findings) => Ok(findings.clone()),
            StubOutcome::Fail(msg) => Err(CoreError::ParseError(msg.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request() -> AdapterRequest {
        AdapterRequest {
            run_id: "stub-run".into(),
            target: sf_core::ScanTarget::new(sf_core::TargetType::SourceRepo, "/repo"),
            options: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn success_adapter_reports_success() {
        let adapter = StubAdapter::with_findings("sast-default", 2);
        let result = adapter.run(&request()).await;
        assert!(result.success);
        assert_eq!(result.findings.len(), 2);
    }

    #[tokio::test]
    async fn failure_adapter_reports_failure_without_panicking() {
        let adapter = StubAdapter::failure("sast-default", "boom");
        let result = adapter.run(&request()).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn flaky_adapter_succeeds_after_configured_failures() {
        let adapter = StubAdapter::flaky("sast-default", 2);
        assert!(!adapter.run(&request()).await.success);
        assert!(!adapter.run(&request()).await.success);
        assert!(adapter.run(&request()).await.success);
    }
}
