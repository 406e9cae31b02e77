//! Tool adapter contract: validate → execute → parse, wrapped by a single
//! `run()` template method. Grounded on
//! `original_source/safeflow/adapters/base.py`'s `BaseAdapter`.

use async_trait::async_trait;
use chrono::Utc;
use sf_core::{CoreError, CoreResult, Finding, ScanTarget, ToolCapability, ToolExecutionResult};
use std::collections::HashMap;
use std::time::Instant;

/// Everything an adapter needs to run one scan of one target with one tool.
#[derive(Debug, Clone)]
pub struct AdapterRequest {
    pub run_id: String,
    pub target: ScanTarget,
    pub options: HashMap<String, serde_json::Value>,
}

/// Unparsed result of executing a tool, before `parse_output` normalizes it.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Shell metacharacters rejected from any adapter input that ends up on a
/// command line, per the specification's input-validation rule.
pub const FORBIDDEN_SHELL_CHARS: &[char] = &['<', '>', '|', '&', ';', '$', '`'];

pub fn contains_forbidden_shell_chars(s: &str) -> bool {
    s.chars().any(|c| FORBIDDEN_SHELL_CHARS.contains(&c))
}

#[async_trait]
pub trait ToolAdapter: Send + Sync {
    fn capability(&self) -> &ToolCapability;

    fn tool_id(&self) -> &str {
        &self.capability().tool_id
    }

    fn tool_name(&self) -> &str {
        &self.capability().tool_name
    }

    async fn validate_input(&self, request: &AdapterRequest) -> CoreResult<()>;

    async fn execute(&self, request: &AdapterRequest) -> CoreResult<RawOutput>;

    fn parse_output(&self, raw: &RawOutput, request: &AdapterRequest) -> CoreResult<Vec<Finding>>;

    /// Runs validate → execute → parse, converting any stage's failure into
    /// a `ToolExecutionResult` with `success = false` rather than
    /// propagating — a single adapter's failure must not abort a scan that
    /// spans multiple tools.
    async fn run(&self, request: &AdapterRequest) -> ToolExecutionResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let tool_id = self.tool_id().to_string();
        let tool_name = self.tool_name().to_string();

        let outcome = self.run_inner(request).await;

        let completed_at = Utc::now();
        let duration_ms = Some(start.elapsed().as_millis() as u64);

        match outcome {
            Ok(findings) => {
                tracing::info!(tool_id = %tool_id, findings = findings.len(), elapsed_ms = start.elapsed().as_millis(), "adapter run succeeded");
                ToolExecutionResult {
                    tool_id,
                    tool_name,
                    success: true,
                    findings,
                    error: None,
                    started_at,
                    completed_at: Some(completed_at),
                    duration_ms,
                    metadata: HashMap::new(),
                }
            }
            Err(err) => {
                tracing::warn!(tool_id = %tool_id, error = %err, elapsed_ms = start.elapsed().as_millis(), "adapter run failed");
                ToolExecutionResult {
                    tool_id,
                    tool_name,
                    success: false,
                    findings: Vec::new(),
                    error: Some(err.to_string()),
                    started_at,
                    completed_at: Some(completed_at),
                    duration_ms,
                    metadata: HashMap::new(),
                }
            }
        }
    }

    async fn run_inner(&self, request: &AdapterRequest) -> CoreResult<Vec<Finding>> {
        self.validate_input(request).await?;
        let raw = self.execute(request).await?;
        self.parse_output(&raw, request)
    }
}

pub fn validate_target_path(request: &AdapterRequest) -> CoreResult<()> {
    if !request.target.has_path() {
        return Err(CoreError::InputError("target path must not be empty".into()));
    }
    if contains_forbidden_shell_chars(&request.target.path) {
        return Err(CoreError::InputError(format!(
            "target path contains forbidden shell metacharacters: {}",
            request.target.path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_forbidden_char() {
        for c in FORBIDDEN_SHELL_CHARS {
            assert!(contains_forbidden_shell_chars(&format!("foo{c}bar")));
        }
    }

    #[test]
    fn plain_path_is_clean() {
        assert!(!contains_forbidden_shell_chars("/home/user/project"));
    }
}
