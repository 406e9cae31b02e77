//! General-purpose adapter that runs a configured command line and parses
//! newline-delimited JSON findings from stdout. Demonstrates the validate →
//! execute → parse contract and the findings-exit-code convention without
//! naming any particular scanner product.

use crate::contract::{validate_target_path, AdapterRequest, RawOutput, ToolAdapter};
use async_trait::async_trait;
use sf_core::{extract_cwe_id, CoreError, CoreResult, Finding, Severity, ToolCapability};
use std::time::Duration;
use tokio::process::Command;

/// One line of the adapter's expected NDJSON output.
#[derive(Debug, serde::Deserialize)]
struct RawFinding {
    rule_id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    severity: String,
    file_path: Option<String>,
    line_number: Option<u32>,
}

pub struct CliAdapter {
    capability: ToolCapability,
}

impl CliAdapter {
    pub fn new(capability: ToolCapability) -> Self {
        Self { capability }
    }

    fn render_command(&self, request: &AdapterRequest) -> Command {
        let rendered = self
            .capability
            .execution_config
            .command_template
            .replace("{path}", &request.target.path);
        let mut parts = rendered.split_whitespace();
        let program = parts.next().unwrap_or_default();
        let mut command = Command::new(program);
        command.args(parts);
        command
    }
}

#[async_trait]
impl ToolAdapter for CliAdapter {
    fn capability(&self) -> &ToolCapability {
        &self.capability
    }

    async fn validate_input(&self, request: &AdapterRequest) -> CoreResult<()> {
        validate_target_path(request)?;
        if self.capability.execution_config.command_template.is_empty() {
            return Err(CoreError::InputError("adapter has no command template configured".into()));
        }
        Ok(())
    }

    async fn execute(&self, request: &AdapterRequest) -> CoreResult<RawOutput> {
        let command = self.render_command(request);
        let timeout = Duration::from_secs(self.capability.execution_config.timeout_seconds);
        let (exit_code, stdout, stderr) = crate::subprocess::run_with_timeout(command, timeout).await?;
        if !self.capability.exit_code_means_findings(exit_code) {
            return Err(CoreError::ExecutionError(format!(
                "{} exited with unexpected status {}: {}",
                self.tool_id(),
                exit_code,
                stderr
            )));
        }
        Ok(RawOutput { stdout, stderr, exit_code })
    }

    fn parse_output(&self, raw: &RawOutput, request: &AdapterRequest) -> CoreResult<Vec<Finding>> {
        let mut findings = Vec::new();
        for (index, line) in raw.stdout.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let raw_payload: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| CoreError::ParseError(format!("line {index}: {e}")))?;
            let parsed: RawFinding = serde_json::from_value(raw_payload.clone())
                .map_err(|e| CoreError::ParseError(format!("line {index}: {e}")))?;
            let severity = Severity::from_label(&parsed.severity);
            let cwe_id = extract_cwe_id(&parsed.description).or_else(|| extract_cwe_id(&parsed.title));
            findings.push(Finding {
                finding_id: Finding::derive_id(&request.run_id, self.tool_id(), index),
                tool_id: self.tool_id().to_string(),
                rule_id: parsed.rule_id,
                title: parsed.title,
                description: parsed.description,
                severity,
                score: severity.default_score(),
                confidence: severity.default_confidence(),
                cwe_id,
                file_path: parsed.file_path,
                line_number: parsed.line_number,
                raw_payload,
                metadata: Default::default(),
            });
        }
        Ok(findings)
    }
}
