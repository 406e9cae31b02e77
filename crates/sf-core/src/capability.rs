//! Tool capability self-description, as returned by `ToolAdapter::capability()`.
//!
//! Field set is grounded on `schemas/tool_capability.py` from the original
//! implementation: `ToolType`, `Capabilities`, `InputRequirements`,
//! `OutputFormat`, `ResourceRequirements`, `ExecutionConfig`, `Metadata`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolType {
    Sast,
    Dast,
    Iast,
    Sca,
    Fuzzing,
    Secrets,
    Container,
}

crate::simple_display! {
    ToolType {
        Sast => "SAST",
        Dast => "DAST",
        Iast => "IAST",
        Sca => "SCA",
        Fuzzing => "FUZZING",
        Secrets => "SECRETS",
        Container => "CONTAINER",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub supported_languages: Vec<String>,
    pub detection_types: Vec<String>,
    pub cwe_coverage: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputRequirements {
    pub requires_source_code: bool,
    pub requires_binary: bool,
    pub requires_running_app: bool,
    pub requires_dependencies_manifest: bool,
    pub supported_vcs: Vec<String>,
    #[serde(default)]
    pub additional_config: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputFormat {
    pub native_format: String,
    pub supports_streaming: bool,
    pub result_fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub min_memory_mb: u32,
    pub min_cpu_cores: u32,
}

impl Default for ResourceRequirements {
    fn default() -> Self {
        Self { min_memory_mb: 512, min_cpu_cores: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub command_template: String,
    #[serde(default = "ExecutionConfig::default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub resource_requirements: ResourceRequirements,
    /// Process exit codes that mean "ran successfully and reported findings",
    /// not failure. Generalizes the original implementation's hardcoded
    /// per-tool special case (e.g. a composition scanner returning 1 to mean
    /// "vulnerabilities found").
    #[serde(default)]
    pub findings_exit_codes: Vec<i32>,
}

impl ExecutionConfig {
    fn default_timeout() -> u64 {
        600
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub license: Option<String>,
    pub documentation_url: Option<String>,
    pub adapter_version: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCapability {
    pub tool_id: String,
    pub tool_name: String,
    pub tool_type: ToolType,
    pub capabilities: Capabilities,
    pub input_requirements: InputRequirements,
    pub output_format: OutputFormat,
    pub execution_config: ExecutionConfig,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ToolCapability {
    /// True if this capability can act on `findings_exit_codes`-style exit
    /// status, i.e. treat it as success rather than failure.
    pub fn exit_code_means_findings(&self, code: i32) -> bool {
        code == 0 || self.execution_config.findings_exit_codes.contains(&code)
    }

    pub fn supports_language(&self, language: &str) -> bool {
        self.capabilities
            .supported_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }
}
