//! Normalized security finding record.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `CWE-\d+` extractor, generalized from the per-adapter regex the original
/// implementation used to pull a CWE id out of free-text rule descriptions.
pub fn extract_cwe_id(text: &str) -> Option<String> {
    let idx = text.find("CWE-")?;
    let rest = &text[idx + 4..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("CWE-{digits}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub finding_id: String,
    pub tool_id: String,
    pub rule_id: Option<String>,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub score: f64,
    pub confidence: u8,
    pub cwe_id: Option<String>,
    pub file_path: Option<String>,
    pub line_number: Option<u32>,
    /// The originating record an adapter's `parse` produced this finding
    /// from, opaque to everything but the adapter that wrote it. Required by
    /// the parse contract so a finding's provenance is never lost even when
    /// the normalized fields above are a lossy projection of the tool's
    /// native output.
    #[serde(default)]
    pub raw_payload: serde_json::Value,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Finding {
    /// Deterministic id, matching the original implementation's
    /// `vuln_{scan_session_id}_{tool_id}_{index}` scheme so findings from the
    /// same run/tool/position are stably identifiable across replays.
    pub fn derive_id(run_id: &str, tool_id: &str, index: usize) -> String {
        format!("vuln_{run_id}_{tool_id}_{index}")
    }
}
