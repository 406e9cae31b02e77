//! Scan target description.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    SourceRepo,
    Binary,
    Container,
    RunningApp,
    DependencyManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanTarget {
    pub target_type: TargetType,
    pub path: String,
    pub language: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl ScanTarget {
    pub fn new(target_type: TargetType, path: impl Into<String>) -> Self {
        Self {
            target_type,
            path: path.into(),
            language: None,
            metadata: HashMap::new(),
        }
    }

    crate::setters! {
        option { language: String }
    }

    /// True when the path is non-empty, the one structural requirement every
    /// workflow template's `validate_input` enforces.
    pub fn has_path(&self) -> bool {
        !self.path.trim().is_empty()
    }
}
