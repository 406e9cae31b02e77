//! Tool registry: capability-based adapter discovery. Grounded on
//! `original_source/safeflow/services/tool_registry.py`.

use crate::contract::ToolAdapter;
use parking_lot::RwLock;
use sf_core::ToolCapability;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct RegistrySummary {
    pub tool_count: usize,
    pub type_distribution: HashMap<String, usize>,
    pub tool_ids: Vec<String>,
}

#[derive(Default)]
pub struct ToolRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn ToolAdapter>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: re-registering an id logs a warning and replaces the
    /// previous adapter, matching the original registry's `register()`.
    pub fn register(&self, adapter: Arc<dyn ToolAdapter>) {
        let tool_id = adapter.tool_id().to_string();
        let mut adapters = self.adapters.write();
        if adapters.contains_key(&tool_id) {
            tracing::warn!(tool_id = %tool_id, "replacing already-registered tool adapter");
        }
        adapters.insert(tool_id, adapter);
    }

    pub fn unregister(&self, tool_id: &str) -> bool {
        self.adapters.write().remove(tool_id).is_some()
    }

    pub fn get_adapter(&self, tool_id: &str) -> Option<Arc<dyn ToolAdapter>> {
        self.adapters.read().get(tool_id).cloned()
    }

    pub fn get_capability(&self, tool_id: &str) -> Option<ToolCapability> {
        self.adapters.read().get(tool_id).map(|a| a.capability().clone())
    }

    pub fn discover_by_type(&self, tool_type: sf_core::ToolType) -> Vec<String> {
        self.adapters
            .read()
            .values()
            .filter(|a| a.capability().tool_type == tool_type)
            .map(|a| a.tool_id().to_string())
            .collect()
    }

    pub fn discover_by_language(&self, language: &str) -> Vec<String> {
        self.adapters
            .read()
            .values()
            .filter(|a| a.capability().supports_language(language))
            .map(|a| a.tool_id().to_string())
            .collect()
    }

    pub fn discover_by_detection_type(&self, detection_type: &str) -> Vec<String> {
        self.adapters
            .read()
            .values()
            .filter(|a| {
                a.capability()
                    .capabilities
                    .detection_types
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(detection_type))
            })
            .map(|a| a.tool_id().to_string())
            .collect()
    }

    pub fn list_all(&self) -> Vec<ToolCapability> {
        self.adapters.read().values().map(|a| a.capability().clone()).collect()
    }

    pub fn get_tool_count(&self) -> usize {
        self.adapters.read().len()
    }

    pub fn get_tool_ids(&self) -> Vec<String> {
        self.adapters.read().keys().cloned().collect()
    }

    pub fn is_registered(&self, tool_id: &str) -> bool {
        self.adapters.read().contains_key(tool_id)
    }

    pub fn clear(&self) {
        self.adapters.write().clear();
    }

    pub fn get_summary(&self) -> RegistrySummary {
        let adapters = self.adapters.read();
        let mut type_distribution: HashMap<String, usize> = HashMap::new();
        for adapter in adapters.values() {
            *type_distribution.entry(adapter.capability().tool_type.to_string()).or_default() += 1;
        }
        RegistrySummary {
            tool_count: adapters.len(),
            type_distribution,
            tool_ids: adapters.keys().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubAdapter;

    #[test]
    fn register_then_lookup_round_trips() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(StubAdapter::success("sast-default")));
        assert!(registry.is_registered("sast-default"));
        assert_eq!(registry.get_tool_count(), 1);
        assert!(registry.get_adapter("sast-default").is_some());
    }

    #[test]
    fn re_registering_replaces_without_error() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(StubAdapter::success("sast-default")));
        registry.register(Arc::new(StubAdapter::failure("sast-default", "replaced")));
        assert_eq!(registry.get_tool_count(), 1);
    }

    #[test]
    fn unregister_removes_and_reports_absence() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(StubAdapter::success("sast-default")));
        assert!(registry.unregister("sast-default"));
        assert!(!registry.unregister("sast-default"));
        assert!(!registry.is_registered("sast-default"));
    }

    #[test]
    fn discover_by_language_is_case_insensitive() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(StubAdapter::success("sast-default")));
        assert_eq!(registry.discover_by_language("rust"), vec!["sast-default".to_string()]);
        assert!(registry.discover_by_language("cobol").is_empty());
    }

    #[test]
    fn summary_counts_tool_types() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(StubAdapter::success("sast-default")));
        let summary = registry.get_summary();
        assert_eq!(summary.tool_count, 1);
        assert_eq!(summary.type_distribution.get("SAST"), Some(&1));
    }
}
