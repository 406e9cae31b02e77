//! Loads the tool fleet from a TOML file of [`ToolCapability`] records and
//! registers one [`CliAdapter`] per entry against a [`ToolRegistry`].
//!
//! `ToolCapability` already derives `Deserialize`, so the file format is just
//! `[[tools]]` tables matching its field names — no separate config schema
//! to keep in sync.

use sf_adapters::{CliAdapter, ToolRegistry};
use sf_core::ToolCapability;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, serde::Deserialize)]
struct ToolConfigFile {
    #[serde(default)]
    tools: Vec<ToolCapability>,
}

/// Reads `path`, parses it as a `ToolConfigFile`, and registers one
/// `CliAdapter` per declared tool. Returns the number of tools registered.
pub fn load_into(registry: &ToolRegistry, path: &Path) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading tool config {}: {e}", path.display()))?;
    let file: ToolConfigFile = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("parsing tool config {}: {e}", path.display()))?;
    let count = file.tools.len();
    for capability in file.tools {
        registry.register(Arc::new(CliAdapter::new(capability)));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_into_registers_every_declared_tool() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[tools]]
            tool_id = "sast-one"
            tool_name = "Sast One"
            tool_type = "SAST"
            [tools.execution_config]
            command_template = "scan-one {{path}}"

            [[tools]]
            tool_id = "sca-one"
            tool_name = "Sca One"
            tool_type = "SCA"
            [tools.execution_config]
            command_template = "scan-two {{path}}"
            "#
        )
        .unwrap();

        let registry = ToolRegistry::new();
        let count = load_into(&registry, file.path()).unwrap();
        assert_eq!(count, 2);
        assert!(registry.get_adapter("sast-one").is_some());
        assert!(registry.get_adapter("sca-one").is_some());
    }

    #[test]
    fn load_into_rejects_a_missing_file() {
        let registry = ToolRegistry::new();
        assert!(load_into(&registry, Path::new("/nonexistent/tools.toml")).is_err());
    }
}
