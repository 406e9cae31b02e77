//! Domain types and shared infrastructure for the scanforge orchestration
//! core: the security-finding and workflow-run data model, ID generation,
//! severity mapping, error kinds, clock abstraction, and configuration.

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod capability;
pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod error;
pub mod finding;
pub mod id;
pub mod ids;
#[macro_use]
pub mod macros;
pub mod severity;
pub mod target;
pub mod template;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use capability::{
    Capabilities, ExecutionConfig, InputRequirements, Metadata as ToolMetadata, OutputFormat,
    ResourceRequirements, ToolCapability, ToolType,
};
pub use checkpoint::CheckpointRecord;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{CheckpointConfig, ConcurrencyConfig, RetryConfig, ValidationConfig, WorkflowConfig};
pub use error::{CoreError, CoreResult};
pub use finding::{extract_cwe_id, Finding};
pub use ids::{CheckpointId, RunId, TaskId};
pub use severity::{default_confidence_for_level, Severity};
pub use target::{ScanTarget, TargetType};
pub use template::WorkflowTemplate;
pub use workflow::{
    elapsed_since, NodeKind, NodeResult, RunContext, RunStatus, ToolExecutionResult, WorkflowState,
    WorkflowSummary, WorkflowType,
};
