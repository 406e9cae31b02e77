//! Tool adapter contract and registry: the plugin boundary between the
//! orchestration core and external scanners.

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cli_adapter;
pub mod contract;
pub mod registry;
pub mod subprocess;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cli_adapter::CliAdapter;
pub use contract::{AdapterRequest, RawOutput, ToolAdapter, FORBIDDEN_SHELL_CHARS};
pub use registry::{RegistrySummary, ToolRegistry};
