//! Shared error kinds for the orchestration core.
//!
//! Every crate in the workspace reports failures through [`CoreError`] or a
//! crate-local error that wraps it with `#[from]`, the way `oj-engine`'s
//! `ExecuteError` wraps adapter and storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InputError(String),

    #[error("tool not registered: {0}")]
    NotRegistered(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("execution failed: {0}")]
    ExecutionError(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("failed to parse tool output: {0}")]
    ParseError(String),

    #[error("persistence error: {0}")]
    PersistenceError(String),

    #[error("cancelled")]
    Cancelled,
}

impl CoreError {
    /// Stable tag used in structured logs and API responses, independent of
    /// the human-readable message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputError(_) => "input_error",
            Self::NotRegistered(_) => "not_registered",
            Self::NotFound(_) => "not_found",
            Self::ValidationError(_) => "validation_error",
            Self::ExecutionError(_) => "execution_error",
            Self::Timeout(_) => "timeout",
            Self::ParseError(_) => "parse_error",
            Self::PersistenceError(_) => "persistence_error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a scheduler should retry the operation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExecutionError(_) | Self::Timeout(_) | Self::PersistenceError(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
