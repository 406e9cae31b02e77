//! Custom error type that carries a process exit code, grounded on the
//! equivalent type in the teacher's own CLI crate: commands return
//! `ExitError` instead of calling `std::process::exit()` directly, so
//! `main()` is the only place that terminates the process.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<sf_core::CoreError> for ExitError {
    fn from(err: sf_core::CoreError) -> Self {
        let code = match err.kind() {
            "not_found" => 2,
            "validation_error" | "input_error" => 3,
            _ => 1,
        };
        Self::new(code, err.to_string())
    }
}
