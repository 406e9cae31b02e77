//! Subprocess execution with a timeout, grounded on the
//! `run_with_timeout` pattern `oj-engine::executor` uses for its own
//! external-process effects.

use sf_core::{CoreError, CoreResult};
use std::time::Duration;
use tokio::process::Command;

pub async fn run_with_timeout(mut command: Command, timeout: Duration) -> CoreResult<(i32, String, String)> {
    command.stdout(std::process::Stdio::piped());
    command.stderr(std::process::Stdio::piped());

    let child = command
        .spawn()
        .map_err(|e| CoreError::ExecutionError(format!("failed to spawn process: {e}")))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| CoreError::Timeout(timeout))?
        .map_err(|e| CoreError::ExecutionError(format!("process wait failed: {e}")))?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Ok((exit_code, stdout, stderr))
}
