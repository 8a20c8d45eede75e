//! Shared subprocess plumbing for the external tools

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error};

use crate::domain::services::ToolError;

/// Build a command that cannot prompt and dies with its awaiting future.
pub(crate) fn command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run `cmd` to completion and return its stdout, mapping a failed launch or
/// a non-zero exit into [`ToolError`].
pub(crate) async fn run(program: &str, mut cmd: Command) -> Result<Vec<u8>, ToolError> {
    debug!(command = ?cmd, "Executing external tool");

    let output = cmd.output().await.map_err(|source| ToolError::Launch {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!(
            program,
            exit_code = output.status.code(),
            stderr = %stderr,
            "External tool failed"
        );
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(output.stdout)
}

/// Probe `program` with a version flag and return the first output line.
pub(crate) async fn probe_version(
    program: &str,
    flag: impl AsRef<OsStr>,
) -> Result<String, ToolError> {
    let mut cmd = command(program);
    cmd.arg(flag);
    let stdout = run(program, cmd).await?;
    let text = String::from_utf8_lossy(&stdout);
    Ok(text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string())
}
