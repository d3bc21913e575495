//! External program invocation. Arguments are passed as a vector, never through a shell.

use std::ffi::OsStr;
use std::process::Output;
use tokio::process::Command;
use topic_upload::DownloadError;
use tracing::{debug, warn};

/// Bytes of stderr kept in logs when a program fails.
const STDERR_TAIL: usize = 600;

/// Runs `program` to completion, failing on spawn errors and non-zero exit.
pub async fn run<I, S>(program: &str, args: I) -> Result<Output, DownloadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    debug!(program = %program, command = ?command.as_std(), "Running external program");

    let output = command.output().await.map_err(|e| DownloadError::Spawn {
        program: program.to_string(),
        message: e.to_string(),
    })?;

    if !output.status.success() {
        warn!(
            program = %program,
            status = %output.status,
            stderr = %stderr_tail(&output.stderr),
            "External program failed"
        );
        return Err(DownloadError::Process {
            program: program.to_string(),
            status: output.status.to_string(),
        });
    }
    Ok(output)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    let start = trimmed
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| trimmed.len() - i <= STDERR_TAIL)
        .unwrap_or(trimmed.len());
    trimmed[start..].to_string()
}
