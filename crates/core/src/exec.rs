//! Subprocess dispatcher.
//!
//! Runs a resolved [`CommandSpec`] as an isolated child process with a
//! hard wall-clock timeout and captures both output streams. This is
//! the only place in the worker that can block for a long duration,
//! and it is bounded: every path out of [`run_command`] returns within
//! the timeout plus stream-drain time.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::registry::CommandSpec;

/// Maximum stdout or stderr size captured per stream (10 MiB).
/// Anything beyond the cap is dropped.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// The observable result of one command execution.
///
/// This type is deliberately not a `Result`: spawn failures, timeouts,
/// and non-zero exits are all folded into a failed outcome with a
/// non-empty `stderr`, so the poll loop never has an error to handle
/// here and the job store never sees a failed job with an empty error.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    fn failure(stderr: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
        }
    }
}

/// Spawn `spec` with its working directory pinned to `workdir`, wait at
/// most `timeout`, and capture stdout/stderr as text.
///
/// On timeout the child is killed (`kill_on_drop`) and the outcome
/// carries a message naming the configured bound. A non-zero exit with
/// empty stderr synthesizes an error embedding the exit code.
pub async fn run_command(spec: &CommandSpec, workdir: &Path, timeout: Duration) -> CommandOutcome {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return CommandOutcome::failure(format!("Failed to launch {}: {e}", spec.program)),
    };

    // Read the streams in spawned tasks so we can still call
    // `child.wait()` (which borrows `&mut child`).
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
    let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let stdout_bytes = stdout_task.await.unwrap_or_default();
            let stderr_bytes = stderr_task.await.unwrap_or_default();
            let stdout = String::from_utf8_lossy(&stdout_bytes).trim().to_string();
            let mut stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();

            let success = status.success();
            if !success && stderr.is_empty() {
                stderr = format!("Exit code {}", status.code().unwrap_or(-1));
            }
            CommandOutcome {
                success,
                stdout,
                stderr,
            }
        }
        Ok(Err(e)) => CommandOutcome::failure(format!("Failed waiting on {}: {e}", spec.program)),
        Err(_elapsed) => {
            // Timeout expired. Dropping `child` kills the process
            // because `kill_on_drop(true)` is set.
            CommandOutcome::failure(format!("Job timed out after {}s", timeout.as_secs()))
        }
    }
}

/// Read an entire output stream into a byte buffer, capped at
/// [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
