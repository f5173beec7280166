//! Subprocess helpers shared by the host-backed facility implementations.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use tokio::process::Command;

/// Run a command to completion and return its collected output.
///
/// Spawn failures are folded into the error string; exit status is left for
/// the caller to interpret.
pub(crate) async fn run_output<I, S>(program: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("spawn {}: {}", program.display(), e))
}

/// Run a command and fold a non-zero exit into `Err` carrying the exit
/// status and trimmed stderr.
pub(crate) async fn run_checked<I, S>(program: &Path, args: I) -> Result<(), String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run_output(program, args).await?;
    status_ok(program, &output)
}

pub(crate) fn status_ok(program: &Path, output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(format!(
        "{} exited with {}: {}",
        program.display(),
        output.status,
        stderr.trim()
    ))
}
