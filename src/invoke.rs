//! Spawning the external formatter.
//!
//! wpiformat is invoked as `<tool> -f <relative path>` with the working
//! directory set to the repository root. The path is passed as a real
//! argument vector entry, never through a shell, so file names with spaces
//! or metacharacters arrive at the tool intact.

use std::io;
use std::path::Path;
use std::process::ExitStatus;

use thiserror::Error;
use tokio::process::Command;

/// Failure modes of a formatter invocation that never produced output.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The file is not located under the repository root it was resolved
    /// against.
    #[error("{file} is outside the repository root {root}")]
    OutsideRoot { root: String, file: String },
    /// The formatter executable could not be found on PATH.
    #[error("wpiformat was not found in PATH. Is it installed?")]
    ToolMissing,
    #[error("failed to run wpiformat: {0}")]
    Io(#[from] io::Error),
}

/// Captured result of a completed formatter run.
#[derive(Debug)]
pub struct FormatOutcome {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl FormatOutcome {
    /// Exit code 0 means the file was formatted without complaints.
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `tool -f <file relative to root>` with `root` as the working
/// directory and capture its output.
///
/// The subprocess runs to completion; there is no timeout and no
/// cancellation. A spawn failure of kind `NotFound` is reported as
/// [`InvokeError::ToolMissing`] since, without a shell in between, that is
/// how a missing executable manifests.
pub async fn run_formatter(tool: &str, root: &Path, file: &Path) -> Result<FormatOutcome, InvokeError> {
    let relative = file.strip_prefix(root).map_err(|_| InvokeError::OutsideRoot {
        root: root.display().to_string(),
        file: file.display().to_string(),
    })?;

    log::debug!("running {} -f {} in {}", tool, relative.display(), root.display());

    let output = Command::new(tool)
        .arg("-f")
        .arg(relative)
        .current_dir(root)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                InvokeError::ToolMissing
            } else {
                InvokeError::Io(e)
            }
        })?;

    Ok(FormatOutcome {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
