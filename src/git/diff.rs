//! Staged diff acquisition.
//!
//! Shells out to the system `git` binary so the diff honours the same
//! environment git set up for the hook (`GIT_INDEX_FILE`, `GIT_DIR`, ...).

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::SourceError;

/// Run `git diff --staged` in `dir` and return its output verbatim.
///
/// Non-UTF-8 bytes are replaced rather than rejected; the diff is only
/// ever shown to the model.
pub fn staged_diff(dir: &Path) -> Result<String, SourceError> {
    let output = Command::new("git")
        .args(["diff", "--staged"])
        .current_dir(dir)
        .output()
        .map_err(SourceError::SpawnFailed)?;

    if !output.status.success() {
        return Err(SourceError::GitFailed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let diff = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!("Staged diff: {} bytes", diff.len());
    Ok(diff)
}
