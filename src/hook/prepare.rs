//! prepare-commit-msg: suggest a message from the staged diff.
//!
//! Suggestions are a convenience, so every provider or configuration
//! problem ends in [`Outcome::Skip`]. Only failing to read or write the
//! commit message file is a hard error.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::config::{Configuration, Environment, Task};
use crate::error::HookError;
use crate::git::staged_diff;
use crate::llm::{ProviderClient, build_suggestion_prompt, create_provider};

use super::{Outcome, SkipCause};

/// Line placed between the suggestion and the content git prepared.
pub const SEPARATOR: &str =
    "# ------------------------ > AI Suggestion Above < ------------------------";

/// Message sources for which a message already exists (`-m`, `-F`, merge,
/// squash, amend/`-c`). Only fresh and template commits get a suggestion.
const EXISTING_MESSAGE_SOURCES: [&str; 4] = ["message", "merge", "squash", "commit"];

/// Run the hook end to end: resolve config, read the diff, ask the provider
/// and prepend the answer to `path`.
pub async fn run(
    path: &Path,
    source: Option<&str>,
    repo_dir: &Path,
    env: &Environment,
) -> Result<Outcome, HookError> {
    if let Some(source) = source.filter(|s| EXISTING_MESSAGE_SOURCES.contains(s)) {
        info!("Skipping suggestion: commit message source is '{}'", source);
        return Ok(Outcome::Skip(SkipCause::HookSource(source.to_string())));
    }

    let config = match Configuration::resolve(Task::Suggest, env) {
        Ok(config) => config,
        Err(e) => return Ok(skipped(SkipCause::Config(e))),
    };

    let diff = match staged_diff(repo_dir) {
        Ok(diff) => diff,
        Err(e) => return Ok(skipped(SkipCause::Source(e))),
    };

    let provider = match create_provider(&config) {
        Ok(provider) => provider,
        Err(e) => return Ok(skipped(SkipCause::Dispatch(e))),
    };

    prepare(path, &diff, &config, provider.as_ref()).await
}

/// Suggest a message for `diff` and write it into `path`.
pub async fn prepare(
    path: &Path,
    diff: &str,
    config: &Configuration,
    provider: &dyn ProviderClient,
) -> Result<Outcome, HookError> {
    match suggest(diff, config, provider).await {
        Ok(suggestion) => {
            apply_suggestion(path, &suggestion)?;
            info!("Wrote AI suggestion to {}", path.display());
            Ok(Outcome::Allow)
        }
        Err(cause) => Ok(skipped(cause)),
    }
}

/// Ask the provider for a commit message. No provider call is made for an
/// empty diff.
pub async fn suggest(
    diff: &str,
    config: &Configuration,
    provider: &dyn ProviderClient,
) -> Result<String, SkipCause> {
    if diff.trim().is_empty() {
        return Err(SkipCause::NothingToDo("no staged changes"));
    }

    let prompt = build_suggestion_prompt(diff, config.max_diff_length);
    if prompt.truncated {
        info!(
            "Diff truncated from {} to {} characters",
            diff.chars().count(),
            prompt.truncated_payload_length
        );
    }

    let response = provider
        .generate(&prompt.render(), config)
        .await
        .map_err(SkipCause::Dispatch)?;

    let suggestion = response.generated_text.trim();
    if suggestion.is_empty() {
        return Err(SkipCause::EmptySuggestion);
    }

    Ok(suggestion.to_string())
}

/// Prepend `suggestion` and the separator to the file's current content.
///
/// The original bytes are kept exactly. The new content goes to a temporary
/// file in the same directory which is then renamed over the original, so
/// the editor never sees a half-written file.
pub fn apply_suggestion(path: &Path, suggestion: &str) -> Result<(), HookError> {
    let original = fs::read(path).map_err(|source| HookError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = format!("{}\n\n{}\n", suggestion.trim(), SEPARATOR).into_bytes();
    content.extend_from_slice(&original);

    write_atomically(path, &content)
}

fn write_atomically(path: &Path, content: &[u8]) -> Result<(), HookError> {
    let write_failed = |source: std::io::Error| HookError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(content).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;

    // Keep the original file mode; temp files are created 0600.
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(write_failed)?;
    }

    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}

fn skipped(cause: SkipCause) -> Outcome {
    match &cause {
        SkipCause::Dispatch(_) | SkipCause::Source(_) => error!("Suggestion skipped: {}", cause),
        _ if cause.is_failure() => warn!("Suggestion skipped: {}", cause),
        _ => info!("Suggestion skipped: {}", cause),
    }
    Outcome::Skip(cause)
}
