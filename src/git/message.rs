//! Pending commit message handling.

use std::path::Path;

use crate::error::HookError;

/// Git's default comment character.
pub const COMMENT_CHAR: char = '#';

/// Drop comment lines and trim the rest.
///
/// Only lines whose first character is `#` are comments; an indented `#`
/// is message text, matching git's own cleanup.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with(COMMENT_CHAR))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Read the commit message file and strip its comments.
///
/// Messages in a legacy `i18n.commitEncoding` are not UTF-8; invalid bytes
/// become U+FFFD instead of failing the read.
pub fn read_pending_message(path: &Path) -> Result<String, HookError> {
    let raw = std::fs::read(path).map_err(|source| HookError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(strip_comments(&String::from_utf8_lossy(&raw)))
}
