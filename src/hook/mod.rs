//! The two hook pipelines and the decision each one reaches.
//!
//! Pipelines never signal "don't block" by swallowing an error. They return
//! an [`Outcome`], and only file I/O on the commit message file escapes as
//! a [`HookError`](crate::error::HookError).

pub mod prepare;
pub mod verify;

use std::fmt;

use crate::error::{ConfigError, DispatchError, SourceError, VerdictError};

/// Exit status for an allowed or skipped hook.
pub const EXIT_OK: i32 = 0;
/// Exit status that makes git abort the commit.
pub const EXIT_BLOCKED: i32 = 1;
/// Exit status for a hard failure (commit message file unreadable or unwritable).
pub const EXIT_FAILURE: i32 = 2;

/// Final decision of a hook run.
#[derive(Debug)]
pub enum Outcome {
    /// Verification passed, or a suggestion was written.
    Allow,
    /// Reject the commit with this reason.
    Block(String),
    /// Nothing was decided; the commit proceeds untouched.
    Skip(SkipCause),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Allow | Outcome::Skip(_) => EXIT_OK,
            Outcome::Block(_) => EXIT_BLOCKED,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Outcome::Block(_))
    }
}

/// Why a pipeline stopped without a decision.
#[derive(Debug)]
pub enum SkipCause {
    /// Empty diff or empty message.
    NothingToDo(&'static str),
    /// prepare-commit-msg was invoked for a message that already exists.
    HookSource(String),
    Source(SourceError),
    Config(ConfigError),
    Dispatch(DispatchError),
    Verdict(VerdictError),
    /// The provider answered with whitespace only.
    EmptySuggestion,
}

impl SkipCause {
    /// Whether the skip was caused by something going wrong, as opposed to
    /// there simply being nothing to do.
    pub fn is_failure(&self) -> bool {
        !matches!(self, SkipCause::NothingToDo(_) | SkipCause::HookSource(_))
    }
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipCause::NothingToDo(what) => f.write_str(what),
            SkipCause::HookSource(source) => write!(f, "commit message source is '{}'", source),
            SkipCause::Source(e) => write!(f, "could not read staged changes: {}", e),
            SkipCause::Config(e) => write!(f, "configuration error: {}", e),
            SkipCause::Dispatch(e) => write!(f, "provider request failed: {}", e),
            SkipCause::Verdict(e) => write!(f, "could not interpret verdict: {}", e),
            SkipCause::EmptySuggestion => f.write_str("provider returned an empty suggestion"),
        }
    }
}

/// Print a rejected commit's reason to stderr inside a border.
pub fn print_block(reason: &str) {
    let border = "=".repeat(60);
    eprintln!("{border}");
    eprintln!("Commit rejected by AI verification:");
    eprintln!();
    eprintln!("  {reason}");
    eprintln!();
    eprintln!("Expected format: type(scope): description");
    eprintln!("{border}");
}
