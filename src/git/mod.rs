//! Inputs read from the repository: the staged diff and the pending message.

pub mod diff;
pub mod message;

pub use diff::staged_diff;
pub use message::{read_pending_message, strip_comments};
