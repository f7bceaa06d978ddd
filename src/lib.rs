//! ia-commits - AI-assisted git commit hooks.
//!
//! # Overview
//!
//! Two hooks share one provider layer. `prepare-commit-msg` sends the staged
//! diff to an LLM (Gemini or a local Ollama) and writes the suggested
//! Conventional Commit message above git's template. `commit-msg` asks the
//! model whether the final message follows the convention and blocks the
//! commit when it does not.

pub mod config;
pub mod error;
pub mod git;
pub mod hook;
pub mod install;
pub mod llm;
pub mod logging;

// Re-export commonly used types
pub use config::{Configuration, Environment, FailurePolicy, Provider, Task};
pub use error::{ConfigError, DispatchError, HookError, InstallError, SourceError, VerdictError};
pub use hook::{Outcome, SkipCause};
pub use llm::{ProviderClient, ProviderResponse, create_provider};
