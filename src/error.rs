//! Error types for ia-commits modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from resolving the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set. Export it or add it to a .env file, or set AI_PROVIDER=ollama")]
    MissingApiKey,

    #[error("Unknown AI_PROVIDER '{0}'. Supported providers: gemini, ollama")]
    UnknownProvider(String),
}

/// Errors from a single provider request.
///
/// Every variant means "no generated text"; they are kept apart so the log
/// shows which step failed.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to {provider} timed out after {secs} seconds")]
    Timeout { provider: &'static str, secs: u64 },

    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned an error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} responded with HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a body that is not valid JSON: {detail}")]
    MalformedBody {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} response has no generated text")]
    MissingText { provider: &'static str },
}

/// Errors from interpreting a verification answer.
#[derive(Error, Debug)]
pub enum VerdictError {
    #[error("Verdict is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Verdict is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("Verdict field 'valid' is not a boolean: {0}")]
    InvalidValidField(String),
}

/// Errors from reading the staged diff.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to run git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git diff --staged exited with {}: {stderr}",
             code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    GitFailed { code: Option<i32>, stderr: String },
}

/// Errors that abort a hook with a hard failure.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Failed to read commit message file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write commit message file {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from installing or removing hook scripts.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Not a git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("Repository has no hooks directory (bare repository without a work tree?)")]
    NoHooksDirectory,

    #[error("{} already exists and was not installed by ia-commits. Use --force to replace it.", path.display())]
    ForeignHook { path: PathBuf },

    #[error("Failed to write hook {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove hook {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Installation cancelled")]
    Cancelled,
}
