//! Configuration resolved once per hook invocation.
//!
//! Every tunable comes from an explicit environment map. The map is captured
//! at process entry by [`Environment::capture`]; nothing else in the crate
//! reads the process environment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ConfigError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_DIFF_LENGTH: usize = 8000;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 300;
pub const DEFAULT_SUGGEST_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_VERIFY_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_LOG_FILE: &str = "ia-commits.log";

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Ollama => "ollama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "ollama" => Ok(Provider::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Which pipeline the configuration is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// prepare-commit-msg: suggest a message from the staged diff.
    Suggest,
    /// commit-msg: judge the pending message.
    Verify,
}

/// What the verification pipeline does when no verdict can be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Let the commit through.
    Open,
    /// Reject the commit.
    #[default]
    Closed,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "allow" => Ok(FailurePolicy::Open),
            "closed" | "block" => Ok(FailurePolicy::Closed),
            other => Err(other.to_string()),
        }
    }
}

/// An API key that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Snapshot of environment variables, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Load `.env` from the working directory (without overriding variables
    /// that are already set) and snapshot the process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped; none of
    /// ours can be.
    pub fn capture() -> Self {
        let _ = dotenv::dotenv();
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    debug!("Skipping non UTF-8 environment variable {:?}", key);
                    None
                }
            })
            .collect();
        Self { vars }
    }

    /// Value of `name`, treating blank values as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Fully resolved settings for one hook run. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<ApiKey>,
    pub timeout_secs: u64,
    pub max_diff_length: usize,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub log_path: String,
    pub task: Task,
    pub failure_policy: FailurePolicy,
}

impl Configuration {
    /// Resolve the configuration for `task`, applying one default per option.
    ///
    /// Fails only when the selected provider cannot be used at all: an
    /// unknown provider name, or gemini without `GEMINI_API_KEY`.
    pub fn resolve(task: Task, env: &Environment) -> Result<Self, ConfigError> {
        let provider = match env.get("AI_PROVIDER") {
            Some(name) => name.parse()?,
            None => Provider::Gemini,
        };

        let (model, base_url, api_key) = match provider {
            Provider::Gemini => {
                let key = env.get("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
                (
                    env.get("API_MODEL").unwrap_or(DEFAULT_GEMINI_MODEL),
                    env.get("API_BASE_URL").unwrap_or(DEFAULT_GEMINI_BASE_URL),
                    Some(ApiKey::new(key)),
                )
            }
            Provider::Ollama => (
                env.get("OLLAMA_MODEL").unwrap_or(DEFAULT_OLLAMA_MODEL),
                env.get("OLLAMA_URL").unwrap_or(DEFAULT_OLLAMA_URL),
                None,
            ),
        };

        let temperature = match task {
            Task::Suggest => temperature_var(env, "TEMPERATURE", DEFAULT_SUGGEST_TEMPERATURE),
            Task::Verify => temperature_var(env, "TEMPERATURE_VERIFY", DEFAULT_VERIFY_TEMPERATURE),
        };

        Ok(Self {
            provider,
            model: model.to_string(),
            base_url: base_url.to_string(),
            api_key,
            timeout_secs: positive_var(env, "API_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS),
            max_diff_length: positive_var(env, "MAX_DIFF_LENGTH", DEFAULT_MAX_DIFF_LENGTH),
            max_output_tokens: positive_var(env, "MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS),
            temperature,
            log_path: log_path(env),
            task,
            failure_policy: failure_policy(env),
        })
    }
}

/// Log file location. Available even when the rest of the configuration
/// fails to resolve, so the failure itself can be logged.
pub fn log_path(env: &Environment) -> String {
    env.get("LOG_FILE").unwrap_or(DEFAULT_LOG_FILE).to_string()
}

/// Verification failure policy from `VERIFY_FAIL_POLICY`.
///
/// Resolved independently of the provider settings so a missing API key is
/// still subject to the policy.
pub fn failure_policy(env: &Environment) -> FailurePolicy {
    match env.get("VERIFY_FAIL_POLICY") {
        Some(v) => v.parse().unwrap_or_else(|bad| {
            warn!("Invalid VERIFY_FAIL_POLICY value '{}', using closed", bad);
            FailurePolicy::Closed
        }),
        None => FailurePolicy::default(),
    }
}

/// Parse a strictly positive integer, warning and falling back on bad input.
fn positive_var<T>(env: &Environment, name: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + fmt::Display + Copy,
{
    match env.get(name) {
        Some(v) => match v.parse::<T>() {
            Ok(n) if n > T::default() => n,
            _ => {
                warn!("Invalid {} value '{}', using default {}", name, v, default);
                default
            }
        },
        None => default,
    }
}

fn temperature_var(env: &Environment, name: &str, default: f32) -> f32 {
    match env.get(name) {
        Some(v) => match v.parse::<f32>() {
            Ok(t) if (0.0..=1.0).contains(&t) => t,
            _ => {
                warn!("Invalid {} value '{}', using default {}", name, v, default);
                default
            }
        },
        None => default,
    }
}
