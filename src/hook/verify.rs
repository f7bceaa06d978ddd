//! commit-msg: ask the provider whether the pending message is a valid
//! Conventional Commit.
//!
//! An explicit `valid: false` always blocks. When no verdict can be
//! obtained at all (configuration, transport, provider or parse failure),
//! the configured [`FailurePolicy`] decides, the same way for every cause.

use std::path::Path;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::{self, Configuration, Environment, FailurePolicy, Task};
use crate::error::{HookError, VerdictError};
use crate::git::read_pending_message;
use crate::llm::{
    ProviderClient, build_verification_prompt, create_provider, extract_json_with_key,
};

use super::{Outcome, SkipCause};

/// Reason used when the model rejects a message without saying why.
pub const DEFAULT_INVALID_REASON: &str = "Commit message format is incorrect.";

/// The model's judgment of a commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub reason: Option<String>,
}

/// Parse a verdict from the model's answer.
///
/// Accepts fenced or prose-wrapped JSON; among several objects in prose the
/// one carrying `valid` is used. A missing `valid` key counts as valid; an
/// invalid verdict always carries a reason.
pub fn parse_verdict(text: &str) -> Result<Verdict, VerdictError> {
    let json = extract_json_with_key(text, "valid")
        .ok_or_else(|| VerdictError::InvalidJson(text.chars().take(200).collect()))?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| VerdictError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| VerdictError::NotAnObject(json.to_string()))?;

    let valid = match object.get("valid") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(valid)) => *valid,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(other) => return Err(VerdictError::InvalidValidField(other.to_string())),
    };

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let reason = match (valid, reason) {
        (false, None) => Some(DEFAULT_INVALID_REASON.to_string()),
        (_, reason) => reason,
    };

    Ok(Verdict { valid, reason })
}

/// Decision when no verdict could be obtained.
pub fn on_failure(policy: FailurePolicy, cause: SkipCause) -> Outcome {
    match policy {
        FailurePolicy::Open => {
            warn!("Verification skipped: {}", cause);
            Outcome::Skip(cause)
        }
        FailurePolicy::Closed => {
            let reason = format!("AI verification could not be completed ({}).", cause);
            error!("Commit blocked: {}", reason);
            Outcome::Block(reason)
        }
    }
}

/// Run the hook end to end for the message file at `path`.
pub async fn run(path: &Path, env: &Environment) -> Result<Outcome, HookError> {
    let message = read_pending_message(path)?;
    if message.is_empty() {
        info!("Empty commit message, nothing to verify");
        return Ok(Outcome::Skip(SkipCause::NothingToDo("empty commit message")));
    }

    let policy = config::failure_policy(env);

    let config = match Configuration::resolve(Task::Verify, env) {
        Ok(config) => config,
        Err(e) => return Ok(on_failure(policy, SkipCause::Config(e))),
    };

    let provider = match create_provider(&config) {
        Ok(provider) => provider,
        Err(e) => return Ok(on_failure(policy, SkipCause::Dispatch(e))),
    };

    Ok(verify(&message, &config, provider.as_ref()).await)
}

/// Judge `message` (already stripped of comments).
pub async fn verify(
    message: &str,
    config: &Configuration,
    provider: &dyn ProviderClient,
) -> Outcome {
    if message.trim().is_empty() {
        return Outcome::Skip(SkipCause::NothingToDo("empty commit message"));
    }

    let prompt = build_verification_prompt(message);
    let response = match provider.generate(&prompt.render(), config).await {
        Ok(response) => response,
        Err(e) => return on_failure(config.failure_policy, SkipCause::Dispatch(e)),
    };

    let verdict = match parse_verdict(&response.generated_text) {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!("Unparseable verdict: {}", response.generated_text);
            return on_failure(config.failure_policy, SkipCause::Verdict(e));
        }
    };

    if verdict.valid {
        info!("Commit message accepted: {}", first_line(message));
        Outcome::Allow
    } else {
        let reason = verdict
            .reason
            .unwrap_or_else(|| DEFAULT_INVALID_REASON.to_string());
        error!("Commit blocked: {} (message: {})", reason, first_line(message));
        Outcome::Block(reason)
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}
