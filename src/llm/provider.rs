//! Provider abstraction and the HTTP plumbing shared by every provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{Configuration, Provider};
use crate::error::DispatchError;

use super::gemini::GeminiClient;
use super::ollama::OllamaClient;

/// Text produced by a provider, with the body it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub raw_body: String,
    pub generated_text: String,
}

/// A text-generation backend.
///
/// Implementations send exactly one request per call and never retry.
/// Every failure comes back as a [`DispatchError`]; nothing panics or
/// escapes past this boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        config: &Configuration,
    ) -> Result<ProviderResponse, DispatchError>;
}

/// Build the client for the configured provider.
pub fn create_provider(config: &Configuration) -> Result<Box<dyn ProviderClient>, DispatchError> {
    let http = http_client(config)?;
    Ok(match config.provider {
        Provider::Gemini => Box::new(GeminiClient::new(http)),
        Provider::Ollama => Box::new(OllamaClient::new(http)),
    })
}

/// HTTP client whose total request deadline is `timeout_secs`.
pub(crate) fn http_client(config: &Configuration) -> Result<reqwest::Client, DispatchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(DispatchError::ClientBuild)
}

/// Status and body of a completed request.
pub(crate) struct RawReply {
    pub status: StatusCode,
    pub body: String,
}

/// POST `body` as JSON and read the whole reply.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    request: reqwest::RequestBuilder,
    body: &B,
    provider: Provider,
    timeout_secs: u64,
) -> Result<RawReply, DispatchError> {
    let name = provider.as_str();
    // reqwest errors carry the request URL, and the Gemini URL carries the key.
    let transport = |source: reqwest::Error| {
        let source = source.without_url();
        if source.is_timeout() {
            DispatchError::Timeout {
                provider: name,
                secs: timeout_secs,
            }
        } else {
            DispatchError::Transport {
                provider: name,
                source,
            }
        }
    };

    let response = request.json(body).send().await.map_err(transport)?;
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    debug!("{} replied with HTTP {} ({} bytes)", name, status, body.len());

    Ok(RawReply { status, body })
}

/// Decode a reply into JSON, classifying failures.
///
/// An `error` field wins over the status code: providers report quota and
/// model errors with it on both 2xx and 4xx replies.
pub(crate) fn decode_reply(reply: &RawReply, provider: Provider) -> Result<Value, DispatchError> {
    let name = provider.as_str();

    let value: Value = match serde_json::from_str(&reply.body) {
        Ok(value) => value,
        Err(e) if reply.status.is_success() => {
            return Err(DispatchError::MalformedBody {
                provider: name,
                detail: e.to_string(),
            });
        }
        Err(_) => return Err(status_error(reply, provider)),
    };

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Err(DispatchError::Provider {
            provider: name,
            message: error_message(error),
        });
    }

    if !reply.status.is_success() {
        return Err(status_error(reply, provider));
    }

    Ok(value)
}

/// Pull a non-empty string out of `value` at a JSON pointer.
pub(crate) fn text_at(
    value: &Value,
    pointer: &str,
    provider: Provider,
) -> Result<String, DispatchError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or(DispatchError::MissingText {
            provider: provider.as_str(),
        })
}

fn status_error(reply: &RawReply, provider: Provider) -> DispatchError {
    DispatchError::Status {
        provider: provider.as_str(),
        status: reply.status.as_u16(),
        body: reply.body.chars().take(500).collect(),
    }
}

/// Human-readable message from an `error` field.
///
/// Gemini sends `{"code": 400, "message": "...", "status": "..."}`,
/// Ollama a bare string.
fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
