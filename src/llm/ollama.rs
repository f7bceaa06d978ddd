//! Ollama `/api/generate` client for self-hosted models.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::{Configuration, Provider, Task};
use crate::error::DispatchError;

use super::provider::{ProviderClient, ProviderResponse, decode_reply, post_json, text_at};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: Options,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f32,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, config: &'a Configuration) -> Self {
        Self {
            model: &config.model,
            prompt,
            stream: false,
            options: Options {
                temperature: config.temperature,
            },
            format: (config.task == Task::Verify).then_some("json"),
        }
    }
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &Configuration,
    ) -> Result<ProviderResponse, DispatchError> {
        let url = format!("{}/api/generate", config.base_url.trim_end_matches('/'));
        info!("Sending request to ollama model {} at {}", config.model, url);

        let body = GenerateRequest::new(prompt, config);
        let request = self.http.post(&url);
        let reply = post_json(request, &body, Provider::Ollama, config.timeout_secs).await?;

        let value = decode_reply(&reply, Provider::Ollama)?;
        let generated_text = text_at(&value, "/response", Provider::Ollama)?;

        Ok(ProviderResponse {
            raw_body: reply.body,
            generated_text,
        })
    }
}
