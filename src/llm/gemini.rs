//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::{ApiKey, Configuration, Provider, Task};
use crate::error::DispatchError;

use super::provider::{ProviderClient, ProviderResponse, decode_reply, post_json, text_at};

/// JSON pointer to the generated text in a `generateContent` reply.
const TEXT_POINTER: &str = "/candidates/0/content/parts/0/text";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, config: &Configuration) -> Self {
        let (max_output_tokens, response_mime_type) = match config.task {
            Task::Suggest => (Some(config.max_output_tokens), None),
            Task::Verify => (None, Some("application/json")),
        };

        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens,
                response_mime_type,
            },
        }
    }
}

/// Client for the hosted Gemini API.
pub struct GeminiClient {
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &Configuration,
    ) -> Result<ProviderResponse, DispatchError> {
        // The key travels as a query parameter; keep the logged URL free of it.
        let url = format!("{}{}:generateContent", config.base_url, config.model);
        let key = config.api_key.as_ref().map(ApiKey::expose).unwrap_or_default();
        info!("Sending request to gemini model {}", config.model);

        let request = self.http.post(&url).query(&[("key", key)]);
        let body = GenerateContentRequest::new(prompt, config);
        let reply = post_json(request, &body, Provider::Gemini, config.timeout_secs).await?;

        let value = decode_reply(&reply, Provider::Gemini)?;
        let generated_text = text_at(&value, TEXT_POINTER, Provider::Gemini)?;

        Ok(ProviderResponse {
            raw_body: reply.body,
            generated_text,
        })
    }
}
