//! LLM providers, prompt construction and response extraction.

pub mod gemini;
pub mod json;
pub mod ollama;
pub mod prompt;
pub mod provider;

pub use json::{extract_json, extract_json_with_key, strip_code_fence};
pub use prompt::{PromptRequest, build_suggestion_prompt, build_verification_prompt};
pub use provider::{ProviderClient, ProviderResponse, create_provider};
