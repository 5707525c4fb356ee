//! HTTP text-generation collaborator: a blocking client for an
//! OpenAI-compatible chat-completions endpoint.

use crate::synth::{GeneratorError, TextGenerator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Answers are a few words; keep the budget short.
const MAX_ANSWER_TOKENS: u32 = 40;

pub struct LlmGenerator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl LlmGenerator {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GeneratorError(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

impl TextGenerator for LlmGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_ANSWER_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| GeneratorError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError(format!(
                "generator endpoint returned {}",
                status.as_u16()
            )));
        }

        let parsed: ChatResponse = response.json().map_err(|e| GeneratorError(e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Err(GeneratorError("generator returned empty text".to_string()));
        }
        Ok(text.to_string())
    }
}
