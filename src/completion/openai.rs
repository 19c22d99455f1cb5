use super::CompletionClient;
use crate::api_backend::ApiBackendClient;
use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for OpenAI-compatible `/chat/completions` endpoints
pub struct OpenAiChatClient {
    client: ApiBackendClient,
    model: String,
    temperature: f32,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    /// Build a client reading the API key from `config.api_key_env`
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        Self::with_api_key(config, config.api_key())
    }

    pub fn with_api_key(config: &CompletionConfig, api_key: Option<String>) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::Config("completion.model must not be empty".to_string()));
        }

        // Completions are never retried
        let client = ApiBackendClient::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.timeout_secs),
            0,
        )?;

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Requesting completion");
        let parsed: ChatResponse = self
            .client
            .post_json("chat/completions", &body, Error::Completion)
            .await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| Error::Completion(format!("Model '{}' returned no choices", self.model)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
