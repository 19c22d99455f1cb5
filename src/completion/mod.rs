//! Chat completion
//!
//! Sends an assembled prompt, behind a fixed system instruction, to a chat
//! model and returns the text of the first choice.

mod openai;

pub use openai::*;

use crate::config::CompletionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat completion providers
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Answer `prompt`, returning the model's reply text
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Create a completion client based on configuration
pub fn create_completion_client(config: &CompletionConfig) -> Result<Box<dyn CompletionClient>> {
    let client = OpenAiChatClient::new(config)?;
    Ok(Box::new(client))
}
