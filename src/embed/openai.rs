use super::{validate_embeddings, Embedder};
use crate::api_backend::ApiBackendClient;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embeddings client for OpenAI-compatible `/embeddings` endpoints
pub struct OpenAiEmbedder {
    client: ApiBackendClient,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl OpenAiEmbedder {
    /// Build a client reading the API key from `config.api_key_env`
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Self::with_api_key(config, config.api_key())
    }

    pub fn with_api_key(config: &EmbeddingConfig, api_key: Option<String>) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::Config("embedding.model must not be empty".to_string()));
        }

        let client = ApiBackendClient::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.timeout_secs),
            config.retries,
        )?;

        Ok(Self {
            client,
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: &texts,
        };
        let mut parsed: EmbeddingResponse = self
            .client
            .post_json("embeddings", &request, Error::Embedding)
            .await?;

        parsed.data.sort_by_key(|entry| entry.index);
        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();

        validate_embeddings(&embeddings, texts.len(), self.dimension, &self.model)?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
