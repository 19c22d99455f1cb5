//! Embedding generation
//!
//! This module provides an abstraction over embedding models with:
//! - A trait for different embedding backends
//! - An OpenAI-compatible HTTP backend
//! - Sequential batch processing with progress reporting

mod openai;

pub use openai::*;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use indicatif::ProgressBar;
use tracing::debug;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per text in input order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned".to_string()))
    }

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    let embedder = OpenAiEmbedder::new(config)?;
    Ok(Box::new(embedder))
}

/// Check a backend response: one vector per input, each of `dimension` entries
pub fn validate_embeddings(
    embeddings: &[Vec<f32>],
    expected_count: usize,
    dimension: usize,
    model: &str,
) -> Result<()> {
    if embeddings.len() != expected_count {
        return Err(Error::Embedding(format!(
            "Model '{}' returned {} embeddings for {} inputs",
            model,
            embeddings.len(),
            expected_count
        )));
    }

    if let Some(mismatch) = embeddings.iter().find(|vec| vec.len() != dimension) {
        return Err(Error::Embedding(format!(
            "Embedding dimension mismatch for model '{}': expected {}, got {}",
            model,
            dimension,
            mismatch.len()
        )));
    }

    Ok(())
}

/// Embed texts sequentially in batches of `batch_size`.
///
/// With `batch_size = 1` every text is embedded with its own request.
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: Vec<String>,
    batch_size: usize,
    progress: Option<&ProgressBar>,
) -> Result<Vec<Vec<f32>>> {
    let mut all_embeddings = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size.max(1)) {
        let batch_texts: Vec<String> = chunk.to_vec();
        let embeddings = embedder.embed(batch_texts).await?;
        debug!("Embedded batch of {}", chunk.len());
        all_embeddings.extend(embeddings);

        if let Some(pb) = progress {
            pb.inc(chunk.len() as u64);
        }
    }

    Ok(all_embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns `[len, index, 0, ...]` per text and counts calls
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, t)| vec![t.len() as f32, i as f32, 0.0])
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let texts: Vec<String> = (0..10).map(|i| "x".repeat(i + 1)).collect();

        let vectors = embed_in_batches(&embedder, texts, 3, None).await.unwrap();

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4); // 3 + 3 + 3 + 1
        assert_eq!(vectors.len(), 10);
        for (i, v) in vectors.iter().enumerate() {
            assert_eq!(v[0], (i + 1) as f32);
        }
    }

    #[tokio::test]
    async fn test_batch_size_one_is_one_call_per_text() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let texts: Vec<String> = (0..5).map(|i| format!("text {}", i)).collect();

        embed_in_batches(&embedder, texts, 1, None).await.unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_embed_query_default() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let v = embedder.embed_query("four").await.unwrap();
        assert_eq!(v, vec![4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_validate_embeddings() {
        let good = vec![vec![0.0; 4], vec![1.0; 4]];
        assert!(validate_embeddings(&good, 2, 4, "m").is_ok());
        assert!(validate_embeddings(&good, 3, 4, "m").is_err());
        assert!(validate_embeddings(&good, 2, 5, "m").is_err());
    }
}
