//! Query command implementation

use crate::completion::CompletionClient;
use crate::config::Config;
use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::prompt::build_prompt;
use crate::store::ChunkStore;
use serde::Serialize;
use tracing::{debug, info};

/// A retrieved chunk reference shown alongside the answer
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub distance: f64,
}

/// Result of a query
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub question: String,
    pub prompt: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Embed the question, retrieve the nearest chunks and ask the model
pub async fn cmd_query(
    config: &Config,
    store: &dyn ChunkStore,
    embedder: &dyn Embedder,
    completion: &dyn CompletionClient,
    question: &str,
    limit: Option<usize>,
) -> Result<QueryAnswer> {
    info!("Querying: {}", question);

    let top_n = limit.unwrap_or(config.query.default_k);
    if top_n == 0 || top_n > config.query.max_results {
        return Err(Error::Config(format!(
            "limit must be between 1 and {}",
            config.query.max_results
        )));
    }

    let query_vector = embedder.embed_query(question).await?;
    let results = store.search(&query_vector, top_n).await?;
    debug!("Got {} chunks for context", results.len());

    let context: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
    let prompt = build_prompt(&context, question);

    let answer = completion.complete(&prompt).await?;
    info!("Received answer from {}", completion.model_name());

    Ok(QueryAnswer {
        question: question.to_string(),
        prompt,
        answer,
        sources: results
            .into_iter()
            .map(|r| SourceRef {
                chunk_id: r.chunk_id,
                distance: r.distance,
            })
            .collect(),
    })
}

/// Print the generated prompt and the model's answer
pub fn print_query_answer(result: &QueryAnswer) {
    println!("Generated prompt:\n{}\n", result.prompt);
    println!("Response:\n{}", result.answer);

    if !result.sources.is_empty() {
        println!("\nSources:");
        for source in &result.sources {
            println!("  [distance: {:.4}] {}", source.distance, source.chunk_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::ChunkRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Maps every text to a fixed vector
    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }

        fn dimension(&self) -> usize {
            self.0.len()
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    /// Records the prompt it was given
    #[derive(Default)]
    struct RecordingCompletion {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingCompletion {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("forty-two".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    async fn seeded_store(n: usize) -> MemoryStore {
        let store = MemoryStore::new(2);
        store.ensure_schema().await.unwrap();
        let records: Vec<ChunkRecord> = (0..n)
            .map(|i| ChunkRecord {
                chunk_id: format!("data/doc.pdf:{}", i),
                content: format!("chunk {}", i),
                embedding: vec![i as f32, 0.0],
            })
            .collect();
        store.write(&records).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_query_retrieves_top_five_nearest() {
        let config = Config::default();
        let store = seeded_store(8).await;
        let completion = RecordingCompletion::default();

        let answer = cmd_query(
            &config,
            &store,
            &FixedEmbedder(vec![6.2, 0.0]),
            &completion,
            "what?",
            None,
        )
        .await
        .unwrap();

        assert_eq!(answer.answer, "forty-two");
        assert_eq!(answer.sources.len(), 5);
        for pair in answer.sources.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert_eq!(answer.sources[0].chunk_id, "data/doc.pdf:6");

        let prompts = completion.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], answer.prompt);
        assert!(answer
            .prompt
            .starts_with("Answer the question based only on the following context:\n\nchunk 6\n\n---\n\n"));
        assert!(answer
            .prompt
            .ends_with("Answer the question based on the above context: what?"));
    }

    #[tokio::test]
    async fn test_query_respects_limit() {
        let config = Config::default();
        let store = seeded_store(8).await;

        let answer = cmd_query(
            &config,
            &store,
            &FixedEmbedder(vec![0.0, 0.0]),
            &RecordingCompletion::default(),
            "q",
            Some(2),
        )
        .await
        .unwrap();

        let ids: Vec<_> = answer.sources.iter().map(|s| s.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["data/doc.pdf:0", "data/doc.pdf:1"]);
    }

    #[tokio::test]
    async fn test_query_rejects_out_of_range_limit() {
        let config = Config::default();
        let store = seeded_store(1).await;

        for limit in [0, config.query.max_results + 1] {
            let result = cmd_query(
                &config,
                &store,
                &FixedEmbedder(vec![0.0, 0.0]),
                &RecordingCompletion::default(),
                "q",
                Some(limit),
            )
            .await;
            assert!(matches!(result, Err(Error::Config(_))));
        }
    }

    #[tokio::test]
    async fn test_query_on_missing_table_fails() {
        let config = Config::default();
        let store = MemoryStore::new(2);

        let result = cmd_query(
            &config,
            &store,
            &FixedEmbedder(vec![0.0, 0.0]),
            &RecordingCompletion::default(),
            "q",
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
