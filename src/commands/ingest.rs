//! Load command implementation
//!
//! loader → chunker → embedder → store writer, in a single linear pass.

use crate::chunk::{split_documents, TextChunk};
use crate::config::Config;
use crate::embed::{embed_in_batches, validate_embeddings, Embedder};
use crate::error::Result;
use crate::loader::{load_pdf_directory, PageDocument};
use crate::progress::embedding_progress_bar;
use crate::store::{ChunkRecord, ChunkStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Options for a load run
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Directory searched for PDFs
    pub dir: PathBuf,
    /// Drop the chunk table before loading
    pub reset: bool,
    /// Draw a progress bar while embedding
    pub show_progress: bool,
}

/// Statistics from a load run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadStats {
    pub reset: bool,
    pub pages_loaded: usize,
    pub chunks_created: usize,
    pub chunks_inserted: usize,
    /// Rows in the table after the run
    pub total_rows: u64,
}

/// Load every PDF under `options.dir` into the store
pub async fn cmd_load(
    config: &Config,
    store: &dyn ChunkStore,
    embedder: &dyn Embedder,
    options: &LoadOptions,
) -> Result<LoadStats> {
    if options.reset {
        info!("Clearing database");
        store.reset().await?;
    }

    let pages = load_pdf_directory(&options.dir)?;
    let mut stats = ingest_pages(config, store, embedder, &pages, options.show_progress).await?;
    stats.reset = options.reset;
    Ok(stats)
}

/// Chunk, embed and store already-loaded pages
pub async fn ingest_pages(
    config: &Config,
    store: &dyn ChunkStore,
    embedder: &dyn Embedder,
    pages: &[PageDocument],
    show_progress: bool,
) -> Result<LoadStats> {
    let chunks = split_documents(pages, &config.chunk);
    info!("Split {} pages into {} chunks", pages.len(), chunks.len());

    store.ensure_schema().await?;

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let pb = embedding_progress_bar(texts.len() as u64, !show_progress);
    let embeddings = embed_in_batches(embedder, texts, config.embedding.batch_size, Some(&pb)).await;
    pb.finish_and_clear();
    let embeddings = embeddings?;
    validate_embeddings(
        &embeddings,
        chunks.len(),
        embedder.dimension(),
        embedder.model_name(),
    )?;

    let records = build_records(chunks, embeddings);
    let inserted = store.write(&records).await?;
    let total_rows = store.count().await?;

    Ok(LoadStats {
        reset: false,
        pages_loaded: pages.len(),
        chunks_created: records.len(),
        chunks_inserted: inserted,
        total_rows,
    })
}

/// Pair each chunk with its embedding, deriving the `<source>:<page>` id
pub fn build_records(chunks: Vec<TextChunk>, embeddings: Vec<Vec<f32>>) -> Vec<ChunkRecord> {
    chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| ChunkRecord {
            chunk_id: chunk.chunk_id(),
            content: chunk.text,
            embedding,
        })
        .collect()
}

/// Print load statistics to console
pub fn print_load_stats(stats: &LoadStats) {
    if stats.reset {
        println!("✨ Database cleared");
    }
    println!("\n✓ Load complete");
    println!("  Pages loaded: {}", stats.pages_loaded);
    println!("  Chunks created: {}", stats.chunks_created);
    println!("Inserted {} chunks into PostgreSQL.", stats.chunks_inserted);
    println!("  Total rows: {}", stats.total_rows);
}
