//! In-memory [`ChunkStore`] used by pipeline tests

use super::{ChunkRecord, ChunkStore, RetrievedChunk};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mirrors the Postgres table: `None` means the table does not exist
pub struct MemoryStore {
    dimension: usize,
    rows: Mutex<Option<Vec<ChunkRecord>>>,
}

impl MemoryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: Mutex::new(None),
        }
    }

    pub fn has_table(&self) -> bool {
        self.rows.lock().unwrap().is_some()
    }

    pub fn rows(&self) -> Vec<ChunkRecord> {
        self.rows.lock().unwrap().clone().unwrap_or_default()
    }
}

fn missing_table() -> Error {
    Error::Other("relation \"document_chunks\" does not exist".to_string())
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.is_none() {
            *rows = Some(Vec::new());
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.rows.lock().unwrap() = None;
        Ok(())
    }

    async fn write(&self, records: &[ChunkRecord]) -> Result<usize> {
        let mut guard = self.rows.lock().unwrap();
        let rows = guard.as_mut().ok_or_else(missing_table)?;

        if let Some(bad) = records.iter().find(|r| r.embedding.len() != self.dimension) {
            return Err(Error::Other(format!(
                "expected {} dimensions, not {}",
                self.dimension,
                bad.embedding.len()
            )));
        }

        rows.extend_from_slice(records);
        Ok(records.len())
    }

    async fn search(&self, query_vector: &[f32], top_n: usize) -> Result<Vec<RetrievedChunk>> {
        let guard = self.rows.lock().unwrap();
        let rows = guard.as_ref().ok_or_else(missing_table)?;

        let mut scored: Vec<RetrievedChunk> = rows
            .iter()
            .map(|r| RetrievedChunk {
                chunk_id: r.chunk_id.clone(),
                content: r.content.clone(),
                distance: euclidean(&r.embedding, query_vector),
            })
            .collect();
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_n);
        Ok(scored)
    }

    async fn count(&self) -> Result<u64> {
        let guard = self.rows.lock().unwrap();
        let rows = guard.as_ref().ok_or_else(missing_table)?;
        Ok(rows.len() as u64)
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x as f64) - (*y as f64);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
