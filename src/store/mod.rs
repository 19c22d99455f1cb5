//! PostgreSQL + pgvector chunk storage
//!
//! This module owns the single chunk table and provides:
//! - Idempotent schema creation (extension + table)
//! - Transactional batched inserts
//! - Full reset (drop table)
//! - Nearest-neighbour search delegated to the `<->` operator

#[cfg(test)]
pub mod memory;

use crate::config::{is_valid_table_name, Config, DatabaseConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, info};

/// Rows per INSERT statement; keeps bind parameters well under Postgres' 65535
const INSERT_ROWS_PER_STATEMENT: usize = 1000;

/// A chunk ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A chunk returned by a nearest-neighbour query
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub content: String,
    pub distance: f64,
}

/// Storage operations used by the ingestion and query pipelines
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Create the vector extension and chunk table if absent
    async fn ensure_schema(&self) -> Result<()>;

    /// Drop the chunk table and everything in it
    async fn reset(&self) -> Result<()>;

    /// Insert all records in one transaction, returning the number written
    async fn write(&self, records: &[ChunkRecord]) -> Result<usize>;

    /// The `top_n` chunks closest to `query_vector`, nearest first
    async fn search(&self, query_vector: &[f32], top_n: usize) -> Result<Vec<RetrievedChunk>>;

    /// Number of stored chunks
    async fn count(&self) -> Result<u64>;
}

/// pgvector-backed store handle
pub struct PgVectorStore {
    pool: PgPool,
    table: String,
    dimension: usize,
}

impl PgVectorStore {
    /// Connect using the database, table and embedding settings in `config`
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = connect_pool(&config.database).await?;
        Self::with_pool(pool, &config.table_name, config.embedding.dimension)
    }

    /// Wrap an existing pool
    pub fn with_pool(pool: PgPool, table: &str, dimension: usize) -> Result<Self> {
        if !is_valid_table_name(table) {
            return Err(Error::Config(format!("Invalid table name: {}", table)));
        }
        if dimension == 0 {
            return Err(Error::Config("Vector dimension must be positive".to_string()));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
            dimension,
        })
    }

    /// Close the underlying connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Open a single-connection pool; each run uses one connection
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    debug!("Connecting to PostgreSQL at {}", config.display_target());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(config.connect_options())
        .await?;

    Ok(pool)
}

#[async_trait]
impl ChunkStore for PgVectorStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id SERIAL PRIMARY KEY,
                chunk_id TEXT,
                content TEXT,
                embedding VECTOR({})
            )",
            self.table, self.dimension
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        debug!("Schema ready for {} (dimension {})", self.table, self.dimension);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        info!("Dropping table {}", self.table);
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn write(&self, records: &[ChunkRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for batch in records.chunks(INSERT_ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (chunk_id, content, embedding) ",
                self.table
            ));
            builder.push_values(batch, |mut row, record| {
                row.push_bind(&record.chunk_id)
                    .push_bind(&record.content)
                    .push_bind(Vector::from(record.embedding.clone()));
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!("Inserted {} chunks into {}", records.len(), self.table);
        Ok(records.len())
    }

    async fn search(&self, query_vector: &[f32], top_n: usize) -> Result<Vec<RetrievedChunk>> {
        let sql = format!(
            "SELECT chunk_id, content, embedding <-> $1 AS distance
             FROM {}
             ORDER BY distance ASC
             LIMIT $2",
            self.table
        );

        let rows = sqlx::query_as::<_, RetrievedChunk>(&sql)
            .bind(Vector::from(query_vector.to_vec()))
            .bind(top_n as i64)
            .fetch_all(&self.pool)
            .await?;

        debug!("Retrieved {} chunks from {}", rows.len(), self.table);
        Ok(rows)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
