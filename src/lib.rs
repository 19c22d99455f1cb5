//! pgrag: retrieval-augmented generation over PDFs with PostgreSQL + pgvector
//!
//! Ingestion: [`loader`] → [`chunk`] → [`embed`] → [`store`].
//! Query: [`embed`] → [`store`] → [`prompt`] → [`completion`].

pub mod api_backend;
pub mod chunk;
pub mod commands;
pub mod completion;
pub mod config;
pub mod embed;
pub mod error;
pub mod loader;
pub mod progress;
pub mod prompt;
pub mod store;
