//! CLI commands implementation

pub mod check;
pub mod ingest;
pub mod init;
pub mod query;

pub use check::*;
pub use ingest::*;
pub use init::*;
pub use query::*;
