//! # Reindexer
//!
//! A buffered reindex pipeline for search indexes: select the documents
//! matching a query, transform each one, and write the results back in
//! batches with a single optional commit at the end.
//!
//! ## Features
//!
//! - Three strategies: streamed-buffered, paginated-buffered and whole-result
//! - Pluggable search client behind the [`client::SearchClient`] trait
//! - In-memory client with a JSONL loader for testing and the CLI
//! - Declarative field mapping or closure transforms
//! - Per-run endpoint and commit overrides

pub mod cli;
pub mod client;
pub mod document;
pub mod error;
pub mod query;
pub mod reindex;

pub mod prelude {
    pub use crate::client::{Endpoint, MemoryClient, ResultSet, SearchClient, UpdateBatch};
    pub use crate::document::{FieldValue, SourceDocument, TargetDocument};
    pub use crate::error::{ReindexError, Result};
    pub use crate::query::{Query, SortOrder};
    pub use crate::reindex::{
        FieldCopy, FieldMapper, ReindexConfig, ReindexReport, Reindexer, RunOptions, Strategy,
        Transform,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
