//! Buffered reindex pipeline.
//!
//! Reads documents matching a query page by page, transforms each one and
//! writes the results back in batches, with a single optional commit at the
//! end of the run.
//!
//! # Example
//!
//! ```
//! use reindexer::client::{MemoryClient, SearchClient};
//! use reindexer::document::SourceDocument;
//! use reindexer::query::Query;
//! use reindexer::reindex::{ReindexConfig, Reindexer, RunOptions};
//!
//! let client = MemoryClient::new();
//! client.add_endpoint("target");
//! client.add_documents(
//!     None,
//!     (0..5).map(|i| SourceDocument::builder().add_integer("id", i).build_source()),
//! );
//!
//! let reindexer = Reindexer::with_config(
//!     client.clone(),
//!     ReindexConfig::default().with_page_size(2).with_write_endpoint("target"),
//! );
//! let report = reindexer
//!     .run_streamed_buffered(&Query::match_all(), None, &RunOptions::new())
//!     .unwrap();
//!
//! assert_eq!(report.documents_written, 5);
//! assert_eq!(client.num_docs(Some(&"target".into())), 5);
//! ```

pub mod config;
pub mod reindexer;
pub mod strategy;
pub mod transform;

// Re-export commonly used types
pub use config::{DEFAULT_PAGE_SIZE, ReindexConfig, RunOptions};
pub use reindexer::Reindexer;
pub use strategy::{ReindexReport, Strategy};
pub use transform::{FieldCopy, FieldMapper, Transform};
