//! Document converters for loading documents from files.
//!
//! This module provides the [`DocumentConverter`] trait and the JSONL
//! implementation used to seed and dump endpoints of the in-memory client.

use std::path::Path;

use crate::document::document::SourceDocument;
use crate::error::Result;

pub mod jsonl;

/// A trait for converting a file format into an iterator of documents.
///
/// # Example
///
/// ```no_run
/// use reindexer::document::converter::DocumentConverter;
/// use reindexer::document::converter::jsonl::JsonlDocumentConverter;
///
/// let converter = JsonlDocumentConverter::new();
/// for doc in converter.convert("documents.jsonl").unwrap() {
///     let doc = doc.unwrap();
///     println!("JSONL Document: {:?}", doc);
/// }
/// ```
pub trait DocumentConverter {
    /// The iterator type that yields documents.
    type Iter: Iterator<Item = Result<SourceDocument>>;

    /// Convert a file into an iterator of documents.
    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter>;
}
