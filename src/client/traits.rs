//! Search client abstraction and common types.
//!
//! The reindex pipeline talks to a search backend only through the narrow
//! [`SearchClient`] trait defined here: execute a select, submit an update
//! batch, and the two conveniences built on top of them (a prefetching read
//! cursor and an auto-flushing write buffer).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::buffered::BufferedWriter;
use crate::client::cursor::PrefetchCursor;
use crate::document::{SourceDocument, TargetDocument};
use crate::query::Query;

/// Result type alias for collaborator calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// A named backend connection target (host or alias).
///
/// Where an API takes `Option<&Endpoint>`, `None` means the client's default
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Endpoint(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Endpoint(name.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(name: String) -> Self {
        Endpoint(name)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The documents returned by a select, along with the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    num_found: usize,
    documents: Vec<SourceDocument>,
}

impl ResultSet {
    pub fn new(num_found: usize, documents: Vec<SourceDocument>) -> Self {
        ResultSet {
            num_found,
            documents,
        }
    }

    /// Total number of documents matching the query, regardless of the
    /// requested window.
    pub fn num_found(&self) -> usize {
        self.num_found
    }

    /// Number of documents actually returned.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<SourceDocument> {
        self.documents
    }
}

impl IntoIterator for ResultSet {
    type Item = SourceDocument;
    type IntoIter = std::vec::IntoIter<SourceDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// An update request: documents to add, optionally followed by a commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBatch {
    documents: Vec<TargetDocument>,
    commit: bool,
}

impl UpdateBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch holding the given documents.
    pub fn from_documents(documents: Vec<TargetDocument>) -> Self {
        UpdateBatch {
            documents,
            commit: false,
        }
    }

    /// Create a batch that only commits.
    pub fn commit_only() -> Self {
        UpdateBatch {
            documents: Vec::new(),
            commit: true,
        }
    }

    pub fn add_document(&mut self, document: TargetDocument) -> &mut Self {
        self.documents.push(document);
        self
    }

    /// Append a commit instruction, applied after the documents.
    pub fn add_commit(&mut self) -> &mut Self {
        self.commit = true;
        self
    }

    pub fn has_commit(&self) -> bool {
        self.commit
    }

    pub fn documents(&self) -> &[TargetDocument] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<TargetDocument> {
        self.documents
    }

    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when the batch carries neither documents nor a commit.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && !self.commit
    }
}

/// An accumulating client-side batch that submits itself once full.
pub trait WriteBuffer {
    /// Add a document, submitting the buffer if it reaches capacity.
    fn add_document(&mut self, document: TargetDocument) -> ClientResult<()>;

    /// Submit whatever is buffered. Returns the number of documents submitted;
    /// an empty buffer submits nothing.
    fn flush(&mut self) -> ClientResult<usize>;

    /// Flush, then submit a commit. Returns the number of documents flushed.
    fn commit(&mut self) -> ClientResult<usize>;

    /// Number of documents currently buffered.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of document batches submitted so far.
    fn submissions(&self) -> usize;
}

/// A lazy, forward-only sequence of documents read from an endpoint.
pub type DocumentCursor<'a> = Box<dyn Iterator<Item = ClientResult<SourceDocument>> + 'a>;

/// The read/write surface of a search backend.
pub trait SearchClient: fmt::Debug {
    /// Execute a select query against an endpoint.
    fn select(&self, query: &Query, endpoint: Option<&Endpoint>) -> ClientResult<ResultSet>;

    /// Submit an update batch to an endpoint.
    fn update(&self, batch: UpdateBatch, endpoint: Option<&Endpoint>) -> ClientResult<()>;

    /// Create an empty update batch.
    fn create_update(&self) -> UpdateBatch {
        UpdateBatch::new()
    }

    /// Open a prefetching cursor that pages through `query` `prefetch`
    /// documents at a time.
    fn prefetch<'a>(
        &'a self,
        query: &Query,
        endpoint: Option<&Endpoint>,
        prefetch: usize,
    ) -> ClientResult<DocumentCursor<'a>> {
        Ok(Box::new(PrefetchCursor::new(
            self,
            query.clone(),
            endpoint.cloned(),
            prefetch,
        )))
    }

    /// Open a write buffer that submits every `capacity` documents.
    fn buffered_add<'a>(
        &'a self,
        endpoint: Option<&Endpoint>,
        capacity: usize,
    ) -> ClientResult<Box<dyn WriteBuffer + 'a>> {
        Ok(Box::new(BufferedWriter::new(self, endpoint.cloned(), capacity)))
    }
}

/// Error types reported by a search client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The endpoint is not known to the client.
    UnknownEndpoint(String),

    /// The backend could not execute the query.
    Query(String),

    /// The backend refused an update.
    Rejected(String),

    /// The backend could not be reached.
    Unavailable(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::UnknownEndpoint(name) => write!(f, "Unknown endpoint: {name}"),
            ClientError::Query(msg) => write!(f, "Query failed: {msg}"),
            ClientError::Rejected(msg) => write!(f, "Update rejected: {msg}"),
            ClientError::Unavailable(msg) => write!(f, "Endpoint unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_batch() {
        let mut batch = UpdateBatch::new();
        assert!(batch.is_empty());

        batch
            .add_document(TargetDocument::builder().add_text("id", "1").build())
            .add_commit();
        assert_eq!(batch.len(), 1);
        assert!(batch.has_commit());

        let commit = UpdateBatch::commit_only();
        assert_eq!(commit.len(), 0);
        assert!(!commit.is_empty());
    }

    #[test]
    fn test_result_set() {
        let docs = vec![
            SourceDocument::builder().add_text("id", "1").build_source(),
            SourceDocument::builder().add_text("id", "2").build_source(),
        ];
        let result = ResultSet::new(10, docs);

        assert_eq!(result.num_found(), 10);
        assert_eq!(result.len(), 2);
        assert_eq!(result.into_iter().count(), 2);
    }

    #[test]
    fn test_client_error_display() {
        let err = ClientError::UnknownEndpoint("replica".to_string());
        assert_eq!(err.to_string(), "Unknown endpoint: replica");

        let err = ClientError::Query("bad syntax".to_string());
        assert_eq!(err.to_string(), "Query failed: bad syntax");

        let err = ClientError::Unavailable("timeout".to_string());
        assert_eq!(err.to_string(), "Endpoint unavailable: timeout");
    }

    #[test]
    fn test_endpoint_conversions() {
        let endpoint = Endpoint::from("source");
        assert_eq!(endpoint.as_str(), "source");
        assert_eq!(endpoint, Endpoint::new("source".to_string()));
        assert_eq!(endpoint.to_string(), "source");
    }
}
