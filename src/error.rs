//! Error types for the reindexer library.
//!
//! Every failure surfaced by a reindex run is represented by the [`ReindexError`]
//! enum. Read and write failures carry the stage at which they happened so a
//! caller can tell whether the count probe, page N, a flush or the final commit
//! broke.
//!
//! # Examples
//!
//! ```
//! use reindexer::error::{ReindexError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(ReindexError::invalid_config("page size must be at least 1"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;
use std::io;

use thiserror::Error;

use crate::client::ClientError;

/// Point of a run at which a read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStage {
    /// The `rows = 0` count probe of the paginated strategy.
    Probe,
    /// A page request starting at `offset`.
    Page { offset: usize },
    /// Advancing the prefetch cursor past `position` documents.
    Cursor { position: usize },
    /// The single query of the whole-result strategy.
    Query,
}

impl fmt::Display for ReadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStage::Probe => write!(f, "count probe"),
            ReadStage::Page { offset } => write!(f, "page at offset {offset}"),
            ReadStage::Cursor { position } => write!(f, "cursor after {position} documents"),
            ReadStage::Query => write!(f, "query"),
        }
    }
}

/// Point of a run at which a write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Submitting the batch built from the page at `offset`.
    Page { offset: usize },
    /// An automatic buffer submission triggered by the document at `position`.
    Buffer { position: usize },
    /// The forced flush of a partial buffer.
    Flush,
    /// Submitting a whole-result batch.
    Submit,
    /// The final commit.
    Commit,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStage::Page { offset } => write!(f, "page at offset {offset}"),
            WriteStage::Buffer { position } => {
                write!(f, "buffer submission at document {position}")
            }
            WriteStage::Flush => write!(f, "flush"),
            WriteStage::Submit => write!(f, "batch submission"),
            WriteStage::Commit => write!(f, "commit"),
        }
    }
}

/// The main error type for reindex operations.
#[derive(Error, Debug)]
pub enum ReindexError {
    /// Page size below 1, a mandatory transform omitted, or an unusable config file.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The read side failed to execute a query or advance a cursor.
    #[error("Read failure during {stage}: {source}")]
    Read {
        stage: ReadStage,
        #[source]
        source: ClientError,
    },

    /// The write side failed to accumulate, flush, submit or commit.
    #[error("Write failure during {stage}: {source}")]
    Write {
        stage: WriteStage,
        #[source]
        source: ClientError,
    },

    /// The caller-supplied transform rejected a document.
    #[error("Transform failed on document {position}: {source}")]
    Transform {
        position: usize,
        #[source]
        source: anyhow::Error,
    },

    /// I/O errors (config files, JSONL files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with ReindexError.
pub type Result<T> = std::result::Result<T, ReindexError>;

impl ReindexError {
    /// Create a new invalid configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ReindexError::InvalidConfiguration(msg.into())
    }

    /// Wrap a collaborator failure on the read side.
    pub fn read(stage: ReadStage, source: ClientError) -> Self {
        ReindexError::Read { stage, source }
    }

    /// Wrap a collaborator failure on the write side.
    pub fn write(stage: WriteStage, source: ClientError) -> Self {
        ReindexError::Write { stage, source }
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ReindexError::Other(msg.into())
    }

    /// Whether this error came from the read side.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, ReindexError::Read { .. })
    }

    /// Whether this error came from the write side.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, ReindexError::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = ReindexError::invalid_config("page size must be at least 1");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: page size must be at least 1"
        );

        let error = ReindexError::other("boom");
        assert_eq!(error.to_string(), "Error: boom");
    }

    #[test]
    fn test_stage_is_reported() {
        let error = ReindexError::read(
            ReadStage::Page { offset: 400 },
            ClientError::Unavailable("node down".to_string()),
        );
        assert!(error.is_read_failure());
        assert_eq!(
            error.to_string(),
            "Read failure during page at offset 400: Endpoint unavailable: node down"
        );

        let error = ReindexError::write(
            WriteStage::Commit,
            ClientError::Rejected("read-only".to_string()),
        );
        assert!(error.is_write_failure());
        assert_eq!(
            error.to_string(),
            "Write failure during commit: Update rejected: read-only"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = ReindexError::from(io_error);

        match error {
            ReindexError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
