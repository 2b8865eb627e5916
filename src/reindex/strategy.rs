//! Reindex strategies and per-run reports.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReindexError;

/// How a run reads from the source and writes to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Prefetching cursor on read, auto-flushing buffer on write.
    #[value(name = "streamed")]
    StreamedBuffered,
    /// Offset/limit pages on read, one write batch per page.
    #[value(name = "paginated")]
    PaginatedBuffered,
    /// One query, one batch. Only for small result sets.
    #[value(name = "whole")]
    WholeResult,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::StreamedBuffered => "streamed",
            Strategy::PaginatedBuffered => "paginated",
            Strategy::WholeResult => "whole",
        }
    }

    /// Whether this strategy works without a transform.
    pub fn transform_optional(&self) -> bool {
        matches!(self, Strategy::StreamedBuffered)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ReindexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "streamed" | "streamed-buffered" => Ok(Strategy::StreamedBuffered),
            "paginated" | "paginated-buffered" => Ok(Strategy::PaginatedBuffered),
            "whole" | "whole-result" => Ok(Strategy::WholeResult),
            other => Err(ReindexError::invalid_config(format!(
                "unknown strategy '{other}'"
            ))),
        }
    }
}

/// Statistics of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Identifier of the run, also used in log lines.
    pub run_id: Uuid,
    pub strategy: Strategy,
    /// Total matches reported by the read side. The streamed strategy never
    /// asks for it.
    pub num_found: Option<usize>,
    pub documents_read: usize,
    pub documents_written: usize,
    /// Write submissions carrying documents. Commit-only batches are not counted.
    pub submissions: usize,
    /// Pages of results read, the count probe excluded. The streamed
    /// strategy derives it from the documents read and the page size.
    pub pages: usize,
    /// Whether a commit was issued.
    pub committed: bool,
    pub elapsed_ms: u64,
}

impl ReindexReport {
    pub(crate) fn new(strategy: Strategy) -> Self {
        ReindexReport {
            run_id: Uuid::new_v4(),
            strategy,
            num_found: None,
            documents_read: 0,
            documents_written: 0,
            submissions: 0,
            pages: 0,
            committed: false,
            elapsed_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("streamed".parse::<Strategy>().unwrap(), Strategy::StreamedBuffered);
        assert_eq!(
            "Paginated-Buffered".parse::<Strategy>().unwrap(),
            Strategy::PaginatedBuffered
        );
        assert_eq!("whole".parse::<Strategy>().unwrap(), Strategy::WholeResult);
        assert!("parallel".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_display_round_trip() {
        for strategy in [
            Strategy::StreamedBuffered,
            Strategy::PaginatedBuffered,
            Strategy::WholeResult,
        ] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert!(Strategy::StreamedBuffered.transform_optional());
        assert!(!Strategy::WholeResult.transform_optional());
    }

    #[test]
    fn test_new_report_is_empty() {
        let report = ReindexReport::new(Strategy::WholeResult);
        assert_eq!(report.documents_read, 0);
        assert!(!report.committed);
        assert!(report.num_found.is_none());
    }
}
