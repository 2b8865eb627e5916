//! Select query handed to the read side.
//!
//! The pipeline treats a [`Query`] as opaque: it only ever overrides `start`
//! and `rows` to page through the results. What the query string means is
//! up to the [`SearchClient`](crate::client::SearchClient) executing it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The match-all query string.
pub const MATCH_ALL: &str = "*:*";

/// Sort direction for a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A single `field asc|desc` sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

/// A select query: query string, sort clauses and the pagination window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Query string, e.g. `*:*` or `category:books`.
    q: String,
    /// Sort clauses, applied in order.
    #[serde(default)]
    sort: Vec<SortClause>,
    /// Offset of the first row to return.
    #[serde(default)]
    start: usize,
    /// Maximum number of rows to return. `None` returns every match.
    #[serde(default)]
    rows: Option<usize>,
}

impl Query {
    /// Create a query for the given query string.
    pub fn new<S: Into<String>>(q: S) -> Self {
        Query {
            q: q.into(),
            sort: Vec::new(),
            start: 0,
            rows: None,
        }
    }

    /// Create a query matching every document.
    pub fn match_all() -> Self {
        Self::new(MATCH_ALL)
    }

    /// Add a sort clause.
    pub fn with_sort<S: Into<String>>(mut self, field: S, order: SortOrder) -> Self {
        self.sort.push(SortClause {
            field: field.into(),
            order,
        });
        self
    }

    /// Set the start offset.
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Set the row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn query_str(&self) -> &str {
        &self.q
    }

    pub fn sort(&self) -> &[SortClause] {
        &self.sort
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn rows(&self) -> Option<usize> {
        self.rows
    }

    pub fn set_start(&mut self, start: usize) -> &mut Self {
        self.start = start;
        self
    }

    pub fn set_rows(&mut self, rows: usize) -> &mut Self {
        self.rows = Some(rows);
        self
    }

    /// Copy of this query restricted to the window `[start, start + rows)`.
    pub fn page(&self, start: usize, rows: usize) -> Query {
        let mut page = self.clone();
        page.set_start(start).set_rows(rows);
        page
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::match_all()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q={} start={}", self.q, self.start)?;
        if let Some(rows) = self.rows {
            write!(f, " rows={rows}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_leaves_original_untouched() {
        let query = Query::new("category:books").with_sort("id", SortOrder::Asc);
        let page = query.page(400, 200);

        assert_eq!(page.start(), 400);
        assert_eq!(page.rows(), Some(200));
        assert_eq!(page.query_str(), "category:books");
        assert_eq!(page.sort(), query.sort());
        assert_eq!(query.start(), 0);
        assert_eq!(query.rows(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Query::match_all().to_string(), "q=*:* start=0");
        assert_eq!(
            Query::match_all().with_rows(0).to_string(),
            "q=*:* start=0 rows=0"
        );
    }
}
