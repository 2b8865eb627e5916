//! Prefetching read cursor.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use log::debug;

use crate::client::traits::{ClientResult, Endpoint, SearchClient};
use crate::document::SourceDocument;
use crate::query::Query;

/// A lazy, single-pass cursor over the results of a query.
///
/// Documents are fetched `prefetch` at a time by re-issuing the query with an
/// advancing `start`. Iteration ends once `num_found` documents have been
/// read or the backend returns an empty page. After an error the cursor
/// yields nothing more.
#[derive(Debug)]
pub struct PrefetchCursor<'a, C: SearchClient + ?Sized> {
    client: &'a C,
    query: Query,
    endpoint: Option<Endpoint>,
    prefetch: usize,
    /// Offset of the next page to fetch.
    position: usize,
    /// Total match count reported by the first page.
    num_found: Option<usize>,
    buffer: VecDeque<SourceDocument>,
    pages: usize,
    done: bool,
}

impl<'a, C: SearchClient + ?Sized> PrefetchCursor<'a, C> {
    /// Create a cursor. Nothing is fetched until the first call to `next`.
    pub fn new(client: &'a C, query: Query, endpoint: Option<Endpoint>, prefetch: usize) -> Self {
        let position = query.start();
        PrefetchCursor {
            client,
            query,
            endpoint,
            prefetch: prefetch.max(1),
            position,
            num_found: None,
            buffer: VecDeque::new(),
            pages: 0,
            done: false,
        }
    }

    /// Number of pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Total match count, known after the first page has been fetched.
    pub fn num_found(&self) -> Option<usize> {
        self.num_found
    }

    fn fetch_page(&mut self) -> ClientResult<()> {
        let page = self.query.page(self.position, self.prefetch);
        let result = self.client.select(&page, self.endpoint.as_ref())?;
        self.pages += 1;

        debug!(
            "prefetched {} documents at offset {} (num_found={})",
            result.len(),
            self.position,
            result.num_found()
        );

        self.num_found = Some(result.num_found());
        if result.len() < self.prefetch {
            self.done = true;
        }
        self.position += result.len();
        self.buffer.extend(result);
        Ok(())
    }
}

impl<C: SearchClient + ?Sized> Iterator for PrefetchCursor<'_, C> {
    type Item = ClientResult<SourceDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(doc) = self.buffer.pop_front() {
            return Some(Ok(doc));
        }
        if self.done {
            return None;
        }
        if let Some(total) = self.num_found
            && self.position >= total
        {
            self.done = true;
            return None;
        }

        if let Err(e) = self.fetch_page() {
            self.done = true;
            self.buffer.clear();
            return Some(Err(e));
        }

        match self.buffer.pop_front() {
            Some(doc) => Some(Ok(doc)),
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<C: SearchClient + ?Sized> FusedIterator for PrefetchCursor<'_, C> {}
