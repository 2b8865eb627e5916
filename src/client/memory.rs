//! In-memory search client for testing and local reindexing.
//!
//! Each endpoint holds a list of committed (searchable) documents and a list
//! of pending ones. Updates land in the pending list; a commit makes them
//! visible, replacing any committed document with the same unique key.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::client::traits::{
    ClientError, ClientResult, Endpoint, ResultSet, SearchClient, UpdateBatch,
};
use crate::document::converter::DocumentConverter;
use crate::document::converter::jsonl::{JsonlDocumentConverter, write_jsonl};
use crate::document::{FieldValue, SourceDocument, TargetDocument};
use crate::error::Result;
use crate::query::{MATCH_ALL, Query, SortClause, SortOrder};

/// Name of the endpoint created by [`MemoryClient::new`].
pub const DEFAULT_ENDPOINT: &str = "default";

/// Field used to detect replaced documents on commit.
pub const DEFAULT_UNIQUE_KEY: &str = "id";

/// A call recorded by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A select that returned `returned` of `num_found` matches.
    Select {
        endpoint: Endpoint,
        start: usize,
        rows: Option<usize>,
        returned: usize,
        num_found: usize,
    },
    /// An update carrying `documents` documents, committing if `commit`.
    Update {
        endpoint: Endpoint,
        documents: usize,
        commit: bool,
    },
}

#[derive(Debug, Default)]
struct Collection {
    committed: Vec<SourceDocument>,
    pending: Vec<TargetDocument>,
}

#[derive(Debug)]
struct State {
    default_endpoint: Endpoint,
    collections: HashMap<Endpoint, Collection>,
    journal: Vec<ClientEvent>,
    select_calls: usize,
    update_calls: usize,
    fail_select_at: Option<usize>,
    fail_update_at: Option<usize>,
}

/// An in-memory [`SearchClient`].
///
/// Clones share the same underlying state, so a test can hand one clone to
/// the reindexer and inspect another afterwards.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    state: Arc<Mutex<State>>,
}

impl MemoryClient {
    /// Create a client with a single endpoint named `default`.
    pub fn new() -> Self {
        Self::with_default_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client whose default endpoint has the given name.
    pub fn with_default_endpoint<E: Into<Endpoint>>(endpoint: E) -> Self {
        let endpoint = endpoint.into();
        let mut collections = HashMap::new();
        collections.insert(endpoint.clone(), Collection::default());

        MemoryClient {
            state: Arc::new(Mutex::new(State {
                default_endpoint: endpoint,
                collections,
                journal: Vec::new(),
                select_calls: 0,
                update_calls: 0,
                fail_select_at: None,
                fail_update_at: None,
            })),
        }
    }

    /// Register another endpoint. Registering an existing one is a no-op.
    pub fn add_endpoint<E: Into<Endpoint>>(&self, endpoint: E) -> &Self {
        self.state
            .lock()
            .collections
            .entry(endpoint.into())
            .or_default();
        self
    }

    pub fn default_endpoint(&self) -> Endpoint {
        self.state.lock().default_endpoint.clone()
    }

    /// Registered endpoints, sorted by name.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let state = self.state.lock();
        let mut endpoints: Vec<Endpoint> = state.collections.keys().cloned().collect();
        endpoints.sort();
        endpoints
    }

    /// Seed an endpoint with already committed documents, registering the
    /// endpoint if needed. Nothing is journaled.
    pub fn add_documents<I>(&self, endpoint: Option<&Endpoint>, documents: I)
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut state = self.state.lock();
        let endpoint = endpoint
            .cloned()
            .unwrap_or_else(|| state.default_endpoint.clone());
        state
            .collections
            .entry(endpoint)
            .or_default()
            .committed
            .extend(documents);
    }

    /// Documents visible to selects on an endpoint.
    pub fn committed_documents(&self, endpoint: Option<&Endpoint>) -> Vec<SourceDocument> {
        let state = self.state.lock();
        state
            .collection(endpoint)
            .map(|c| c.committed.clone())
            .unwrap_or_default()
    }

    /// Documents submitted to an endpoint but not yet committed.
    pub fn pending_documents(&self, endpoint: Option<&Endpoint>) -> Vec<TargetDocument> {
        let state = self.state.lock();
        state
            .collection(endpoint)
            .map(|c| c.pending.clone())
            .unwrap_or_default()
    }

    /// Number of committed documents on an endpoint.
    pub fn num_docs(&self, endpoint: Option<&Endpoint>) -> usize {
        let state = self.state.lock();
        state.collection(endpoint).map_or(0, |c| c.committed.len())
    }

    /// Every successful select and update, in call order.
    pub fn journal(&self) -> Vec<ClientEvent> {
        self.state.lock().journal.clone()
    }

    /// Make the `n`-th select from now on (1-based) fail.
    pub fn fail_select_at(&self, n: usize) {
        let mut state = self.state.lock();
        state.fail_select_at = Some(state.select_calls + n);
    }

    /// Make the `n`-th update from now on (1-based) fail.
    pub fn fail_update_at(&self, n: usize) {
        let mut state = self.state.lock();
        state.fail_update_at = Some(state.update_calls + n);
    }

    /// Load a JSONL file into an endpoint as committed documents.
    ///
    /// Returns the number of documents loaded. A malformed line aborts the
    /// load and leaves the endpoint untouched.
    pub fn load_jsonl<P: AsRef<Path>>(&self, endpoint: Option<&Endpoint>, path: P) -> Result<usize> {
        let documents = JsonlDocumentConverter::strict()
            .convert(path)?
            .collect::<Result<Vec<_>>>()?;
        let count = documents.len();
        self.add_documents(endpoint, documents);
        Ok(count)
    }

    /// Write the committed documents of an endpoint to a JSONL file.
    pub fn export_jsonl<P: AsRef<Path>>(
        &self,
        endpoint: Option<&Endpoint>,
        path: P,
    ) -> Result<usize> {
        let documents: Vec<TargetDocument> = self
            .committed_documents(endpoint)
            .into_iter()
            .map(TargetDocument::from)
            .collect();
        write_jsonl(path, &documents)
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn resolve(&self, endpoint: Option<&Endpoint>) -> Endpoint {
        endpoint
            .cloned()
            .unwrap_or_else(|| self.default_endpoint.clone())
    }

    fn collection(&self, endpoint: Option<&Endpoint>) -> Option<&Collection> {
        self.collections.get(&self.resolve(endpoint))
    }
}

impl Collection {
    fn commit(&mut self, unique_key: &str) {
        for doc in self.pending.drain(..) {
            let doc = SourceDocument::from_fields(doc.into_fields());
            let existing = doc.get_field(unique_key).and_then(|key| {
                self.committed
                    .iter()
                    .position(|d| d.get_field(unique_key) == Some(key))
            });
            match existing {
                Some(index) => self.committed[index] = doc,
                None => self.committed.push(doc),
            }
        }
    }
}

/// Parsed form of the query strings the memory client understands.
enum Matcher<'q> {
    All,
    Exists(&'q str),
    Term(&'q str, &'q str),
}

impl<'q> Matcher<'q> {
    fn parse(q: &'q str) -> ClientResult<Self> {
        let q = q.trim();
        if q.is_empty() || q == MATCH_ALL {
            return Ok(Matcher::All);
        }
        match q.split_once(':') {
            Some((field, "*")) if !field.is_empty() => Ok(Matcher::Exists(field)),
            Some((field, term)) if !field.is_empty() && !term.is_empty() => {
                Ok(Matcher::Term(field, term.trim_matches('"')))
            }
            _ => Err(ClientError::Query(format!("unsupported query syntax: {q}"))),
        }
    }

    fn matches(&self, doc: &SourceDocument) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Exists(field) => doc.has_field(field),
            Matcher::Term(field, term) => doc
                .get_field(field)
                .is_some_and(|value| value.matches_term(term)),
        }
    }
}

fn compare(a: &SourceDocument, b: &SourceDocument, sort: &[SortClause]) -> Ordering {
    for clause in sort {
        let left = a.get_field(&clause.field).unwrap_or(&FieldValue::Null);
        let right = b.get_field(&clause.field).unwrap_or(&FieldValue::Null);
        let ordering = match clause.order {
            SortOrder::Asc => left.sort_cmp(right),
            SortOrder::Desc => right.sort_cmp(left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl SearchClient for MemoryClient {
    fn select(&self, query: &Query, endpoint: Option<&Endpoint>) -> ClientResult<ResultSet> {
        let mut state = self.state.lock();
        state.select_calls += 1;
        if state.fail_select_at == Some(state.select_calls) {
            return Err(ClientError::Unavailable(format!(
                "select #{} failed",
                state.select_calls
            )));
        }

        let endpoint = state.resolve(endpoint);
        let collection = state
            .collections
            .get(&endpoint)
            .ok_or_else(|| ClientError::UnknownEndpoint(endpoint.to_string()))?;

        let matcher = Matcher::parse(query.query_str())?;
        let mut matches: Vec<&SourceDocument> = collection
            .committed
            .iter()
            .filter(|doc| matcher.matches(doc))
            .collect();
        if !query.sort().is_empty() {
            matches.sort_by(|a, b| compare(a, b, query.sort()));
        }

        let num_found = matches.len();
        let documents: Vec<SourceDocument> = matches
            .into_iter()
            .skip(query.start())
            .take(query.rows().unwrap_or(usize::MAX))
            .cloned()
            .collect();

        debug!("select on {endpoint} ({query}) returned {} of {num_found}", documents.len());

        state.journal.push(ClientEvent::Select {
            endpoint,
            start: query.start(),
            rows: query.rows(),
            returned: documents.len(),
            num_found,
        });
        Ok(ResultSet::new(num_found, documents))
    }

    fn update(&self, batch: UpdateBatch, endpoint: Option<&Endpoint>) -> ClientResult<()> {
        let mut state = self.state.lock();
        state.update_calls += 1;
        if state.fail_update_at == Some(state.update_calls) {
            return Err(ClientError::Unavailable(format!(
                "update #{} failed",
                state.update_calls
            )));
        }

        let endpoint = state.resolve(endpoint);
        let commit = batch.has_commit();
        let documents = batch.into_documents();
        let count = documents.len();

        let collection = state
            .collections
            .get_mut(&endpoint)
            .ok_or_else(|| ClientError::UnknownEndpoint(endpoint.to_string()))?;
        collection.pending.extend(documents);
        if commit {
            collection.commit(DEFAULT_UNIQUE_KEY);
        }

        state.journal.push(ClientEvent::Update {
            endpoint,
            documents: count,
            commit,
        });
        Ok(())
    }
}
