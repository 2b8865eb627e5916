//! The reindex orchestrator.
//!
//! A [`Reindexer`] streams documents matching a query out of the read
//! endpoint, hands each one to a [`Transform`] and writes the results to the
//! write endpoint, committing at most once per run. Three strategies trade
//! memory against round trips:
//!
//! - [`Reindexer::run_streamed_buffered`]: prefetching cursor plus
//!   auto-flushing write buffer. Transform optional.
//! - [`Reindexer::run_paginated_buffered`]: count probe, then one read and one
//!   write per page.
//! - [`Reindexer::run_whole_result`]: a single read and a single write.
//!
//! Every run is sequential and blocking. A failure aborts the run at once;
//! whatever was submitted or committed before it stays applied.

use std::time::Instant;

use log::{debug, info, warn};

use crate::client::{Endpoint, SearchClient};
use crate::document::{SourceDocument, TargetDocument};
use crate::error::{ReadStage, ReindexError, Result, WriteStage};
use crate::query::Query;
use crate::reindex::config::{ReindexConfig, RunOptions, RunSettings};
use crate::reindex::strategy::{ReindexReport, Strategy};
use crate::reindex::transform::{FieldCopy, Transform};

/// Reindexes documents through a [`SearchClient`].
#[derive(Debug, Clone)]
pub struct Reindexer<C: SearchClient> {
    client: C,
    config: ReindexConfig,
}

impl<C: SearchClient> Reindexer<C> {
    /// Create a reindexer with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, ReindexConfig::default())
    }

    /// Create a reindexer with the given configuration.
    pub fn with_config(client: C, config: ReindexConfig) -> Self {
        Reindexer { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn set_client(&mut self, client: C) -> &mut Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &ReindexConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReindexConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Set the page size. Validated when a run starts, not here.
    pub fn set_page_size(&mut self, page_size: usize) -> &mut Self {
        self.config.page_size = page_size;
        self
    }

    pub fn commit(&self) -> bool {
        self.config.commit
    }

    pub fn set_commit(&mut self, commit: bool) -> &mut Self {
        self.config.commit = commit;
        self
    }

    pub fn read_target(&self) -> Option<&Endpoint> {
        self.config.read_endpoint.as_ref()
    }

    pub fn set_read_target(&mut self, endpoint: Option<Endpoint>) -> &mut Self {
        self.config.read_endpoint = endpoint;
        self
    }

    pub fn write_target(&self) -> Option<&Endpoint> {
        self.config.write_endpoint.as_ref()
    }

    pub fn set_write_target(&mut self, endpoint: Option<Endpoint>) -> &mut Self {
        self.config.write_endpoint = endpoint;
        self
    }

    /// Run the given strategy.
    pub fn run(
        &self,
        strategy: Strategy,
        query: &Query,
        transform: Option<&dyn Transform>,
        options: &RunOptions,
    ) -> Result<ReindexReport> {
        match strategy {
            Strategy::StreamedBuffered => self.run_streamed_buffered(query, transform, options),
            Strategy::PaginatedBuffered => self.run_paginated_buffered(query, transform, options),
            Strategy::WholeResult => self.run_whole_result(query, transform, options),
        }
    }

    /// Stream the results through a prefetching cursor into an auto-flushing
    /// write buffer, both sized to the page size.
    ///
    /// Without a transform, documents are copied field by field. When
    /// committing, the commit is issued even if nothing was read, unlike the
    /// other two strategies.
    pub fn run_streamed_buffered(
        &self,
        query: &Query,
        transform: Option<&dyn Transform>,
        options: &RunOptions,
    ) -> Result<ReindexReport> {
        let settings = RunSettings::resolve(&self.config, options)?;
        let transform = transform.unwrap_or(&FieldCopy);
        let started = Instant::now();
        let mut report = ReindexReport::new(Strategy::StreamedBuffered);
        log_start(&report, &settings, query);

        let read = settings.read_endpoint.as_ref();
        let write = settings.write_endpoint.as_ref();

        let cursor = self
            .client
            .prefetch(query, read, settings.page_size)
            .map_err(|e| ReindexError::read(ReadStage::Cursor { position: 0 }, e))?;
        let mut buffer = self
            .client
            .buffered_add(write, settings.page_size)
            .map_err(|e| ReindexError::write(WriteStage::Buffer { position: 0 }, e))?;

        for item in cursor {
            let position = report.documents_read;
            let source = item.map_err(|e| ReindexError::read(ReadStage::Cursor { position }, e))?;
            report.documents_read += 1;

            let target = apply(transform, source, report.documents_read)?;
            buffer.add_document(target).map_err(|e| {
                ReindexError::write(
                    WriteStage::Buffer {
                        position: report.documents_read,
                    },
                    e,
                )
            })?;
        }

        buffer
            .flush()
            .map_err(|e| ReindexError::write(WriteStage::Flush, e))?;
        report.documents_written = report.documents_read;
        report.submissions = buffer.submissions();
        report.pages = report.documents_read.div_ceil(settings.page_size);

        if settings.commit {
            buffer
                .commit()
                .map_err(|e| ReindexError::write(WriteStage::Commit, e))?;
            report.committed = true;
        }

        Ok(finish(report, started))
    }

    /// Probe the total count, then read and write one page at a time.
    ///
    /// Each page becomes its own write batch, so at most one page of
    /// documents is held in memory and no batch exceeds the page size. A
    /// transform is required.
    pub fn run_paginated_buffered(
        &self,
        query: &Query,
        transform: Option<&dyn Transform>,
        options: &RunOptions,
    ) -> Result<ReindexReport> {
        let transform = required(transform, Strategy::PaginatedBuffered)?;
        let settings = RunSettings::resolve(&self.config, options)?;
        let started = Instant::now();
        let mut report = ReindexReport::new(Strategy::PaginatedBuffered);
        log_start(&report, &settings, query);

        let read = settings.read_endpoint.as_ref();
        let write = settings.write_endpoint.as_ref();

        let total = self
            .client
            .select(&query.page(0, 0), read)
            .map_err(|e| ReindexError::read(ReadStage::Probe, e))?
            .num_found();
        report.num_found = Some(total);
        debug!("run {}: probe found {total} documents", report.run_id);

        let mut offset = 0;
        while offset < total {
            let page = self
                .client
                .select(&query.page(offset, settings.page_size), read)
                .map_err(|e| ReindexError::read(ReadStage::Page { offset }, e))?;
            report.pages += 1;

            if page.is_empty() {
                warn!(
                    "run {}: page at offset {offset} is empty but {total} documents were found, \
                     stopping early",
                    report.run_id
                );
                break;
            }

            let mut batch = self.client.create_update();
            for source in page {
                report.documents_read += 1;
                batch.add_document(apply(transform, source, report.documents_read)?);
            }

            let count = batch.len();
            self.client
                .update(batch, write)
                .map_err(|e| ReindexError::write(WriteStage::Page { offset }, e))?;
            report.submissions += 1;
            report.documents_written += count;
            debug!("run {}: wrote {count} documents from offset {offset}", report.run_id);

            offset += settings.page_size;
        }

        if settings.commit && report.documents_read > 0 {
            let mut commit = self.client.create_update();
            commit.add_commit();
            self.client
                .update(commit, write)
                .map_err(|e| ReindexError::write(WriteStage::Commit, e))?;
            report.committed = true;
        }

        Ok(finish(report, started))
    }

    /// Read the whole result set with one query and write it as one batch,
    /// the commit riding along in the same batch when there is anything to
    /// commit. Memory grows with the result size. A transform is required.
    pub fn run_whole_result(
        &self,
        query: &Query,
        transform: Option<&dyn Transform>,
        options: &RunOptions,
    ) -> Result<ReindexReport> {
        let transform = required(transform, Strategy::WholeResult)?;
        let settings = RunSettings::resolve(&self.config, options)?;
        let started = Instant::now();
        let mut report = ReindexReport::new(Strategy::WholeResult);
        log_start(&report, &settings, query);

        let result = self
            .client
            .select(query, settings.read_endpoint.as_ref())
            .map_err(|e| ReindexError::read(ReadStage::Query, e))?;
        report.num_found = Some(result.num_found());
        report.pages = 1;

        let mut batch = self.client.create_update();
        for source in result {
            report.documents_read += 1;
            batch.add_document(apply(transform, source, report.documents_read)?);
        }

        let commit = settings.commit && report.documents_read > 0;
        if commit {
            batch.add_commit();
        }

        let count = batch.len();
        self.client
            .update(batch, settings.write_endpoint.as_ref())
            .map_err(|e| ReindexError::write(WriteStage::Submit, e))?;
        report.submissions = 1;
        report.documents_written = count;
        report.committed = commit;

        Ok(finish(report, started))
    }
}

fn required<'t>(
    transform: Option<&'t dyn Transform>,
    strategy: Strategy,
) -> Result<&'t dyn Transform> {
    transform.ok_or_else(|| {
        ReindexError::invalid_config(format!("the {strategy} strategy requires a transform"))
    })
}

fn apply(
    transform: &dyn Transform,
    source: SourceDocument,
    position: usize,
) -> Result<TargetDocument> {
    transform
        .transform(source)
        .map_err(|source| ReindexError::Transform { position, source })
}

fn log_start(report: &ReindexReport, settings: &RunSettings, query: &Query) {
    info!(
        "run {}: {} reindex of [{query}] from {} to {} (page size {}, commit {})",
        report.run_id,
        report.strategy,
        endpoint_name(settings.read_endpoint.as_ref()),
        endpoint_name(settings.write_endpoint.as_ref()),
        settings.page_size,
        settings.commit
    );
}

fn endpoint_name(endpoint: Option<&Endpoint>) -> &str {
    endpoint.map_or("<default>", Endpoint::as_str)
}

fn finish(mut report: ReindexReport, started: Instant) -> ReindexReport {
    report.elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        "run {}: read {} and wrote {} documents in {} submissions ({} ms, committed: {})",
        report.run_id,
        report.documents_read,
        report.documents_written,
        report.submissions,
        report.elapsed_ms,
        report.committed
    );
    report
}
