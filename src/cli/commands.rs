//! Command implementations for the reindexer CLI.
//!
//! Both commands run against a [`MemoryClient`]: the source file is loaded
//! into the `source` endpoint, documents are reindexed into the `target`
//! endpoint, and the committed target documents are written out.

use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::client::{Endpoint, MemoryClient, SearchClient};
use crate::document::FieldValue;
use crate::error::{ReadStage, ReindexError, Result};
use crate::query::{Query, SortOrder};
use crate::reindex::{FieldMapper, ReindexConfig, Reindexer, RunOptions, Transform};

/// Endpoint the source file is loaded into.
pub const SOURCE_ENDPOINT: &str = "source";

/// Endpoint the documents are reindexed into.
pub const TARGET_ENDPOINT: &str = "target";

/// Execute a CLI command.
pub fn execute_command(args: ReindexerArgs) -> Result<()> {
    match &args.command {
        Command::Run(run_args) => run_reindex(run_args.clone(), &args),
        Command::Count(count_args) => count_documents(count_args.clone(), &args),
    }
}

/// Reindex a JSONL file into another JSONL file.
fn run_reindex(args: RunArgs, cli_args: &ReindexerArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ReindexConfig::from_json_file(path)?,
        None => ReindexConfig::default(),
    };

    let client = MemoryClient::with_default_endpoint(SOURCE_ENDPOINT);
    client.add_endpoint(TARGET_ENDPOINT);
    let source = Endpoint::from(SOURCE_ENDPOINT);
    let target = Endpoint::from(TARGET_ENDPOINT);

    let loaded = client.load_jsonl(Some(&source), &args.source)?;
    info!("loaded {loaded} documents from {}", args.source.display());

    let mapper = build_mapper(&args)?;
    let transform: Option<&dyn Transform> =
        if mapper.is_identity() && args.strategy.transform_optional() {
            None
        } else {
            Some(&mapper)
        };

    let mut options = RunOptions::new()
        .read_from(SOURCE_ENDPOINT)
        .write_to(TARGET_ENDPOINT);
    if args.no_commit {
        options = options.commit(false);
    }
    if let Some(page_size) = args.page_size {
        options = options.page_size(page_size);
    }

    let query = build_query(&args.query, &args.sort)?;
    let reindexer = Reindexer::with_config(client.clone(), config);
    let report = reindexer.run(args.strategy, &query, transform, &options)?;

    let exported = client.export_jsonl(Some(&target), &args.output)?;
    let pending = client.pending_documents(Some(&target)).len();
    if pending > 0 {
        warn!("{pending} documents were written but not committed and are missing from the output");
    }

    output_result(
        "Reindex completed",
        &RunResult {
            report,
            output: args.output.to_string_lossy().to_string(),
            documents_exported: exported,
            documents_pending: pending,
        },
        cli_args,
    )
}

/// Count the documents of a JSONL file matching a query.
fn count_documents(args: CountArgs, cli_args: &ReindexerArgs) -> Result<()> {
    let client = MemoryClient::new();
    client.load_jsonl(None, &args.source)?;

    let query = Query::new(args.query.clone()).with_rows(0);
    let result = client
        .select(&query, None)
        .map_err(|e| ReindexError::read(ReadStage::Probe, e))?;

    output_result(
        "Count completed",
        &CountResult {
            query: args.query,
            num_found: result.num_found(),
        },
        cli_args,
    )
}

/// Build the field mapping transform from the run arguments.
fn build_mapper(args: &RunArgs) -> Result<FieldMapper> {
    let mut mapper = FieldMapper::new();
    for name in &args.require {
        mapper = mapper.require_field(name.as_str());
    }
    for name in &args.drop {
        mapper = mapper.drop_field(name.as_str());
    }
    for pair in &args.rename {
        let (from, to) = split_pair(pair, "--rename")?;
        mapper = mapper.rename_field(from, to);
    }
    for pair in &args.set {
        let (name, raw) = split_pair(pair, "--set")?;
        mapper = mapper.set_field(name, parse_field_value(raw));
    }
    Ok(mapper)
}

/// Build the query from its string and `field[:asc|desc]` sort clauses.
fn build_query(q: &str, sort: &[String]) -> Result<Query> {
    let mut query = Query::new(q);
    for clause in sort {
        let (field, order) = match clause.split_once(':') {
            Some((field, "asc")) => (field, SortOrder::Asc),
            Some((field, "desc")) => (field, SortOrder::Desc),
            Some(_) => {
                return Err(ReindexError::invalid_config(format!(
                    "invalid sort clause '{clause}', expected field or field:asc|desc"
                )));
            }
            None => (clause.as_str(), SortOrder::Asc),
        };
        query = query.with_sort(field, order);
    }
    Ok(query)
}

fn split_pair<'a>(pair: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ReindexError::invalid_config(format!(
            "{flag} expects KEY=VALUE, got '{pair}'"
        ))),
    }
}

/// Parse a constant field value: JSON if it parses, text otherwise.
fn parse_field_value(raw: &str) -> FieldValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => FieldValue::from_json(&value),
        Err(_) => FieldValue::Text(raw.to_string()),
    }
}
