//! Command line argument parsing for the reindexer CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::query::MATCH_ALL;
use crate::reindex::Strategy;

/// Reindexer - stream documents out of an index, transform them, write them back
#[derive(Parser, Debug, Clone)]
#[command(name = "reindexer")]
#[command(about = "Buffered reindex pipeline for search documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ReindexerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ReindexerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reindex the documents of a JSONL file into another JSONL file
    Run(RunArgs),

    /// Count the documents of a JSONL file matching a query
    Count(CountArgs),
}

/// Arguments for a reindex run
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// JSONL file holding the source documents
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// JSONL file receiving the committed target documents
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Reindex strategy
    #[arg(short, long, default_value = "streamed")]
    pub strategy: Strategy,

    /// Query selecting the documents to reindex (`*:*`, `field:value`, `field:*`)
    #[arg(long, default_value = MATCH_ALL)]
    pub query: String,

    /// Sort clause as `field` or `field:desc`
    #[arg(long)]
    pub sort: Vec<String>,

    /// Page and write-buffer size (overrides the config file)
    #[arg(short, long)]
    pub page_size: Option<usize>,

    /// Don't commit at the end of the run
    #[arg(long)]
    pub no_commit: bool,

    /// JSON config file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Rename a field, as `from=to`
    #[arg(long, value_name = "FROM=TO")]
    pub rename: Vec<String>,

    /// Drop a field
    #[arg(long, value_name = "FIELD")]
    pub drop: Vec<String>,

    /// Set a field to a constant, as `field=value` (value parsed as JSON, else text)
    #[arg(long, value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Fail the run if a source document lacks this field
    #[arg(long, value_name = "FIELD")]
    pub require: Vec<String>,
}

/// Arguments for counting matches
#[derive(Parser, Debug, Clone)]
pub struct CountArgs {
    /// JSONL file holding the documents
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Query to count
    #[arg(long, default_value = MATCH_ALL)]
    pub query: String,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
