//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, ReindexerArgs};
use crate::error::Result;
use crate::reindex::ReindexReport;

/// Result structure for a reindex run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(flatten)]
    pub report: ReindexReport,
    pub output: String,
    pub documents_exported: usize,
    /// Documents written but left uncommitted, hence missing from the output.
    pub documents_pending: usize,
}

/// Result structure for a count.
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResult {
    pub query: String,
    pub num_found: usize,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &ReindexerArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &ReindexerArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in &obj {
                println!("{key}: {}", format_value(val));
            }
        }
        other => println!("{}", format_value(&other)),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ReindexerArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for human output.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reindex::Strategy;
    use serde_json::json;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("x")), "x");
        assert_eq!(format_value(&json!([1, 2])), "[1, 2]");
        assert_eq!(format_value(&json!(null)), "-");
    }

    #[test]
    fn test_run_result_flattens_report() {
        let result = RunResult {
            report: ReindexReport {
                run_id: uuid::Uuid::nil(),
                strategy: Strategy::PaginatedBuffered,
                num_found: Some(3),
                documents_read: 3,
                documents_written: 3,
                submissions: 1,
                pages: 1,
                committed: true,
                elapsed_ms: 0,
            },
            output: "out.jsonl".to_string(),
            documents_exported: 3,
            documents_pending: 0,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["strategy"], json!("paginated-buffered"));
        assert_eq!(value["documents_written"], json!(3));
        assert_eq!(value["documents_exported"], json!(3));
    }
}
