use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use reindexer::cli::args::ReindexerArgs;
use reindexer::cli::commands::execute_command;
use reindexer::error::ReindexError;

fn write_source(dir: &Path, count: usize) -> String {
    let path = dir.join("source.jsonl");
    let lines: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"id": {i}, "title": "Book {i}", "internal": true}}"#))
        .collect();
    fs::write(&path, lines.join("\n")).unwrap();
    path.to_string_lossy().to_string()
}

fn read_output(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn run(argv: &[&str]) -> reindexer::error::Result<()> {
    let mut full = vec!["reindexer", "-q", "--format", "json"];
    full.extend_from_slice(argv);
    execute_command(ReindexerArgs::try_parse_from(full).unwrap())
}

#[test]
fn test_run_each_strategy_with_mapping() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 7);

    for strategy in ["streamed", "paginated", "whole"] {
        let output = dir.path().join(format!("{strategy}.jsonl"));
        run(&[
            "run",
            &source,
            output.to_str().unwrap(),
            "--strategy",
            strategy,
            "--page-size",
            "3",
            "--sort",
            "id",
            "--rename",
            "title=name",
            "--drop",
            "internal",
            "--set",
            "version=2",
        ])
        .unwrap();

        let docs = read_output(&output);
        assert_eq!(docs.len(), 7, "{strategy}");
        assert_eq!(docs[0]["name"], "Book 0");
        assert_eq!(docs[0]["version"], 2);
        assert!(docs[0].get("title").is_none());
        assert!(docs[0].get("internal").is_none());
    }
}

#[test]
fn test_run_without_mapping_keeps_documents_exact() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.jsonl");
    let lines = [
        r#"{"id": 1, "big": 18446744073709551615, "meta": {"a": 1, "b": [1, "x"]}, "ts": "2024-01-01T10:00:00+02:00"}"#,
        r#"{"id": 2, "price": 0.1, "tags": ["a", {"k": null}], "min": -9223372036854775808}"#,
    ];
    fs::write(&source, lines.join("\n")).unwrap();
    let expected: Vec<serde_json::Value> = lines
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    for strategy in ["streamed", "paginated", "whole"] {
        let output = dir.path().join(format!("{strategy}.jsonl"));
        run(&[
            "run",
            source.to_str().unwrap(),
            output.to_str().unwrap(),
            "--strategy",
            strategy,
            "--sort",
            "id",
        ])
        .unwrap();

        assert_eq!(read_output(&output), expected, "{strategy}");
    }
}

#[test]
fn test_run_without_commit_exports_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 4);
    let output = dir.path().join("out.jsonl");

    run(&["run", &source, output.to_str().unwrap(), "--no-commit"]).unwrap();

    assert!(read_output(&output).is_empty());
}

#[test]
fn test_run_with_config_file() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 5);
    let output = dir.path().join("out.jsonl");
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"page_size": 2, "commit": true}"#).unwrap();

    run(&[
        "run",
        &source,
        output.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--query",
        "title:*",
    ])
    .unwrap();

    assert_eq!(read_output(&output).len(), 5);
}

#[test]
fn test_run_rejects_zero_page_size() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 2);
    let output = dir.path().join("out.jsonl");

    let err = run(&["run", &source, output.to_str().unwrap(), "--page-size", "0"]).unwrap_err();
    assert!(matches!(err, ReindexError::InvalidConfiguration(_)));
}

#[test]
fn test_run_missing_required_field_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 2);
    let output = dir.path().join("out.jsonl");

    let err = run(&[
        "run",
        &source,
        output.to_str().unwrap(),
        "--require",
        "isbn",
    ])
    .unwrap_err();
    assert!(matches!(err, ReindexError::Transform { position: 1, .. }));
}

#[test]
fn test_count() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 6);

    run(&["count", &source]).unwrap();
    run(&["count", &source, "--query", "id:3"]).unwrap();
    assert!(run(&["count", &source, "--query", "a AND b"]).is_err());
}
