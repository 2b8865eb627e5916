//! JSONL format document converter.
//!
//! Each line in the file is a single JSON object:
//! ```jsonl
//! {"id": "1", "title": "Rust Programming", "year": 2024}
//! {"id": "2", "title": "Python Basics", "year": 2023}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::document::converter::DocumentConverter;
use crate::document::document::{SourceDocument, TargetDocument};
use crate::error::{ReindexError, Result};

/// A document converter for JSONL format.
#[derive(Debug, Clone, Default)]
pub struct JsonlDocumentConverter {
    /// Stop at the first malformed line instead of reporting it per item.
    strict: bool,
}

impl JsonlDocumentConverter {
    /// Create a new JSONL converter.
    pub fn new() -> Self {
        JsonlDocumentConverter { strict: false }
    }

    /// Create a converter that ends iteration after the first malformed line.
    pub fn strict() -> Self {
        JsonlDocumentConverter { strict: true }
    }

    /// Parse a single JSON line into a document.
    fn parse_json_line(&self, line: &str, line_num: usize) -> Result<SourceDocument> {
        let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            ReindexError::other(format!("Failed to parse JSON on line {line_num}: {e}"))
        })?;
        SourceDocument::from_json(&value)
    }
}

/// Iterator over JSONL documents.
pub struct JsonlDocumentIterator {
    reader: BufReader<File>,
    converter: JsonlDocumentConverter,
    line_num: usize,
    failed: bool,
}

impl Iterator for JsonlDocumentIterator {
    type Item = Result<SourceDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut line = String::new();
        loop {
            line.clear();
            self.line_num += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let parsed = self.converter.parse_json_line(line, self.line_num);
                    if parsed.is_err() && self.converter.strict {
                        self.failed = true;
                    }
                    return Some(parsed);
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

impl DocumentConverter for JsonlDocumentConverter {
    type Iter = JsonlDocumentIterator;

    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter> {
        let file = File::open(path.as_ref())?;

        Ok(JsonlDocumentIterator {
            reader: BufReader::new(file),
            converter: self.clone(),
            line_num: 0,
            failed: false,
        })
    }
}

/// Write documents to a JSONL file, one JSON object per line.
///
/// Returns the number of documents written.
pub fn write_jsonl<'a, P, I>(path: P, documents: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a TargetDocument>,
{
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    let mut count = 0;
    for doc in documents {
        serde_json::to_writer(&mut writer, &doc.to_json())?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::field_value::FieldValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_jsonl_multiple_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "Test1", "year": 2024}}"#).unwrap();
        writeln!(file, r#"{{"title": "Test2", "year": 2023}}"#).unwrap();
        file.flush().unwrap();

        let converter = JsonlDocumentConverter::new();
        let docs: Vec<_> = converter.convert(file.path()).unwrap().collect();

        assert_eq!(docs.len(), 2);
        let doc1 = docs[0].as_ref().unwrap();
        assert_eq!(doc1.get_field("title").unwrap().as_text().unwrap(), "Test1");
        let doc2 = docs[1].as_ref().unwrap();
        assert_eq!(doc2.get_field("year"), Some(&FieldValue::Integer(2023)));
    }

    #[test]
    fn test_jsonl_empty_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "Test1"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"title": "Test2"}}"#).unwrap();
        file.flush().unwrap();

        let converter = JsonlDocumentConverter::new();
        let docs: Vec<_> = converter.convert(file.path()).unwrap().collect();

        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_jsonl_strict_stops_after_bad_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "Test1"}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"title": "Test3"}}"#).unwrap();
        file.flush().unwrap();

        let lenient: Vec<_> = JsonlDocumentConverter::new()
            .convert(file.path())
            .unwrap()
            .collect();
        assert_eq!(lenient.len(), 3);
        assert!(lenient[1].is_err());

        let strict: Vec<_> = JsonlDocumentConverter::strict()
            .convert(file.path())
            .unwrap()
            .collect();
        assert_eq!(strict.len(), 2);
        assert!(strict[1].is_err());
    }

    #[test]
    fn test_write_jsonl() {
        let file = NamedTempFile::new().unwrap();
        let docs = vec![
            TargetDocument::builder().add_text("id", "1").build(),
            TargetDocument::builder().add_text("id", "2").build(),
        ];

        let written = write_jsonl(file.path(), &docs).unwrap();
        assert_eq!(written, 2);

        let read: Vec<_> = JsonlDocumentConverter::new()
            .convert(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].get_field("id").unwrap().as_text(), Some("2"));
    }
}
