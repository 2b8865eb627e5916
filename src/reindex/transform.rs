//! Document transforms applied between read and write.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::document::{FieldValue, SourceDocument, TargetDocument};

/// Turns a document read from the source into the document to write.
///
/// Any closure `Fn(SourceDocument) -> anyhow::Result<TargetDocument>` is a
/// transform. An error aborts the run before the document's batch is
/// submitted.
pub trait Transform {
    fn transform(&self, document: SourceDocument) -> anyhow::Result<TargetDocument>;
}

impl<F> Transform for F
where
    F: Fn(SourceDocument) -> anyhow::Result<TargetDocument>,
{
    fn transform(&self, document: SourceDocument) -> anyhow::Result<TargetDocument> {
        self(document)
    }
}

/// Copies every stored field verbatim. Used by the streamed strategy when no
/// transform is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCopy;

impl Transform for FieldCopy {
    fn transform(&self, document: SourceDocument) -> anyhow::Result<TargetDocument> {
        Ok(TargetDocument::from(document))
    }
}

/// A declarative field-level transform.
///
/// Steps are applied in a fixed order: required fields are checked, then
/// fields are dropped, renamed, and finally constant fields are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapper {
    /// Fields that must be present on every source document.
    pub require: Vec<String>,
    /// Fields removed from the output.
    pub drop: Vec<String>,
    /// `(from, to)` renames.
    pub rename: Vec<(String, String)>,
    /// Fields set to a constant value, overriding any copied value.
    pub set: Vec<(String, FieldValue)>,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_field<S: Into<String>>(mut self, name: S) -> Self {
        self.require.push(name.into());
        self
    }

    pub fn drop_field<S: Into<String>>(mut self, name: S) -> Self {
        self.drop.push(name.into());
        self
    }

    pub fn rename_field<S: Into<String>, T: Into<String>>(mut self, from: S, to: T) -> Self {
        self.rename.push((from.into(), to.into()));
        self
    }

    pub fn set_field<S: Into<String>>(mut self, name: S, value: FieldValue) -> Self {
        self.set.push((name.into(), value));
        self
    }

    /// True if the mapper would copy documents unchanged.
    pub fn is_identity(&self) -> bool {
        self.require.is_empty()
            && self.drop.is_empty()
            && self.rename.is_empty()
            && self.set.is_empty()
    }
}

impl Transform for FieldMapper {
    fn transform(&self, document: SourceDocument) -> anyhow::Result<TargetDocument> {
        for name in &self.require {
            if !document.has_field(name) {
                bail!("required field '{name}' is missing");
            }
        }

        let mut target = TargetDocument::from(document);
        for name in &self.drop {
            target.remove_field(name);
        }
        for (from, to) in &self.rename {
            if let Some(value) = target.remove_field(from) {
                target.add_field(to.clone(), value);
            }
        }
        for (name, value) in &self.set {
            target.add_field(name.clone(), value.clone());
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceDocument {
        SourceDocument::builder()
            .add_text("id", "42")
            .add_text("title", "Rust")
            .add_text("internal", "x")
            .build_source()
    }

    #[test]
    fn test_field_copy() {
        let doc = source();
        let target = FieldCopy.transform(doc.clone()).unwrap();
        assert_eq!(target.fields(), doc.fields());
    }

    #[test]
    fn test_closure_transform() {
        let upper = |doc: SourceDocument| -> anyhow::Result<TargetDocument> {
            let mut target = TargetDocument::from(doc);
            target.add_field("copied", FieldValue::Boolean(true));
            Ok(target)
        };
        let target = upper.transform(source()).unwrap();
        assert_eq!(target.get_field("copied"), Some(&FieldValue::Boolean(true)));
    }

    #[test]
    fn test_field_mapper() {
        let mapper = FieldMapper::new()
            .drop_field("internal")
            .rename_field("title", "name")
            .set_field("source", "legacy".into());
        assert!(!mapper.is_identity());

        let target = mapper.transform(source()).unwrap();
        assert!(!target.has_field("internal"));
        assert!(!target.has_field("title"));
        assert_eq!(target.get_field("name").unwrap().as_text(), Some("Rust"));
        assert_eq!(target.get_field("source").unwrap().as_text(), Some("legacy"));
        assert_eq!(target.len(), 3);
    }

    #[test]
    fn test_field_mapper_required_field() {
        let mapper = FieldMapper::new().require_field("checksum");
        let err = mapper.transform(source()).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }
}
