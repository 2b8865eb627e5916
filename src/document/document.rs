//! Documents on both sides of a reindex run.
//!
//! A [`SourceDocument`] is what the read side hands out. It is immutable once
//! produced. A [`TargetDocument`] is what gets submitted to the write side,
//! built by a transform or copied field by field from a source document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::field_value::FieldValue;
use crate::error::{ReindexError, Result};

/// A document retrieved from the read target.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct SourceDocument {
    /// The stored field values for this document
    fields: HashMap<String, FieldValue>,
}

impl SourceDocument {
    /// Create a source document from its stored fields.
    pub fn from_fields(fields: HashMap<String, FieldValue>) -> Self {
        SourceDocument { fields }
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|s| s.as_str()).collect()
    }

    /// Get all field values.
    pub fn fields(&self) -> &HashMap<String, FieldValue> {
        &self.fields
    }

    /// Take the field map out of the document.
    pub fn into_fields(self) -> HashMap<String, FieldValue> {
        self.fields
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Build a document from a JSON object.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(SourceDocument {
            fields: fields_from_json(value)?,
        })
    }

    /// Render the document as a JSON object.
    pub fn to_json(&self) -> Value {
        fields_to_json(&self.fields)
    }
}

/// A document submitted to the write target.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct TargetDocument {
    /// The field values to write
    fields: HashMap<String, FieldValue>,
}

impl TargetDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target document from a field map.
    pub fn from_fields(fields: HashMap<String, FieldValue>) -> Self {
        TargetDocument { fields }
    }

    /// Add a field value to the document, replacing any previous value.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Remove a field from the document.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field values.
    pub fn fields(&self) -> &HashMap<String, FieldValue> {
        &self.fields
    }

    /// Take the field map out of the document.
    pub fn into_fields(self) -> HashMap<String, FieldValue> {
        self.fields
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Render the document as a JSON object.
    pub fn to_json(&self) -> Value {
        fields_to_json(&self.fields)
    }
}

/// Field-copy conversion: every stored field of the source ends up in the
/// target unchanged.
impl From<SourceDocument> for TargetDocument {
    fn from(source: SourceDocument) -> Self {
        TargetDocument::from_fields(source.into_fields())
    }
}

fn fields_from_json(value: &Value) -> Result<HashMap<String, FieldValue>> {
    let Value::Object(map) = value else {
        return Err(ReindexError::other(format!(
            "expected a JSON object, found {value}"
        )));
    };

    Ok(map
        .iter()
        .map(|(key, val)| (key.clone(), FieldValue::from_json(val)))
        .collect())
}

fn fields_to_json(fields: &HashMap<String, FieldValue>) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();
    Value::Object(map)
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    fields: HashMap<String, FieldValue>,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field to the document.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.fields
            .insert(name.into(), FieldValue::Text(value.into()));
        self
    }

    /// Add an integer field to the document.
    pub fn add_integer<S: Into<String>>(mut self, name: S, value: i64) -> Self {
        self.fields.insert(name.into(), FieldValue::Integer(value));
        self
    }

    /// Add a float field to the document.
    pub fn add_float<S: Into<String>>(mut self, name: S, value: f64) -> Self {
        self.fields.insert(name.into(), FieldValue::Float(value));
        self
    }

    /// Add a boolean field to the document.
    pub fn add_boolean<S: Into<String>>(mut self, name: S, value: bool) -> Self {
        self.fields.insert(name.into(), FieldValue::Boolean(value));
        self
    }

    /// Add a datetime field to the document.
    pub fn add_datetime<S: Into<String>>(
        mut self,
        name: S,
        value: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.fields.insert(name.into(), FieldValue::DateTime(value));
        self
    }

    /// Add a field with a generic value.
    pub fn add_field<S: Into<String>>(mut self, name: S, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Build a document for the write side.
    pub fn build(self) -> TargetDocument {
        TargetDocument {
            fields: self.fields,
        }
    }

    /// Build a document as the read side would return it.
    pub fn build_source(self) -> SourceDocument {
        SourceDocument {
            fields: self.fields,
        }
    }
}
