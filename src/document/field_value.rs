//! Field value types for documents.
//!
//! This module defines the [`FieldValue`] enum which represents every value a
//! stored field of a search document can carry.
//!
//! # Supported Types
//!
//! - **Text** - String data
//! - **Integer** - 64-bit signed integers
//! - **Unsigned** - unsigned integers above `i64::MAX`
//! - **Float** - 64-bit floating-point numbers
//! - **Boolean** - true/false values
//! - **DateTime** - UTC timestamps
//! - **Multi** - Multi-valued fields
//! - **Object** - Nested JSON objects, stored as-is
//! - **Null** - Explicit null values
//!
//! # Type Conversion
//!
//! ```
//! use reindexer::document::field_value::FieldValue;
//!
//! let text_value = FieldValue::Text("hello".to_string());
//! assert_eq!(text_value.as_text(), Some("hello"));
//!
//! let int_value = FieldValue::Integer(42);
//! assert_eq!(int_value.as_numeric(), Some("42".to_string()));
//! assert_eq!(int_value.to_term(), "42");
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Represents a value for a field in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Unsigned integer too large for `Integer`
    Unsigned(u64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// DateTime value
    DateTime(DateTime<Utc>),
    /// Multi-valued field, in stored order
    Multi(Vec<FieldValue>),
    /// Nested object
    Object(Map<String, Value>),
    /// Null value
    Null,
}

impl FieldValue {
    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to numeric string representation.
    pub fn as_numeric(&self) -> Option<String> {
        match self {
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Unsigned(u) => Some(u.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// Get the integer value, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the datetime value, if this is one.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Get the values of a multi-valued field.
    pub fn as_multi(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Multi(values) => Some(values),
            _ => None,
        }
    }

    /// Get the nested object, if this is one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Check if this is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// String form used when matching the value against a query term.
    pub fn to_term(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Unsigned(u) => u.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            FieldValue::Multi(values) => values
                .iter()
                .map(|v| v.to_term())
                .collect::<Vec<_>>()
                .join(" "),
            FieldValue::Object(map) => Value::Object(map.clone()).to_string(),
            FieldValue::Null => String::new(),
        }
    }

    /// Check whether this value (or any of its values, for multi-valued
    /// fields) equals the given term.
    pub fn matches_term(&self, term: &str) -> bool {
        match self {
            FieldValue::Multi(values) => values.iter().any(|v| v.matches_term(term)),
            FieldValue::Null => false,
            other => other.to_term() == term,
        }
    }

    /// Ordering used for sorting search results.
    ///
    /// Numbers compare numerically, everything else by its term form.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Unsigned(a), FieldValue::Unsigned(b)) => a.cmp(b),
            // Unsigned values only hold what does not fit an i64.
            (FieldValue::Integer(_), FieldValue::Unsigned(_)) => Ordering::Less,
            (FieldValue::Unsigned(_), FieldValue::Integer(_)) => Ordering::Greater,
            (FieldValue::Unsigned(a), FieldValue::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Float(a), FieldValue::Unsigned(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Integer(a), FieldValue::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Float(a), FieldValue::Integer(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Float(a), FieldValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Greater,
            (_, FieldValue::Null) => Ordering::Less,
            (a, b) => a.to_term().cmp(&b.to_term()),
        }
    }

    /// Convert a JSON value into a field value.
    ///
    /// The conversion is lossless: `to_json` gives back the same value.
    /// Strings always stay `Text`, even when they look like a timestamp.
    pub fn from_json(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::Unsigned(u)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::Text(n.to_string())
                }
            }
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => {
                FieldValue::Multi(items.iter().map(FieldValue::from_json).collect())
            }
            Value::Object(map) => FieldValue::Object(map.clone()),
        }
    }

    /// Convert this field value into JSON.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Unsigned(u) => Value::Number((*u).into()),
            FieldValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldValue::Multi(values) => {
                Value::Array(values.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::Object(map) => Value::Object(map.clone()),
            FieldValue::Null => Value::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}
