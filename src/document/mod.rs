//! Document module.
//!
//! Source documents (read side), target documents (write side), their field
//! values, and file converters.

pub mod converter;
#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

// Re-export commonly used types
pub use document::{DocumentBuilder, SourceDocument, TargetDocument};
pub use field_value::FieldValue;
