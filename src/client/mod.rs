//! Search client boundary.
//!
//! The reindex pipeline reads and writes exclusively through the
//! [`SearchClient`] trait. [`MemoryClient`] is an in-process implementation
//! used by the CLI and the tests.

pub mod buffered;
pub mod cursor;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use buffered::*;
pub use cursor::*;
pub use memory::*;
pub use traits::*;
