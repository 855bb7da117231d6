//! Storage collaborator for the enforcement engine
//!
//! The engine consumes records through the `RecordStore` trait and never
//! writes to it. `MemoryStore` is the in-process implementation used by the
//! CLI and tests; it loads a JSON-LD `@graph` document.

mod memory;
mod traits;

pub use memory::{GraphDocument, MemoryStore};
pub use traits::{Direction, EdgeSpec, RecordStore, StorageError, StorageResult};
