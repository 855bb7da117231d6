//! Research record data model
//!
//! Records and edges are owned by the storage collaborator. The engine only
//! reads them; nothing in this module exposes a mutator for a record's id,
//! type, or license once it exists.

mod edge;
mod types;


pub use edge::{Edge, EdgeKind};
pub use types::{Content, FieldValue, License, Record, RecordId, RecordType};
