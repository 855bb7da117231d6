//! Mesa: Machine-Enforceable Schema for Attribution
//!
//! An attribution-compliance policy engine for typed research records
//! (Evidence, Claim, Question, Source). Records released under an
//! encumbered license must carry a source link and a creator before they
//! may leave the system.
//!
//! # Core Concepts
//!
//! - **Policy**: `classify` turns a license name into a decision; `validate`
//!   checks a record against it and is the only way to build an
//!   [`AttributionBundle`]
//! - **Gateway**: every outbound operation (retrieve, reference, query,
//!   render, export) goes through [`EnforcementGateway`]
//! - **Audit**: each gateway call emits one [`AuditEvent`] to an [`AuditSink`]
//!
//! # Example
//!
//! ```
//! use mesa::{EnforcementGateway, License, MemoryStore, NullAuditSink, Record, RecordType};
//! use std::sync::Arc;
//!
//! let store = MemoryStore::new();
//! store.insert(
//!     Record::new("evidence-001", RecordType::Evidence).with_license(
//!         License::named("CC BY 4.0")
//!             .with_source_link("https://lab.example.com/dataset-001")
//!             .with_creator("Jane Smith"),
//!     ),
//! );
//!
//! let gateway = EnforcementGateway::new(Arc::new(store), Arc::new(NullAuditSink));
//! let bundle = gateway.retrieve(&"evidence-001".into()).unwrap();
//! assert_eq!(bundle.creator(), Some("Jane Smith"));
//! ```

pub mod audit;
pub mod config;
pub mod gateway;
pub mod policy;
pub mod record;
pub mod storage;

pub use audit::{
    AuditEvent, AuditSink, ChannelAuditSink, MemoryAuditSink, NullAuditSink, Operation, Outcome,
    TracingAuditSink,
};
pub use config::{ConfigError, MesaConfig};
pub use gateway::{
    EnforcementGateway, Expansion, ExportFormat, QueryResults, Reference, ReferenceContext,
    Rejection, RejectionKind, RenderFormat,
};
pub use policy::{
    classify, validate, AttributionBundle, AttributionField, DeficiencyReport, PolicyDecision,
};
pub use record::{Edge, EdgeKind, FieldValue, License, Record, RecordId, RecordType};
pub use storage::{
    Direction, EdgeSpec, MemoryStore, RecordStore, StorageError, StorageResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
