//! Enforcement gateway: the single boundary for emitting records
//!
//! Every operation follows the same protocol: fetch the record, classify
//! its license, validate it, then bundle it together with any related
//! records reached through the requested edges. Nothing leaves through this
//! module except as an [`AttributionBundle`] or a [`Rejection`], and each
//! call emits exactly one audit event.

mod export;
mod query;
mod reference;
mod rejection;
mod render;

pub use export::ExportFormat;
pub use query::QueryResults;
pub use reference::{Reference, ReferenceContext};
pub use rejection::{Rejection, RejectionKind};
pub use render::RenderFormat;

use crate::audit::{AuditEvent, AuditSink, Operation};
use crate::policy::{classify, validate, AttributionBundle, Related};
use crate::record::{EdgeKind, Record, RecordId, RecordType};
use crate::storage::{EdgeSpec, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Which related records get bundled alongside a requested record.
///
/// Outgoing edges of the listed relations are followed, and so are
/// outgoing `groundedIn` edges that reach a `Source` record. `max_depth`
/// bounds how many levels of related records are bundled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expansion {
    pub relations: BTreeSet<EdgeKind>,
    pub max_depth: usize,
}

impl Default for Expansion {
    fn default() -> Self {
        Self {
            relations: BTreeSet::new(),
            max_depth: 2,
        }
    }
}

impl Expansion {
    /// Bundle only the requested record
    pub fn none() -> Self {
        Self {
            relations: BTreeSet::new(),
            max_depth: 0,
        }
    }

    pub fn with_relation(mut self, relation: EdgeKind) -> Self {
        self.relations.insert(relation);
        self
    }

    pub fn depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// One traversal per followed relation
    fn specs(&self, origin: &RecordId) -> Vec<(EdgeKind, EdgeSpec)> {
        let mut specs: Vec<(EdgeKind, EdgeSpec)> = self
            .relations
            .iter()
            .map(|&relation| (relation, EdgeSpec::from(origin.clone()).with_relation(relation)))
            .collect();
        if !self.relations.contains(&EdgeKind::GroundedIn) {
            specs.push((
                EdgeKind::GroundedIn,
                EdgeSpec::from(origin.clone())
                    .with_relation(EdgeKind::GroundedIn)
                    .of_type(RecordType::Source),
            ));
        }
        specs
    }
}

/// The enforcement choke point.
///
/// Holds no per-request state: policy decisions and bundles are computed
/// fresh on every call, so a gateway can be shared across threads.
#[derive(Clone)]
pub struct EnforcementGateway {
    store: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditSink>,
    expansion: Expansion,
}

impl EnforcementGateway {
    /// Create a gateway with the default expansion
    pub fn new(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
            expansion: Expansion::default(),
        }
    }

    /// Set the expansion used when the caller does not request one
    pub fn with_expansion(mut self, expansion: Expansion) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    // --- Boundary operations ---

    /// Retrieve one record with the default expansion.
    pub fn retrieve(&self, id: &RecordId) -> Result<AttributionBundle, Rejection> {
        self.retrieve_with(id, &self.expansion)
    }

    /// Retrieve one record, bundling the related records `expansion` asks for.
    pub fn retrieve_with(
        &self,
        id: &RecordId,
        expansion: &Expansion,
    ) -> Result<AttributionBundle, Rejection> {
        let result = self.bundle(id, expansion);
        self.audit_call(Operation::Retrieve, std::slice::from_ref(id), &result);
        result
    }

    /// Retrieve several records independently; one failure does not affect
    /// the others.
    pub fn retrieve_many(&self, ids: &[RecordId]) -> Vec<Result<AttributionBundle, Rejection>> {
        ids.iter().map(|id| self.retrieve(id)).collect()
    }

    /// Create a reference from a citing artifact to `source_id`.
    ///
    /// For an encumbered source the citing `context` must itself carry
    /// `sourceLink` and `creator`; this is checked before the source record
    /// is validated.
    pub fn create_reference(
        &self,
        source_id: &RecordId,
        context: ReferenceContext,
    ) -> Result<Reference, Rejection> {
        let result = self.reference(source_id, context);
        self.audit_call(Operation::CreateReference, std::slice::from_ref(source_id), &result);
        result
    }

    /// Validate every record a traversal matches.
    ///
    /// The traversal runs when the sequence is first polled. Each element
    /// carries its own outcome and audit event; a rejection does not end
    /// the sequence.
    pub fn query(&self, spec: EdgeSpec) -> QueryResults {
        QueryResults::new(self.clone(), spec)
    }

    /// Render a record with its attribution footer.
    pub fn render(&self, id: &RecordId, format: RenderFormat) -> Result<String, Rejection> {
        let result = self
            .bundle(id, &self.expansion)
            .map(|bundle| render::render(&bundle, format));
        self.audit_call(Operation::Render, std::slice::from_ref(id), &result);
        result
    }

    /// Export a batch of records. All-or-nothing: one deficient record
    /// fails the whole call.
    pub fn export(&self, ids: &[RecordId], format: ExportFormat) -> Result<Vec<u8>, Rejection> {
        let result = ids
            .iter()
            .map(|id| self.bundle(id, &self.expansion))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|bundles| export::export(&bundles, format));
        self.audit_call(Operation::Export, ids, &result);
        result
    }

    // --- Protocol ---

    /// Fetch, classify, validate, and expand one record.
    fn bundle(&self, id: &RecordId, expansion: &Expansion) -> Result<AttributionBundle, Rejection> {
        let record = self.fetch(id)?;
        self.bundle_record(&record, expansion)
    }

    /// Validate `record` and bundle the related records `expansion` reaches.
    ///
    /// Expansion runs level by level, so every related record is embedded at
    /// its shortest distance from `record` and at most once per bundle.
    fn bundle_record(
        &self,
        record: &Record,
        expansion: &Expansion,
    ) -> Result<AttributionBundle, Rejection> {
        let root = self.validated(record)?;

        let mut visited: HashSet<RecordId> = HashSet::new();
        visited.insert(record.id().clone());
        let mut nodes: Vec<Expanded> = Vec::new();
        let mut root_children = Vec::new();
        let mut current_level: Vec<(Option<usize>, RecordId)> = vec![(None, record.id().clone())];

        for _depth in 0..expansion.max_depth {
            if current_level.is_empty() {
                break;
            }

            let mut next_level = Vec::new();
            for (parent, id) in &current_level {
                for (relation, spec) in expansion.specs(id) {
                    let neighbors = self
                        .store
                        .traverse(&spec)
                        .map_err(|e| Rejection::from_storage(e, Some(id)))?;
                    for neighbor in neighbors {
                        if !visited.insert(neighbor.id().clone()) {
                            continue;
                        }
                        let index = nodes.len();
                        nodes.push(Expanded {
                            bundle: Some(self.validated(&neighbor)?),
                            relation,
                            children: Vec::new(),
                        });
                        match parent {
                            Some(parent) => nodes[*parent].children.push(index),
                            None => root_children.push(index),
                        }
                        next_level.push((Some(index), neighbor.id().clone()));
                    }
                }
            }
            current_level = next_level;
        }

        // Children always sit after their parent, so assembling back to
        // front finishes every child before its parent takes it.
        for index in (0..nodes.len()).rev() {
            let children = std::mem::take(&mut nodes[index].children);
            let related = take_related(&mut nodes, &children);
            if let Some(bundle) = nodes[index].bundle.take() {
                nodes[index].bundle = Some(bundle.with_related(related));
            }
        }
        let related = take_related(&mut nodes, &root_children);
        Ok(root.with_related(related))
    }

    fn validated(&self, record: &Record) -> Result<AttributionBundle, Rejection> {
        let decision = classify(record.license().license_name.as_deref());
        validate(record, &decision).map_err(Rejection::DeficientAttribution)
    }

    fn fetch(&self, id: &RecordId) -> Result<Record, Rejection> {
        self.store
            .fetch(id)
            .map_err(|e| Rejection::from_storage(e, Some(id)))
    }

    fn audit_call<T>(&self, operation: Operation, ids: &[RecordId], result: &Result<T, Rejection>) {
        let event = match result {
            Ok(_) => {
                tracing::debug!(%operation, records = ids.len(), "allowed");
                AuditEvent::allow(operation, ids.to_vec())
            }
            Err(rejection) => {
                let subject = match rejection.record_id() {
                    Some(id) => vec![id.clone()],
                    None => ids.to_vec(),
                };
                tracing::warn!(
                    %operation,
                    record_id = subject.first().map(|id| id.as_str()).unwrap_or(""),
                    kind = %rejection.kind(),
                    missing = ?rejection.missing_fields(),
                    "rejected: {}",
                    rejection
                );
                AuditEvent::deny(
                    operation,
                    subject,
                    rejection.kind().as_str(),
                    rejection.missing_fields().to_vec(),
                )
            }
        };
        self.audit.record(event);
    }
}

/// A related record reached during expansion, awaiting assembly
struct Expanded {
    bundle: Option<AttributionBundle>,
    relation: EdgeKind,
    children: Vec<usize>,
}

fn take_related(nodes: &mut [Expanded], children: &[usize]) -> Vec<Related> {
    children
        .iter()
        .filter_map(|&child| {
            let node = &mut nodes[child];
            let relation = node.relation;
            node.bundle.take().map(|bundle| Related { relation, bundle })
        })
        .collect()
}

impl std::fmt::Debug for EnforcementGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnforcementGateway")
            .field("expansion", &self.expansion)
            .finish_non_exhaustive()
    }
}
