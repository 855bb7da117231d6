//! Attribution-complete view of a record

use super::license::AttributionField;
use crate::record::{Content, EdgeKind, License, Record, RecordId, RecordType};
use std::collections::{BTreeMap, BTreeSet};

/// Verified attribution values keyed by field
pub type Attribution = BTreeMap<AttributionField, String>;

/// A related record reached by expansion, already bundled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Related {
    pub relation: EdgeKind,
    pub bundle: AttributionBundle,
}

/// The only form in which a record leaves the engine.
///
/// There is no public constructor: a bundle exists only because
/// [`validate`](super::validate) succeeded for its record. For encumbered
/// records the attribution mapping always holds every required field; for
/// unencumbered records it is empty.
///
/// Two bundles are equal when they describe the same record id.
#[derive(Debug, Clone)]
pub struct AttributionBundle {
    record: Record,
    encumbered: bool,
    attribution: Attribution,
    proof: BTreeSet<AttributionField>,
    related: Vec<Related>,
}

impl AttributionBundle {
    pub(super) fn merge(record: Record, encumbered: bool, attribution: Attribution) -> Self {
        let proof = attribution.keys().copied().collect();
        Self {
            record,
            encumbered,
            attribution,
            proof,
            related: Vec::new(),
        }
    }

    /// Attach bundles of related records reached by expansion
    pub(crate) fn with_related(mut self, related: Vec<Related>) -> Self {
        self.related = related;
        self
    }

    pub fn id(&self) -> &RecordId {
        self.record.id()
    }

    pub fn record_type(&self) -> RecordType {
        self.record.record_type()
    }

    pub fn title(&self) -> Option<&str> {
        self.record.title()
    }

    /// The record's content fields
    pub fn content(&self) -> &Content {
        self.record.content()
    }

    /// The record's license metadata, read-only
    pub fn license(&self) -> &License {
        self.record.license()
    }

    pub fn license_name(&self) -> Option<&str> {
        self.record.license().license_name.as_deref()
    }

    /// Verified attribution; empty for unencumbered records
    pub fn attribution(&self) -> &Attribution {
        &self.attribution
    }

    /// Fields verified present during validation
    pub fn completeness_proof(&self) -> &BTreeSet<AttributionField> {
        &self.proof
    }

    pub fn is_encumbered(&self) -> bool {
        self.encumbered
    }

    pub fn related(&self) -> &[Related] {
        &self.related
    }

    pub fn source_link(&self) -> Option<&str> {
        self.attribution.get(&AttributionField::SourceLink).map(String::as_str)
    }

    pub fn creator(&self) -> Option<&str> {
        self.attribution.get(&AttributionField::Creator).map(String::as_str)
    }
}

impl PartialEq for AttributionBundle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for AttributionBundle {}

impl std::hash::Hash for AttributionBundle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
