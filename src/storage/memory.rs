//! In-memory record store loaded from a JSON-LD graph document

use super::traits::{Direction, EdgeSpec, RecordStore, StorageError, StorageResult};
use crate::record::{Edge, EdgeKind, FieldValue, Record, RecordId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Legacy content field naming the record this one was derived from
const DERIVED_FROM: &str = "derivedFrom";

/// On-disk shape of a record graph
///
/// ```json
/// { "@graph": [ { "@id": "...", "@type": "Evidence", ... } ],
///   "edges":  [ { "source": "...", "target": "...", "relation": "groundedIn" } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    #[serde(rename = "@graph", default)]
    pub graph: Vec<Record>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Thread-safe in-memory store
///
/// Records are keyed by id; edges are indexed in both directions for
/// traversal.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<RecordId, Record>,
    outgoing: DashMap<RecordId, Vec<Edge>>,
    incoming: DashMap<RecordId, Vec<Edge>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a parsed graph document.
    ///
    /// A string `derivedFrom` field becomes a `groundedIn` edge.
    pub fn from_document(document: GraphDocument) -> Self {
        let store = Self::new();
        for record in document.graph {
            if let Some(FieldValue::String(target)) = record.content().get(DERIVED_FROM) {
                store.add_edge(Edge::new(
                    record.id().clone(),
                    target.as_str(),
                    EdgeKind::GroundedIn,
                ));
            }
            store.insert(record);
        }
        for edge in document.edges {
            store.add_edge(edge);
        }
        store
    }

    /// Parse a JSON-LD graph document
    pub fn from_json_ld(json: &str) -> StorageResult<Self> {
        let document: GraphDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Load a JSON-LD graph document from disk
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_ld(&json)
    }

    /// Insert or replace a record
    pub fn insert(&self, record: Record) -> RecordId {
        let id = record.id().clone();
        self.records.insert(id.clone(), record);
        id
    }

    /// Add an edge; duplicates are ignored
    pub fn add_edge(&self, edge: Edge) {
        let mut out = self.outgoing.entry(edge.source.clone()).or_default();
        if out.contains(&edge) {
            return;
        }
        out.push(edge.clone());
        drop(out);
        self.incoming.entry(edge.target.clone()).or_default().push(edge);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(|r| r.value().len()).sum()
    }

    fn edges_of(&self, id: &RecordId, direction: Direction) -> Vec<Edge> {
        let outgoing = || self.outgoing.get(id).map(|r| r.clone()).unwrap_or_default();
        let incoming = || self.incoming.get(id).map(|r| r.clone()).unwrap_or_default();
        match direction {
            Direction::Outgoing => outgoing(),
            Direction::Incoming => incoming(),
            Direction::Both => {
                let mut edges = outgoing();
                edges.extend(incoming());
                edges
            }
        }
    }
}

impl RecordStore for MemoryStore {
    fn fetch(&self, id: &RecordId) -> StorageResult<Record> {
        self.records
            .get(id)
            .map(|r| r.clone())
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    fn traverse(&self, spec: &EdgeSpec) -> StorageResult<Vec<Record>> {
        if !self.records.contains_key(&spec.origin) {
            return Err(StorageError::NotFound(spec.origin.clone()));
        }

        // BFS traversal
        let mut visited: HashSet<RecordId> = HashSet::new();
        let mut current_level: Vec<RecordId> = vec![spec.origin.clone()];
        visited.insert(spec.origin.clone());
        let mut found = Vec::new();

        for _depth in 0..spec.max_depth {
            if current_level.is_empty() {
                break;
            }

            let mut next_level = Vec::new();
            for id in &current_level {
                for edge in self.edges_of(id, spec.direction) {
                    if !spec.follows(edge.relation) {
                        continue;
                    }

                    let neighbor = if &edge.source == id {
                        edge.target
                    } else {
                        edge.source
                    };
                    if !visited.insert(neighbor.clone()) {
                        continue;
                    }

                    // An edge to a missing record is a broken graph, not an empty result
                    let record = self
                        .records
                        .get(&neighbor)
                        .map(|r| r.clone())
                        .ok_or_else(|| StorageError::NotFound(neighbor.clone()))?;
                    next_level.push(neighbor);
                    if spec.record_type.map_or(true, |t| t == record.record_type()) {
                        found.push(record);
                    }
                }
            }
            current_level = next_level;
        }

        Ok(found)
    }
}
