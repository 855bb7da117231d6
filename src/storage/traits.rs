//! Storage trait definitions

use crate::record::{EdgeKind, Record, RecordId, RecordType};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Direction for edge traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow outgoing edges (source -> target)
    #[default]
    Outgoing,
    /// Follow incoming edges (target <- source)
    Incoming,
    /// Follow edges in both directions
    Both,
}

impl std::str::FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outgoing" | "out" => Ok(Self::Outgoing),
            "incoming" | "in" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown direction: {}", s)),
        }
    }
}

/// Which records a traversal should match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    /// Starting record (never part of the result)
    pub origin: RecordId,
    /// Relations to follow; empty follows every relation
    pub relations: Vec<EdgeKind>,
    /// Direction to traverse edges
    pub direction: Direction,
    /// Maximum depth (1 = immediate neighbors)
    pub max_depth: usize,
    /// Only return records of this type
    pub record_type: Option<RecordType>,
}

impl EdgeSpec {
    /// Match the immediate outgoing neighbors of `origin`
    pub fn from(origin: impl Into<RecordId>) -> Self {
        Self {
            origin: origin.into(),
            relations: Vec::new(),
            direction: Direction::Outgoing,
            max_depth: 1,
            record_type: None,
        }
    }

    /// Follow this relation (may be called repeatedly)
    pub fn with_relation(mut self, relation: EdgeKind) -> Self {
        if !self.relations.contains(&relation) {
            self.relations.push(relation);
        }
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn of_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    /// Check whether an edge relation passes the relation filter
    pub fn follows(&self, relation: EdgeKind) -> bool {
        self.relations.is_empty() || self.relations.contains(&relation)
    }
}

/// Read access to the record graph
///
/// Implementations must be thread-safe (Send + Sync); gateway calls run
/// concurrently without coordination. Timeouts and retries belong to the
/// implementation and surface as `Timeout` / `Unavailable`.
pub trait RecordStore: Send + Sync {
    /// Load a record by ID, failing with `NotFound` when absent
    fn fetch(&self, id: &RecordId) -> StorageResult<Record>;

    /// Records reached from `spec.origin`, in breadth-first order
    fn traverse(&self, spec: &EdgeSpec) -> StorageResult<Vec<Record>>;
}
