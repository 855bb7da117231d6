//! Typed, directed edges between records

use super::types::RecordId;
use serde::{Deserialize, Serialize};

/// Relationship carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Supports,
    Opposes,
    Motivates,
    GroundedIn,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supports => "supports",
            Self::Opposes => "opposes",
            Self::Motivates => "motivates",
            Self::GroundedIn => "groundedIn",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EdgeKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supports" => Ok(Self::Supports),
            "opposes" => Ok(Self::Opposes),
            "motivates" => Ok(Self::Motivates),
            "groundedIn" | "grounded_in" | "grounded-in" => Ok(Self::GroundedIn),
            _ => Err(format!("unknown edge kind: {}", s)),
        }
    }
}

/// A directed edge `source --relation--> target`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: RecordId,
    pub target: RecordId,
    pub relation: EdgeKind,
}

impl Edge {
    pub fn new(source: impl Into<RecordId>, target: impl Into<RecordId>, relation: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}
