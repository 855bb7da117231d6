//! License classification

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// License prefix that makes attribution mandatory
const ENCUMBERED_PREFIX: &str = "CC";

/// An attribution field a license can require
///
/// Ordered `sourceLink` before `creator`; every list of missing fields
/// follows this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributionField {
    SourceLink,
    Creator,
}

impl AttributionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceLink => "sourceLink",
            Self::Creator => "creator",
        }
    }
}

impl std::fmt::Display for AttributionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a record's license
///
/// Computed fresh for every record on every request. Only [`classify`]
/// produces one outside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    encumbered: bool,
    required: BTreeSet<AttributionField>,
}

impl PolicyDecision {
    /// No attribution required
    pub(crate) fn unencumbered() -> Self {
        Self {
            encumbered: false,
            required: BTreeSet::new(),
        }
    }

    /// Attribution required: source link and creator
    pub(crate) fn encumbered() -> Self {
        Self {
            encumbered: true,
            required: [AttributionField::SourceLink, AttributionField::Creator]
                .into_iter()
                .collect(),
        }
    }

    pub fn is_encumbered(&self) -> bool {
        self.encumbered
    }

    /// Fields that must be present, in report order
    pub fn required(&self) -> &BTreeSet<AttributionField> {
        &self.required
    }

    /// Whichever of the two decisions demands more
    pub(crate) fn stricter(&self, other: &Self) -> Self {
        if self.encumbered || other.encumbered {
            Self::encumbered()
        } else {
            Self::unencumbered()
        }
    }
}

/// Classify a license name.
///
/// A record is encumbered iff its license name, after trimming leading
/// whitespace, starts with `CC` (case-sensitive). Absent names are not
/// encumbered.
pub fn classify(license_name: Option<&str>) -> PolicyDecision {
    match license_name {
        Some(name) if name.trim_start().starts_with(ENCUMBERED_PREFIX) => {
            PolicyDecision::encumbered()
        }
        _ => PolicyDecision::unencumbered(),
    }
}
