//! Rejections returned at the enforcement boundary

use crate::policy::{AttributionField, DeficiencyReport};
use crate::record::RecordId;
use crate::storage::StorageError;
use thiserror::Error;

fn joined(fields: &[AttributionField]) -> String {
    fields.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
}

/// Why a gateway call returned no content.
///
/// Every variant is a reportable result; none of them aborts the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("{0}")]
    DeficientAttribution(DeficiencyReport),

    #[error(
        "cannot reference {} without: {}",
        .0.record_id,
        joined(&.0.missing_fields)
    )]
    ReferenceMissingAttribution(DeficiencyReport),

    #[error("upstream unavailable: {reason}")]
    UpstreamUnavailable {
        record_id: Option<RecordId>,
        reason: String,
    },

    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// Tag for a `Rejection` variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    NotFound,
    DeficientAttribution,
    ReferenceMissingAttribution,
    UpstreamUnavailable,
    Encoding,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::DeficientAttribution => "deficient_attribution",
            Self::ReferenceMissingAttribution => "reference_missing_attribution",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::Encoding => "encoding",
        }
    }
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Rejection {
    /// Map a storage failure; `NotFound` passes through unchanged and
    /// everything else is an upstream failure.
    pub(crate) fn from_storage(err: StorageError, id: Option<&RecordId>) -> Self {
        match err {
            StorageError::NotFound(missing) => Self::NotFound(missing),
            other => Self::UpstreamUnavailable {
                record_id: id.cloned(),
                reason: other.to_string(),
            },
        }
    }

    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::NotFound(_) => RejectionKind::NotFound,
            Self::DeficientAttribution(_) => RejectionKind::DeficientAttribution,
            Self::ReferenceMissingAttribution(_) => RejectionKind::ReferenceMissingAttribution,
            Self::UpstreamUnavailable { .. } => RejectionKind::UpstreamUnavailable,
            Self::Encoding(_) => RejectionKind::Encoding,
        }
    }

    /// Fields the caller must supply to remediate; empty when not applicable
    pub fn missing_fields(&self) -> &[AttributionField] {
        match self {
            Self::DeficientAttribution(report) | Self::ReferenceMissingAttribution(report) => {
                &report.missing_fields
            }
            _ => &[],
        }
    }

    /// The record the rejection is about, when there is one
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            Self::NotFound(id) => Some(id),
            Self::DeficientAttribution(report) | Self::ReferenceMissingAttribution(report) => {
                Some(&report.record_id)
            }
            Self::UpstreamUnavailable { record_id, .. } => record_id.as_ref(),
            Self::Encoding(_) => None,
        }
    }
}
