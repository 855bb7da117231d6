//! Attribution completeness validation

use super::bundle::{Attribution, AttributionBundle};
use super::license::{classify, AttributionField, PolicyDecision};
use crate::record::{License, Record, RecordId};
use serde::Serialize;

/// Literal that some exporters write in place of a missing value
const EMPTY_PLACEHOLDER: &str = "\"\"";

/// Why an encumbered record cannot be emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeficiencyReport {
    pub record_id: RecordId,
    /// Every missing field, in `AttributionField` order
    pub missing_fields: Vec<AttributionField>,
    pub license_name: Option<String>,
}

impl std::fmt::Display for DeficiencyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing: Vec<&str> = self.missing_fields.iter().map(|m| m.as_str()).collect();
        write!(
            f,
            "record {} ({}) is missing required attribution: {}",
            self.record_id,
            self.license_name.as_deref().unwrap_or("unlicensed"),
            missing.join(", ")
        )
    }
}

/// Whether an attribution value counts as present.
///
/// Absent, blank, and the `""` placeholder are all treated as missing.
pub fn is_present(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            !trimmed.is_empty() && trimmed != EMPTY_PLACEHOLDER
        }
        None => false,
    }
}

pub(crate) fn field_value(license: &License, field: AttributionField) -> Option<&str> {
    match field {
        AttributionField::SourceLink => license.source_link.as_deref(),
        AttributionField::Creator => license.creator.as_deref(),
    }
}

/// Validate a record against its policy decision.
///
/// The record's own license is re-classified and the stricter of the two
/// decisions applies, so a decision made for another license can never
/// relax the requirements of this one.
///
/// Unencumbered records always pass with an empty attribution mapping.
/// Encumbered records pass only when every required field is present; the
/// bundle then carries exactly those fields with their stored values. On
/// failure the report lists all missing fields, not just the first.
pub fn validate(
    record: &Record,
    decision: &PolicyDecision,
) -> Result<AttributionBundle, DeficiencyReport> {
    let decision = decision.stricter(&classify(record.license().license_name.as_deref()));
    if !decision.is_encumbered() {
        return Ok(AttributionBundle::merge(record.clone(), false, Attribution::new()));
    }

    let mut attribution = Attribution::new();
    let mut missing = Vec::new();
    for field in decision.required() {
        match field_value(record.license(), *field) {
            Some(value) if is_present(Some(value)) => {
                attribution.insert(*field, value.to_string());
            }
            _ => missing.push(*field),
        }
    }

    if !missing.is_empty() {
        return Err(DeficiencyReport {
            record_id: record.id().clone(),
            missing_fields: missing,
            license_name: record.license().license_name.clone(),
        });
    }

    Ok(AttributionBundle::merge(record.clone(), true, attribution))
}
