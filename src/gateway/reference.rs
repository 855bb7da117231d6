//! Reference creation: attribution carried into the citing artifact

use super::{EnforcementGateway, Rejection};
use crate::policy::{classify, is_present, validate, Attribution, DeficiencyReport};
use crate::record::RecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Caller-supplied fields of the citing artifact (e.g. `citation`,
/// `sourceLink`, `creator`)
pub type ReferenceContext = BTreeMap<String, String>;

/// A citation of one record by another artifact
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: Uuid,
    pub source: RecordId,
    pub context: ReferenceContext,
    /// The cited record's verified attribution; empty when unencumbered
    pub attribution: Attribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EnforcementGateway {
    pub(super) fn reference(
        &self,
        source_id: &RecordId,
        context: ReferenceContext,
    ) -> Result<Reference, Rejection> {
        let record = self.fetch(source_id)?;
        let decision = classify(record.license().license_name.as_deref());

        let missing: Vec<_> = decision
            .required()
            .iter()
            .copied()
            .filter(|field| !is_present(context.get(field.as_str()).map(String::as_str)))
            .collect();
        if !missing.is_empty() {
            return Err(Rejection::ReferenceMissingAttribution(DeficiencyReport {
                record_id: source_id.clone(),
                missing_fields: missing,
                license_name: record.license().license_name.clone(),
            }));
        }

        let bundle = validate(&record, &decision).map_err(Rejection::DeficientAttribution)?;
        for (field, value) in bundle.attribution() {
            let cited = context.get(field.as_str()).map(|v| v.trim());
            if cited != Some(value.trim()) {
                tracing::warn!(
                    record_id = %source_id,
                    field = %field,
                    "reference context differs from source attribution"
                );
            }
        }

        Ok(Reference {
            id: Uuid::new_v4(),
            source: source_id.clone(),
            context,
            attribution: bundle.attribution().clone(),
            license_name: bundle.license_name().map(String::from),
            created_at: Utc::now(),
        })
    }
}
