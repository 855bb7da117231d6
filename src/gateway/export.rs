//! Batch export of bundled records

use super::Rejection;
use crate::policy::AttributionBundle;
use crate::record::{Content, EdgeKind, FieldValue, License, RecordId, RecordType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys the exported envelope owns; content under these names is dropped
const RESERVED_KEYS: &[&str] = &[
    "@id",
    "@type",
    "_attribution",
    "_related",
    "licenseName",
    "licenseLink",
    "sourceLink",
    "creator",
    "attributionStatement",
    "rightsStatement",
];

/// Serialization format for `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    #[serde(rename = "jsonld")]
    JsonLd,
    Yaml,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "jsonld" | "json-ld" => Ok(Self::JsonLd),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("unknown export format: {}", s)),
        }
    }
}

/// Attribution block written next to every encumbered record
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedAttribution<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    license_name: Option<&'a str>,
    source_link: Option<&'a str>,
    creator: Option<&'a str>,
    attribution_required: bool,
}

#[derive(Serialize)]
struct ExportedRecord<'a> {
    #[serde(rename = "@id")]
    id: &'a RecordId,
    #[serde(rename = "@type")]
    record_type: RecordType,
    #[serde(flatten)]
    license: &'a License,
    #[serde(flatten)]
    content: BTreeMap<&'a str, &'a FieldValue>,
    #[serde(rename = "_attribution", skip_serializing_if = "Option::is_none")]
    attribution: Option<ExportedAttribution<'a>>,
    #[serde(rename = "_related", skip_serializing_if = "Vec::is_empty")]
    related: Vec<ExportedRelated<'a>>,
}

#[derive(Serialize)]
struct ExportedRelated<'a> {
    relation: EdgeKind,
    record: ExportedRecord<'a>,
}

#[derive(Serialize)]
struct JsonLdDocument<'a> {
    #[serde(rename = "@graph")]
    graph: Vec<ExportedRecord<'a>>,
}

impl<'a> ExportedRecord<'a> {
    fn from_bundle(bundle: &'a AttributionBundle) -> Self {
        let attribution = bundle.is_encumbered().then(|| ExportedAttribution {
            license_name: bundle.license_name(),
            source_link: bundle.source_link(),
            creator: bundle.creator(),
            attribution_required: true,
        });
        Self {
            id: bundle.id(),
            record_type: bundle.record_type(),
            license: bundle.license(),
            content: unreserved(bundle.content()),
            attribution,
            related: bundle
                .related()
                .iter()
                .map(|r| ExportedRelated {
                    relation: r.relation,
                    record: ExportedRecord::from_bundle(&r.bundle),
                })
                .collect(),
        }
    }
}

fn unreserved(content: &Content) -> BTreeMap<&str, &FieldValue> {
    content
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value))
        .collect()
}

pub(super) fn export(bundles: &[AttributionBundle], format: ExportFormat) -> Result<Vec<u8>, Rejection> {
    let records: Vec<ExportedRecord<'_>> = bundles.iter().map(ExportedRecord::from_bundle).collect();
    let encoded = match format {
        ExportFormat::Json => serde_json::to_vec_pretty(&records).map_err(|e| e.to_string()),
        ExportFormat::JsonLd => {
            serde_json::to_vec_pretty(&JsonLdDocument { graph: records }).map_err(|e| e.to_string())
        }
        ExportFormat::Yaml => serde_yaml::to_string(&records)
            .map(String::into_bytes)
            .map_err(|e| e.to_string()),
    };
    encoded.map_err(Rejection::Encoding)
}
