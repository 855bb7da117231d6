//! Shared fixtures for enforcement integration tests
//!
//! The fixture graph mirrors a small research workspace: attributed and
//! deficient evidence, a proprietary note, a claim, a question, and the
//! sources they are grounded in.

#![allow(dead_code)]

use mesa::{
    EdgeSpec, EnforcementGateway, MemoryAuditSink, MemoryStore, Record, RecordId, RecordStore,
    StorageError, StorageResult,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub fn fixture_document() -> serde_json::Value {
    json!({
        "@context": { "@vocab": "https://mesa.example.org/" },
        "@graph": [
            {
                "@id": "evidence-001",
                "@type": "Evidence",
                "title": "Cell migration increases under hypoxia",
                "content": "Migration rate doubled at 1% O2.",
                "licenseName": "CC BY 4.0",
                "licenseLink": "https://creativecommons.org/licenses/by/4.0/",
                "sourceLink": "https://lab.example.com/dataset-001",
                "creator": "Jane Smith"
            },
            {
                "@id": "evidence-002",
                "@type": "Evidence",
                "title": "Temperature affects enzyme activity",
                "licenseName": "CC BY 4.0",
                "sourceLink": "https://x"
            },
            {
                "@id": "note-1",
                "@type": "Claim",
                "title": "Internal note",
                "licenseName": "Proprietary"
            },
            {
                "@id": "claim-001",
                "@type": "Claim",
                "title": "Hypoxia drives invasion",
                "licenseName": "CC BY-SA 4.0",
                "sourceLink": "https://lab.example.com/claims/1",
                "creator": "Jane Smith"
            },
            {
                "@id": "question-001",
                "@type": "Question",
                "title": "What limits migration?"
            },
            {
                "@id": "source-001",
                "@type": "Source",
                "title": "Research Dataset",
                "licenseName": "CC0 1.0",
                "sourceLink": "https://example.com/raw-data",
                "creator": "Lab Team"
            },
            {
                "@id": "evidence-003",
                "@type": "Evidence",
                "title": "Replication run",
                "licenseName": "CC BY 4.0",
                "sourceLink": "https://lab.example.com/dataset-003",
                "creator": "Alex Chen",
                "derivedFrom": "source-001"
            }
        ],
        "edges": [
            { "source": "evidence-001", "target": "source-001", "relation": "groundedIn" },
            { "source": "evidence-001", "target": "claim-001", "relation": "supports" },
            { "source": "question-001", "target": "evidence-001", "relation": "motivates" },
            { "source": "question-001", "target": "evidence-002", "relation": "motivates" }
        ]
    })
}

pub fn fixture_store() -> MemoryStore {
    MemoryStore::from_json_ld(&fixture_document().to_string()).unwrap()
}

/// Gateway over the fixture graph with an inspectable audit sink
pub fn fixture_gateway() -> (EnforcementGateway, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    let gateway = EnforcementGateway::new(Arc::new(fixture_store()), audit.clone());
    (gateway, audit)
}

pub fn ids(list: &[&str]) -> Vec<RecordId> {
    list.iter().map(|id| RecordId::from(*id)).collect()
}

/// Store whose every call times out
pub struct TimeoutStore;

impl RecordStore for TimeoutStore {
    fn fetch(&self, _id: &RecordId) -> StorageResult<Record> {
        Err(StorageError::Timeout(Duration::from_secs(5)))
    }

    fn traverse(&self, _spec: &EdgeSpec) -> StorageResult<Vec<Record>> {
        Err(StorageError::Timeout(Duration::from_secs(5)))
    }
}
