//! End-to-end enforcement scenarios over the fixture graph

mod common;

use common::{fixture_gateway, fixture_store, ids, TimeoutStore};
use mesa::{
    AttributionField, ChannelAuditSink, EdgeKind, EdgeSpec, EnforcementGateway, Expansion,
    ExportFormat, MemoryAuditSink, MesaConfig, Operation, Outcome, RecordId, RecordType,
    ReferenceContext, Rejection, RejectionKind, RenderFormat,
};
use std::sync::Arc;

fn context(pairs: &[(&str, &str)]) -> ReferenceContext {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// --- Retrieval scenarios ---

#[test]
fn attributed_cc_record_returns_its_attribution() {
    let (gateway, audit) = fixture_gateway();
    let bundle = gateway.retrieve(&"evidence-001".into()).unwrap();

    assert!(bundle.is_encumbered());
    assert_eq!(bundle.attribution().len(), 2);
    assert_eq!(
        bundle.attribution().get(&AttributionField::SourceLink).map(String::as_str),
        Some("https://lab.example.com/dataset-001")
    );
    assert_eq!(
        bundle.attribution().get(&AttributionField::Creator).map(String::as_str),
        Some("Jane Smith")
    );

    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, Operation::Retrieve);
    assert_eq!(events[0].outcome, Outcome::Allow);
}

#[test]
fn missing_creator_is_reported_by_name() {
    let (gateway, audit) = fixture_gateway();
    let err = gateway.retrieve(&"evidence-002".into()).unwrap_err();

    match &err {
        Rejection::DeficientAttribution(report) => {
            assert_eq!(report.record_id.as_str(), "evidence-002");
            assert_eq!(report.missing_fields, vec![AttributionField::Creator]);
            assert_eq!(report.license_name.as_deref(), Some("CC BY 4.0"));
        }
        other => panic!("expected DeficientAttribution, got {:?}", other),
    }
    assert!(err.to_string().contains("creator"));

    let events = audit.events();
    assert_eq!(events[0].outcome, Outcome::Deny);
    assert_eq!(events[0].missing_fields, vec![AttributionField::Creator]);
    assert_eq!(events[0].rejection, Some("deficient_attribution"));
}

#[test]
fn proprietary_record_passes_without_attribution() {
    let (gateway, _) = fixture_gateway();
    let bundle = gateway.retrieve(&"note-1".into()).unwrap();
    assert!(!bundle.is_encumbered());
    assert!(bundle.attribution().is_empty());
    assert_eq!(bundle.title(), Some("Internal note"));
}

#[test]
fn unknown_id_is_not_found() {
    let (gateway, _) = fixture_gateway();
    assert_eq!(
        gateway.retrieve(&"evidence-999".into()),
        Err(Rejection::NotFound("evidence-999".into()))
    );
}

#[test]
fn grounding_source_travels_with_the_record() {
    let (gateway, _) = fixture_gateway();
    let bundle = gateway.retrieve(&"evidence-001".into()).unwrap();

    // `supports` is not requested by default, only the grounding source
    assert_eq!(bundle.related().len(), 1);
    let source = &bundle.related()[0];
    assert_eq!(source.relation, EdgeKind::GroundedIn);
    assert_eq!(source.bundle.id().as_str(), "source-001");
    assert_eq!(source.bundle.creator(), Some("Lab Team"));
}

#[test]
fn derived_from_field_counts_as_grounding() {
    let (gateway, _) = fixture_gateway();
    let bundle = gateway.retrieve(&"evidence-003".into()).unwrap();
    assert_eq!(bundle.related().len(), 1);
    assert_eq!(bundle.related()[0].bundle.id().as_str(), "source-001");
}

#[test]
fn requested_relations_are_bundled() {
    let (gateway, _) = fixture_gateway();
    let expansion = Expansion::default().with_relation(EdgeKind::Supports);
    let bundle = gateway
        .retrieve_with(&"evidence-001".into(), &expansion)
        .unwrap();

    let related: Vec<&str> = bundle
        .related()
        .iter()
        .map(|r| r.bundle.id().as_str())
        .collect();
    assert!(related.contains(&"claim-001"));
    assert!(related.contains(&"source-001"));
}

// --- Batch and sequence ---

#[test]
fn export_is_all_or_nothing_but_query_is_per_element() {
    let (gateway, audit) = fixture_gateway();

    let err = gateway
        .export(&ids(&["evidence-001", "evidence-002"]), ExportFormat::Json)
        .unwrap_err();
    assert_eq!(err.kind(), RejectionKind::DeficientAttribution);
    assert_eq!(err.record_id().map(RecordId::as_str), Some("evidence-002"));
    assert_eq!(audit.len(), 1);

    let (accepted, rejected) = gateway
        .query(EdgeSpec::from("question-001").with_relation(EdgeKind::Motivates))
        .partition();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id().as_str(), "evidence-001");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].missing_fields(), &[AttributionField::Creator]);

    // One export event plus one per query element
    let events = audit.events();
    assert_eq!(events.len(), 3);
    assert!(events[1..].iter().all(|e| e.operation == Operation::Query));
}

#[test]
fn query_can_be_abandoned_early() {
    let (gateway, audit) = fixture_gateway();
    let first = gateway
        .query(EdgeSpec::from("question-001").with_relation(EdgeKind::Motivates))
        .next();
    assert!(first.is_some());
    assert_eq!(audit.len(), 1);
}

#[test]
fn query_filters_by_type_across_hops() {
    let (gateway, _) = fixture_gateway();
    let sources: Vec<_> = gateway
        .query(EdgeSpec::from("question-001").depth(2).of_type(RecordType::Source))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id().as_str(), "source-001");
}

#[test]
fn query_from_missing_origin_is_not_found() {
    let (gateway, _) = fixture_gateway();
    let results: Vec<_> = gateway.query(EdgeSpec::from("nowhere")).collect();
    assert_eq!(results, vec![Err(Rejection::NotFound("nowhere".into()))]);
}

// --- References ---

#[test]
fn reference_without_creator_is_rejected_for_valid_source() {
    let (gateway, audit) = fixture_gateway();
    let err = gateway
        .create_reference(
            &"evidence-001".into(),
            context(&[
                ("citation", "Smith 2024"),
                ("sourceLink", "https://lab.example.com/dataset-001"),
            ]),
        )
        .unwrap_err();

    assert_eq!(err.kind(), RejectionKind::ReferenceMissingAttribution);
    assert_eq!(err.missing_fields(), &[AttributionField::Creator]);
    assert_eq!(audit.events()[0].operation, Operation::CreateReference);
}

#[test]
fn reference_with_full_context_embeds_source_attribution() {
    let (gateway, _) = fixture_gateway();
    let reference = gateway
        .create_reference(
            &"evidence-001".into(),
            context(&[
                ("sourceLink", "https://lab.example.com/dataset-001"),
                ("creator", "Jane Smith"),
            ]),
        )
        .unwrap();
    assert_eq!(reference.attribution.len(), 2);

    let json = serde_json::to_value(&reference).unwrap();
    assert_eq!(json["source"], "evidence-001");
    assert_eq!(json["licenseName"], "CC BY 4.0");
    assert_eq!(json["attribution"]["creator"], "Jane Smith");
}

// --- Rendering ---

#[test]
fn rendering_is_gated_like_retrieval() {
    let (gateway, _) = fixture_gateway();
    let err = gateway
        .render(&"evidence-002".into(), RenderFormat::Html)
        .unwrap_err();
    assert_eq!(err.kind(), RejectionKind::DeficientAttribution);

    let html = gateway
        .render(&"evidence-001".into(), RenderFormat::Html)
        .unwrap();
    assert!(html.contains("Jane Smith"));
    assert!(html.contains("https://lab.example.com/dataset-001"));
}

// --- Upstream failures ---

#[test]
fn storage_timeout_surfaces_as_upstream_unavailable() {
    let audit = Arc::new(MemoryAuditSink::new());
    let gateway = EnforcementGateway::new(Arc::new(TimeoutStore), audit.clone());

    let err = gateway.retrieve(&"evidence-001".into()).unwrap_err();
    assert_eq!(err.kind(), RejectionKind::UpstreamUnavailable);
    assert_eq!(err.record_id().map(RecordId::as_str), Some("evidence-001"));
    assert!(err.missing_fields().is_empty());

    let err = gateway
        .export(&ids(&["evidence-001"]), ExportFormat::Json)
        .unwrap_err();
    assert_eq!(err.kind(), RejectionKind::UpstreamUnavailable);

    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.rejection == Some("upstream_unavailable")));
}

// --- Concurrency ---

#[test]
fn gateway_is_shared_across_threads() {
    let (gateway, audit) = fixture_gateway();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let gateway = &gateway;
            scope.spawn(move || {
                for _ in 0..25 {
                    assert!(gateway.retrieve(&"evidence-001".into()).is_ok());
                    assert!(gateway.retrieve(&"evidence-002".into()).is_err());
                }
            });
        }
    });

    let events = audit.events();
    assert_eq!(events.len(), 400);
    let denied = events.iter().filter(|e| e.outcome == Outcome::Deny).count();
    assert_eq!(denied, 200);
}

#[tokio::test]
async fn channel_sink_receives_every_decision() {
    let (sink, mut rx) = ChannelAuditSink::new();
    let gateway = EnforcementGateway::new(Arc::new(fixture_store()), Arc::new(sink));

    let _ = gateway.retrieve(&"evidence-001".into());
    let _ = gateway.retrieve(&"evidence-002".into());
    drop(gateway);

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.outcome, Outcome::Allow);
    assert_eq!(second.outcome, Outcome::Deny);
    assert!(rx.recv().await.is_none());
}

// --- Configuration ---

#[test]
fn config_drives_gateway_expansion() {
    let config = MesaConfig::from_yaml("expansion:\n  relations: [supports]\n  max_depth: 1\n").unwrap();
    let gateway = config.gateway(Arc::new(fixture_store()));

    let bundle = gateway.retrieve(&"evidence-001".into()).unwrap();
    assert_eq!(bundle.related().len(), 2);
    assert!(bundle.related().iter().all(|r| r.bundle.related().is_empty()));
}
