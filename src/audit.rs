//! Audit hook for enforcement decisions
//!
//! The gateway emits one `AuditEvent` per decision. Sinks are fire-and-forget:
//! `record` never fails and never blocks the decision it describes.

use crate::policy::AttributionField;
use crate::record::RecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Boundary operation that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Retrieve,
    CreateReference,
    Query,
    Render,
    Export,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Retrieve => "retrieve",
            Self::CreateReference => "create_reference",
            Self::Query => "query",
            Self::Render => "render",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Allow,
    Deny,
}

/// One enforcement decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub operation: Operation,
    /// Subject records: the requested ids on allow, the offending id on deny
    pub record_ids: Vec<RecordId>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<AttributionField>,
    /// Rejection kind tag on deny
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<&'static str>,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn allow(operation: Operation, record_ids: Vec<RecordId>) -> Self {
        Self {
            operation,
            record_ids,
            outcome: Outcome::Allow,
            missing_fields: Vec::new(),
            rejection: None,
            at: Utc::now(),
        }
    }

    pub fn deny(
        operation: Operation,
        record_ids: Vec<RecordId>,
        rejection: &'static str,
        missing_fields: Vec<AttributionField>,
    ) -> Self {
        Self {
            operation,
            record_ids,
            outcome: Outcome::Deny,
            missing_fields,
            rejection: Some(rejection),
            at: Utc::now(),
        }
    }
}

/// Receiver of enforcement decisions
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Writes each event as a structured log line on the `mesa::audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        let ids: Vec<&str> = event.record_ids.iter().map(|id| id.as_str()).collect();
        let missing: Vec<&str> = event.missing_fields.iter().map(|f| f.as_str()).collect();
        match event.outcome {
            Outcome::Allow => tracing::info!(
                target: "mesa::audit",
                operation = %event.operation,
                records = ?ids,
                "allow"
            ),
            Outcome::Deny => tracing::info!(
                target: "mesa::audit",
                operation = %event.operation,
                records = ?ids,
                rejection = event.rejection.unwrap_or("unknown"),
                missing = ?missing,
                "deny"
            ),
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: AuditEvent) {}
}

/// Forwards events to an unbounded tokio channel.
///
/// Sending never blocks and needs no runtime; a dropped receiver only
/// discards events.
#[derive(Debug, Clone)]
pub struct ChannelAuditSink {
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl ChannelAuditSink {
    /// Create a sink and the receiver that drains it
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(&self, event: AuditEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(target: "mesa::audit", "audit receiver closed; event dropped");
        }
    }
}

/// Keeps events in memory for inspection
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
