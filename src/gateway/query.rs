//! Lazy, per-element enforcement over traversal results

use super::{EnforcementGateway, Rejection};
use crate::audit::Operation;
use crate::policy::AttributionBundle;
use crate::record::Record;
use crate::storage::EdgeSpec;

enum State {
    Pending(EdgeSpec),
    Running(std::vec::IntoIter<Record>),
    Done,
}

/// Results of [`EnforcementGateway::query`].
///
/// Nothing is fetched until the first `next()`. Each element is validated
/// and expanded independently, so dropping the iterator early leaves the
/// remaining matches untouched. A traversal that matches nothing records a
/// single allow event for the origin.
pub struct QueryResults {
    gateway: EnforcementGateway,
    state: State,
}

impl QueryResults {
    pub(super) fn new(gateway: EnforcementGateway, spec: EdgeSpec) -> Self {
        Self {
            gateway,
            state: State::Pending(spec),
        }
    }

    /// Split into accepted bundles and rejections
    pub fn partition(self) -> (Vec<AttributionBundle>, Vec<Rejection>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for result in self {
            match result {
                Ok(bundle) => accepted.push(bundle),
                Err(rejection) => rejected.push(rejection),
            }
        }
        (accepted, rejected)
    }
}

impl Iterator for QueryResults {
    type Item = Result<AttributionBundle, Rejection>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending(spec) => match self.gateway.store.traverse(&spec) {
                    Ok(records) if records.is_empty() => {
                        // The call still ran, so it still leaves a trace
                        self.gateway.audit_call(
                            Operation::Query,
                            std::slice::from_ref(&spec.origin),
                            &Ok::<(), Rejection>(()),
                        );
                        return None;
                    }
                    Ok(records) => self.state = State::Running(records.into_iter()),
                    Err(e) => {
                        let result = Err(Rejection::from_storage(e, Some(&spec.origin)));
                        self.gateway.audit_call(
                            Operation::Query,
                            std::slice::from_ref(&spec.origin),
                            &result,
                        );
                        return Some(result);
                    }
                },
                State::Running(mut records) => {
                    let record = records.next()?;
                    self.state = State::Running(records);

                    let result = self.gateway.bundle_record(&record, &self.gateway.expansion);
                    self.gateway.audit_call(
                        Operation::Query,
                        std::slice::from_ref(record.id()),
                        &result,
                    );
                    return Some(result);
                }
                State::Done => return None,
            }
        }
    }
}

impl std::fmt::Debug for QueryResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Pending(_) => "pending",
            State::Running(records) => {
                return f
                    .debug_struct("QueryResults")
                    .field("remaining", &records.len())
                    .finish()
            }
            State::Done => "done",
        };
        f.debug_struct("QueryResults").field("state", &state).finish()
    }
}
