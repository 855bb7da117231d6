//! Attribution policy: classification, validation, and bundling
//!
//! `classify` decides whether a license encumbers a record, `validate`
//! checks the record against that decision, and a successful validation is
//! the only way to obtain an [`AttributionBundle`].

mod bundle;
mod license;
mod validator;

pub use bundle::{Attribution, AttributionBundle, Related};
pub use license::{classify, AttributionField, PolicyDecision};
pub use validator::{is_present, validate, DeficiencyReport};
