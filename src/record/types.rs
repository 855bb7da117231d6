//! Record representation in the research graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a record
///
/// Serializes as a plain string (the JSON-LD `@id`, e.g. "pages:evidence-001")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a RecordId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Discourse type of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Evidence,
    Claim,
    Question,
    Source,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Evidence => "Evidence",
            Self::Claim => "Claim",
            Self::Question => "Question",
            Self::Source => "Source",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evidence" => Ok(Self::Evidence),
            "claim" => Ok(Self::Claim),
            "question" => Ok(Self::Question),
            "source" => Ok(Self::Source),
            _ => Err(format!("unknown record type: {}", s)),
        }
    }
}

/// Typed content values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
    Null,
}

impl FieldValue {
    /// The string payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("null"),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(std::fmt::Error),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Content fields collection
pub type Content = BTreeMap<String, FieldValue>;

/// License and attribution metadata carried by a record
///
/// All fields are optional on the wire; which of them are mandatory is
/// decided by the license policy, not by the data model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rights_statement: Option<String>,
}

impl License {
    /// License with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            license_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.license_link = Some(link.into());
        self
    }

    pub fn with_source_link(mut self, link: impl Into<String>) -> Self {
        self.source_link = Some(link.into());
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn with_attribution_statement(mut self, statement: impl Into<String>) -> Self {
        self.attribution_statement = Some(statement.into());
        self
    }

    pub fn with_rights_statement(mut self, statement: impl Into<String>) -> Self {
        self.rights_statement = Some(statement.into());
        self
    }
}

/// A typed research record
///
/// Deserializes from a JSON-LD node: `@id` and `@type` are the identity,
/// license fields sit at the top level, and every other key is content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "@id")]
    id: RecordId,
    #[serde(rename = "@type")]
    record_type: RecordType,
    #[serde(flatten)]
    license: License,
    #[serde(flatten)]
    content: Content,
}

impl Record {
    /// Create a record with no license and no content
    pub fn new(id: impl Into<RecordId>, record_type: RecordType) -> Self {
        Self {
            id: id.into(),
            record_type,
            license: License::default(),
            content: Content::new(),
        }
    }

    /// Set the license block
    pub fn with_license(mut self, license: License) -> Self {
        self.license = license;
        self
    }

    /// Add a content field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn license(&self) -> &License {
        &self.license
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The `title` content field, when it is a string
    pub fn title(&self) -> Option<&str> {
        self.content.get("title").and_then(FieldValue::as_str)
    }
}
