//! Records and pages as returned by the admin API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One resource record, relayed verbatim from source to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wraps a JSON object.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The record's `id`, rendered as a string. Numeric ids are accepted.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Identifier for log lines and error context.
    #[must_use]
    pub fn display_id(&self) -> String {
        self.id().unwrap_or_else(|| "<no id>".to_string())
    }

    /// Field lookup.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Underlying JSON object.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One page of a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Records of this page, in source order. Required: a body without
    /// `data` is not a page.
    #[serde(deserialize_with = "records_or_empty_object")]
    pub data: Vec<Record>,
    /// Reference to the following page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

/// Some server versions encode an empty `data` list as `{}`.
fn records_or_empty_object<'de, D>(deserializer: D) -> std::result::Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Data {
        List(Vec<Record>),
        Object(Map<String, Value>),
        Null(()),
    }

    match Data::deserialize(deserializer)? {
        Data::List(records) => Ok(records),
        Data::Object(map) if map.is_empty() => Ok(Vec::new()),
        Data::Object(_) => Err(serde::de::Error::custom(
            "expected `data` to be a list of records",
        )),
        Data::Null(()) => Ok(Vec::new()),
    }
}
