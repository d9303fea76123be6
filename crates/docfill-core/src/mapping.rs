//! Metadata values and the placeholder mapping built from them

use crate::error::{DocfillError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A scalar metadata value as supplied by the caller
///
/// Arrays and objects are not representable and fail to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Null => Ok(()),
            MetadataValue::Bool(true) => f.write_str("True"),
            MetadataValue::Bool(false) => f.write_str("False"),
            MetadataValue::Number(n) => write!(f, "{}", n),
            MetadataValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Number(value.into())
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MetadataValue::Null, Into::into)
    }
}

/// Caller-supplied key/value set
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Parse a metadata set from a JSON object
pub fn parse_metadata(json: &str) -> Result<Metadata> {
    serde_json::from_str(json)
        .map_err(|e| DocfillError::Validation(format!("invalid metadata: {}", e)))
}

/// Normalized `{{KEY}}` → replacement lookup, read-only once built
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMapping {
    entries: HashMap<String, String>,
}

impl PlaceholderMapping {
    /// Build the mapping: `key` becomes `{{KEY}}`, null values are dropped
    ///
    /// Keys that collide after upper-casing keep the value of the key that
    /// sorts last.
    pub fn build(metadata: &Metadata) -> Result<Self> {
        let entries: HashMap<String, String> = metadata
            .iter()
            .filter(|(_, value)| !matches!(value, MetadataValue::Null))
            .map(|(key, value)| (placeholder_for(key), value.to_string()))
            .collect();

        if entries.is_empty() {
            return Err(DocfillError::validation("empty metadata"));
        }

        Ok(Self { entries })
    }

    /// Look up a token exactly as written, then with its inner name upper-cased
    pub fn resolve(&self, token: &str) -> Option<&str> {
        if let Some(value) = self.entries.get(token) {
            return Some(value);
        }

        let inner = token.strip_prefix("{{")?.strip_suffix("}}")?;
        self.entries
            .get(&placeholder_for(inner))
            .map(String::as_str)
    }

    /// Exact-match lookup
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `nombre` → `{{NOMBRE}}`
fn placeholder_for(key: &str) -> String {
    format!("{{{{{}}}}}", key.to_uppercase())
}
