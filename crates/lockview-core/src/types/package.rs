//! Registry package metadata.
//!
//! The registry's `/<name>/latest` document is kept as an open JSON object so
//! that every field the registry sends survives a trip through the cache file
//! untouched. Only `name` and `version` are interpreted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LockviewError;

/// Latest-version metadata for one package, as returned by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct PackageMetadata {
    fields: Map<String, Value>,
}

impl PackageMetadata {
    /// Create metadata holding only the guaranteed fields
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        fields.insert("version".to_string(), Value::String(version.into()));
        Self { fields }
    }

    /// Validate an arbitrary JSON document as package metadata
    pub fn from_value(value: Value) -> Result<Self, LockviewError> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(LockviewError::InvalidMetadata {
                name: String::new(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    /// Package name, empty if the registry omitted it
    pub fn name(&self) -> &str {
        self.fields.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    /// Published version (always non-empty)
    pub fn version(&self) -> &str {
        self.fields.get("version").and_then(Value::as_str).unwrap_or_default()
    }

    /// Raw access to any registry-supplied field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set or replace a field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// All fields in registry order
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for PackageMetadata {
    type Error = LockviewError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match fields.get("version") {
            Some(Value::String(version)) if !version.trim().is_empty() => Ok(Self { fields }),
            Some(Value::String(_)) => Err(LockviewError::InvalidMetadata {
                name,
                reason: "empty version field".to_string(),
            }),
            Some(other) => Err(LockviewError::InvalidMetadata {
                name,
                reason: format!("version field is a {}, not a string", json_kind(other)),
            }),
            None => Err(LockviewError::InvalidMetadata {
                name,
                reason: "missing version field".to_string(),
            }),
        }
    }
}

impl From<PackageMetadata> for Map<String, Value> {
    fn from(metadata: PackageMetadata) -> Self {
        metadata.fields
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
