// crates/resource-policy-core/src/resource.rs
// ============================================================================
// Module: Resource Records
// Description: Input model for infrastructure resources read by the pipeline.
// Purpose: Carry raw values, tags, references, and source metadata.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ResourceRecord`] is owned by the upstream resource graph; this crate
//! only reads it. Raw values keep their original serialization alongside the
//! parsed tree because the checksum is computed over the original bytes.
//! References are address handles to other resources in the same project.
//! Invariants:
//! - `tags = None` and `tags = Some(empty)` are distinct states.
//! - [`RawValues::raw`] is byte-identical to the text the record was read from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use serde_json::value::RawValue;

// ============================================================================
// SECTION: Raw Values
// ============================================================================

/// Raw resource values with their original JSON text.
///
/// # Invariants
/// - `value` is the parse of `raw`; an empty `raw` pairs with `Value::Null`.
/// - Deserialization captures the input text verbatim, which requires the
///   `serde_json` text deserializer (`from_str`/`from_slice`/`from_reader`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawValues {
    /// Original JSON text.
    raw: String,
    /// Parsed value tree.
    value: Value,
}

impl RawValues {
    /// Parses raw JSON text, keeping the text as-is.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the text is not valid JSON.
    pub fn from_json(raw: impl Into<String>) -> Result<Self, serde_json::Error> {
        let raw = raw.into();
        let value = serde_json::from_str(&raw)?;
        Ok(Self {
            raw,
            value,
        })
    }

    /// Returns the original JSON text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed value tree.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

impl<'de> Deserialize<'de> for RawValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Self::from_json(raw.get()).map_err(serde::de::Error::custom)
    }
}

impl Serialize for RawValues {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.raw.is_empty() {
            return serializer.serialize_none();
        }
        let raw = RawValue::from_string(self.raw.clone()).map_err(serde::ser::Error::custom)?;
        raw.serialize(serializer)
    }
}

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Source location of a module call that produced a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCall {
    /// File containing the call.
    pub filename: String,
    /// Called block name.
    pub block_name: String,
    /// First line of the call.
    pub start_line: i64,
    /// Last line of the call.
    pub end_line: i64,
}

/// Free-form resource metadata.
///
/// Lookups of missing or mistyped keys fall back to empty strings and zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMetadata {
    /// Metadata entries.
    entries: Map<String, Value>,
}

impl ResourceMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a metadata entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Returns a raw metadata entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the upstream checksum, or `""` when absent.
    #[must_use]
    pub fn checksum(&self) -> &str {
        str_field(self.entries.get("checksum"))
    }

    /// Returns the source filename, or `""` when absent.
    #[must_use]
    pub fn filename(&self) -> &str {
        str_field(self.entries.get("filename"))
    }

    /// Returns the first source line, or `0` when absent.
    #[must_use]
    pub fn start_line(&self) -> i64 {
        int_field(self.entries.get("startLine"))
    }

    /// Returns the last source line, or `0` when absent.
    #[must_use]
    pub fn end_line(&self) -> i64 {
        int_field(self.entries.get("endLine"))
    }

    /// Returns the module call chain in source order.
    #[must_use]
    pub fn calls(&self) -> Vec<MetadataCall> {
        let Some(Value::Array(calls)) = self.entries.get("calls") else {
            return Vec::new();
        };
        calls
            .iter()
            .map(|call| MetadataCall {
                filename: str_field(call.get("filename")).to_string(),
                block_name: str_field(call.get("blockName")).to_string(),
                start_line: int_field(call.get("startLine")),
                end_line: int_field(call.get("endLine")),
            })
            .collect()
    }
}

/// Reads a string entry, defaulting to `""`.
fn str_field(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or_default()
}

/// Reads an integer entry, accepting numeric strings and defaulting to `0`.
fn int_field(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number.as_i64().unwrap_or_default(),
        Some(Value::String(text)) => text.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

// ============================================================================
// SECTION: Resource Record
// ============================================================================

/// A single infrastructure resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Resource type, e.g. `aws_instance`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Provider name, e.g. `aws`.
    #[serde(default)]
    pub provider_name: String,
    /// Address, unique within a project.
    pub address: String,
    /// Resource tags; `None` when the resource does not support tags.
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Raw attribute values.
    #[serde(default)]
    pub raw_values: RawValues,
    /// Referenced resource addresses keyed by reference name.
    #[serde(default, rename = "referencesMap")]
    pub references: BTreeMap<String, Vec<String>>,
    /// Source metadata.
    #[serde(default)]
    pub metadata: ResourceMetadata,
}

impl ResourceRecord {
    /// Creates a record with no tags, values, references, or metadata.
    #[must_use]
    pub fn new(
        resource_type: impl Into<String>,
        provider_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            provider_name: provider_name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(|(key, value)| (key.into(), value.into())).collect());
        self
    }

    /// Sets the raw values.
    #[must_use]
    pub fn with_raw_values(mut self, raw_values: RawValues) -> Self {
        self.raw_values = raw_values;
        self
    }

    /// Adds a reference key with its referenced addresses.
    #[must_use]
    pub fn with_reference<I, S>(mut self, key: impl Into<String>, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references.insert(key.into(), addresses.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ResourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
