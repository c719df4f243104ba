// crates/resource-policy-core/src/policy_resource.rs
// ============================================================================
// Module: Policy Resources
// Description: Wire representation of a filtered resource and its transformer.
// Purpose: Convert resource records into privacy-filtered, byte-stable output.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`transform_resource`] turns one [`ResourceRecord`] into a [`PolicyResource`]:
//! tags become a key-sorted list, raw values pass through the value filter and
//! are serialized with sorted keys, references become a key-sorted list of
//! address lists, and metadata (sent as `infracostMetadata`) carries the
//! checksum.
//! Invariants:
//! - Absent tags are omitted from the wire shape; empty tags serialize as `[]`.
//! - `values` is byte-stable for identical inputs.
//! - Serialization failures degrade `values` to `null` and never abort.
//! - An empty call chain serializes as `calls: null`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::value::RawValue;
use serde_json::value::to_raw_value;

use crate::allow_list::AllowListTree;
use crate::events::EVENT_VALUES_SERIALIZATION_FAILED;
use crate::events::EventSink;
use crate::events::LogEvent;
use crate::filter::filter_values;
use crate::hashing::resource_checksum;
use crate::resource::ResourceRecord;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Tag key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// Reference key with the referenced addresses in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyReference {
    /// Reference key.
    pub key: String,
    /// Referenced resource addresses.
    pub addresses: Vec<String>,
}

/// Call-chain entry in resource metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMetadataCall {
    /// Source filename.
    pub filename: String,
    /// Called block name.
    pub block_name: String,
    /// First source line.
    pub start_line: i64,
    /// Last source line.
    pub end_line: i64,
}

/// Resource metadata sent with each policy resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMetadata {
    /// Module call chain; `None` (serialized as `null`) when there are no calls.
    pub calls: Option<Vec<PolicyMetadataCall>>,
    /// Resource checksum (lowercase hex).
    pub checksum: String,
    /// Last source line.
    pub end_line: i64,
    /// Source filename.
    pub filename: String,
    /// First source line.
    pub start_line: i64,
}

/// Filtered, canonicalized resource ready for upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResource {
    /// Resource type.
    pub resource_type: String,
    /// Provider name.
    pub provider_name: String,
    /// Resource address.
    pub address: String,
    /// Key-sorted tags; `None` when the source resource had no tags field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<PolicyTag>>,
    /// Filtered values as key-sorted JSON.
    pub values: Box<RawValue>,
    /// Key-sorted references.
    pub references: Vec<PolicyReference>,
    /// Source metadata and checksum.
    #[serde(rename = "infracostMetadata")]
    pub metadata: PolicyMetadata,
}

impl PolicyResource {
    /// Returns the serialized filtered values.
    #[must_use]
    pub fn values_json(&self) -> &str {
        self.values.get()
    }
}

// ============================================================================
// SECTION: Transformer
// ============================================================================

/// Converts a resource record into its filtered wire representation.
///
/// Uses the upstream checksum when present and computes one from the raw
/// values otherwise.
#[must_use]
pub fn transform_resource(
    resource: &ResourceRecord,
    tree: &AllowListTree,
    events: &dyn EventSink,
) -> PolicyResource {
    let tags = resource.tags.as_ref().map(|tags| {
        let mut list: Vec<PolicyTag> = tags
            .iter()
            .map(|(key, value)| PolicyTag {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        list.sort_by(|left, right| left.key.cmp(&right.key));
        list
    });

    let filtered = Value::Object(filter_values(resource.raw_values.value(), tree, events));
    let values = encode_values(&filtered, &resource.address, events);

    // BTreeMap iteration yields reference keys in sorted order.
    let references = resource
        .references
        .iter()
        .map(|(key, addresses)| PolicyReference {
            key: key.clone(),
            addresses: addresses.clone(),
        })
        .collect();

    let metadata = &resource.metadata;
    // Each call entry reuses the resource's own filename and line range.
    let calls: Vec<PolicyMetadataCall> = metadata
        .calls()
        .into_iter()
        .map(|call| PolicyMetadataCall {
            filename: metadata.filename().to_string(),
            block_name: call.block_name,
            start_line: metadata.start_line(),
            end_line: metadata.end_line(),
        })
        .collect();
    let calls = (!calls.is_empty()).then_some(calls);

    let checksum = match metadata.checksum() {
        "" => resource_checksum(resource),
        upstream => upstream.to_string(),
    };

    PolicyResource {
        resource_type: resource.resource_type.clone(),
        provider_name: resource.provider_name.clone(),
        address: resource.address.clone(),
        tags,
        values,
        references,
        metadata: PolicyMetadata {
            calls,
            checksum,
            end_line: metadata.end_line(),
            filename: metadata.filename().to_string(),
            start_line: metadata.start_line(),
        },
    }
}

/// Encodes filtered values, degrading to `null` with a warning on failure.
///
/// A filtered [`Value`] always encodes; other inputs can fail, e.g. maps with
/// non-string keys.
pub(crate) fn encode_values<T>(
    values: &T,
    address: &str,
    events: &dyn EventSink,
) -> Box<RawValue>
where
    T: Serialize + ?Sized,
{
    match to_raw_value(values) {
        Ok(encoded) => encoded,
        Err(err) => {
            events.record(
                &LogEvent::warn(
                    EVENT_VALUES_SERIALIZATION_FAILED,
                    "Failed to marshal filtered values",
                )
                .with_field("address", address)
                .with_field("error", err.to_string()),
            );
            RawValue::NULL.to_owned()
        }
    }
}
