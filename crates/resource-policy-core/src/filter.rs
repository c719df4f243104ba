// crates/resource-policy-core/src/filter.rs
// ============================================================================
// Module: Value Filter
// Description: Recursive allow-list filtering over schema-less JSON values.
// Purpose: Guarantee that only allow-listed fields leave the local machine.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`filter_values`] walks a raw value tree alongside an [`AllowListTree`] and
//! keeps only fields the tree names. Boolean `true` leaves copy the raw field
//! verbatim, nested trees recurse into objects (or element-wise into arrays),
//! and everything else is dropped.
//! Invariants:
//! - A field absent from the tree never appears in the output.
//! - Array order is preserved; arrays are never re-sorted.
//! - Output depends only on the inputs, so repeated runs are identical.
//!
//! [`to_sorted_json`] serializes with object keys sorted at every depth and
//! numbers written exactly as they appeared in the input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::allow_list::AllowListTree;
use crate::allow_list::AllowRule;
use crate::events::EVENT_UNKNOWN_ALLOW_RULE;
use crate::events::EventSink;
use crate::events::LogEvent;

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Filters `value` down to the fields permitted by `tree`.
///
/// Non-object inputs yield an empty object. Unknown rule shapes are reported
/// to `events` as [`EVENT_UNKNOWN_ALLOW_RULE`] and the field is skipped.
#[must_use]
pub fn filter_values(
    value: &Value,
    tree: &AllowListTree,
    events: &dyn EventSink,
) -> Map<String, Value> {
    let mut filtered = Map::new();
    let Value::Object(fields) = value else {
        return filtered;
    };
    for (key, field) in fields {
        let Some(rule) = tree.rule(key) else {
            continue;
        };
        match rule {
            AllowRule::Include(true) => {
                filtered.insert(key.clone(), field.clone());
            }
            AllowRule::Include(false) => {}
            AllowRule::Nested(nested) => {
                filtered.insert(key.clone(), filter_nested(field, nested, events));
            }
            AllowRule::Unsupported(kind) => {
                events.record(
                    &LogEvent::warn(EVENT_UNKNOWN_ALLOW_RULE, "Unknown allow type")
                        .with_field("key", key.as_str())
                        .with_field("rule_type", kind.as_str()),
                );
            }
        }
    }
    filtered
}

/// Applies a nested tree to an object or element-wise to an array.
fn filter_nested(field: &Value, nested: &AllowListTree, events: &dyn EventSink) -> Value {
    match field {
        Value::Array(items) => Value::Array(
            items.iter().map(|item| Value::Object(filter_values(item, nested, events))).collect(),
        ),
        other => Value::Object(filter_values(other, nested, events)),
    }
}

// ============================================================================
// SECTION: Sorted Serialization
// ============================================================================

/// Serializes a value as compact JSON with object keys sorted at every level.
///
/// `serde_json::Map` is `BTreeMap`-backed while the `preserve_order` feature
/// stays off, and `arbitrary_precision` keeps number text as read, so the
/// serializer emits sorted keys and verbatim scalars on its own.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when the value cannot be encoded.
pub fn to_sorted_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}
