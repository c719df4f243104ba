// crates/resource-policy-client/src/decode.rs
// ============================================================================
// Module: Result Decoder
// Description: All-or-nothing decoding of policy service response envelopes.
// Purpose: Turn envelopes into allow-lists, shas, and policy output.
// Dependencies: resource-policy-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every envelope is checked for an `errors` field first; if one is present
//! (even `null`) the call fails with the raw errors text and nothing is
//! decoded. A `null` `data` payload or a missing operation key decodes to the
//! empty result for that operation; any other non-object `data` is malformed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use resource_policy_core::AllowListTree;
use resource_policy_core::AllowLists;
use resource_policy_core::FinOpsPolicy;
use resource_policy_core::PolicyOutput;
use resource_policy_core::TagPolicy;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::queries::ALLOW_LIST_OPERATION;
use crate::queries::EVALUATE_POLICIES_OPERATION;
use crate::queries::STORE_RESOURCES_OPERATION;

// ============================================================================
// SECTION: Payload Types
// ============================================================================

/// Allow-list entry for one resource type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowListEntry {
    /// Resource type the rules apply to.
    pub resource_type: String,
    /// Rule tree, either inline JSON or a JSON-encoded string.
    #[serde(default)]
    pub allowed: Value,
}

/// Batch upload result.
#[derive(Debug, Default, Deserialize)]
struct StoreResult {
    /// Sha assigned to the stored batch.
    #[serde(default)]
    sha: Option<String>,
}

/// Policy evaluation result.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResult {
    /// Tag policy results.
    #[serde(default)]
    tag_policy_results: Option<Vec<TagPolicy>>,
    /// FinOps policy results.
    #[serde(default)]
    finops_policy_results: Option<Vec<FinOpsPolicy>>,
}

// ============================================================================
// SECTION: Envelope Handling
// ============================================================================

/// Extracts and decodes the payload of `operation` from an envelope.
fn operation_payload<T>(envelope: &Value, operation: &'static str) -> Result<T, ClientError>
where
    T: DeserializeOwned + Default,
{
    if let Some(errors) = envelope.get("errors") {
        return Err(ClientError::Remote {
            operation,
            errors: errors.to_string(),
        });
    }
    let data = envelope
        .get("data")
        .ok_or_else(|| ClientError::decode(operation, "response envelope has no data"))?;
    let fields = match data {
        Value::Null => return Ok(T::default()),
        Value::Object(fields) => fields,
        _ => return Err(ClientError::decode(operation, "response data is not an object")),
    };
    match fields.get(operation) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(payload) => T::deserialize(payload).map_err(|err| ClientError::decode(operation, err)),
    }
}

// ============================================================================
// SECTION: Decoders
// ============================================================================

/// Decodes the allow-list fetch envelope.
///
/// # Errors
///
/// Returns [`ClientError`] when the envelope carries errors or malformed data.
pub fn decode_allow_lists(envelope: &Value) -> Result<AllowLists, ClientError> {
    let entries: Option<Vec<AllowListEntry>> =
        operation_payload(envelope, ALLOW_LIST_OPERATION)?;
    allow_lists_from_entries(entries.unwrap_or_default())
}

/// Builds allow-lists from resource-type entries.
///
/// String-valued rule trees are parsed as JSON; later entries for the same
/// resource type replace earlier ones.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] when a string-valued rule tree is not JSON.
pub fn allow_lists_from_entries(entries: Vec<AllowListEntry>) -> Result<AllowLists, ClientError> {
    let mut lists = AllowLists::new();
    for entry in entries {
        let tree = match &entry.allowed {
            Value::String(encoded) => {
                let parsed: Value = serde_json::from_str(encoded).map_err(|err| {
                    ClientError::decode(
                        ALLOW_LIST_OPERATION,
                        format!("allow-list for {}: {err}", entry.resource_type),
                    )
                })?;
                AllowListTree::from_value(&parsed)
            }
            other => AllowListTree::from_value(other),
        };
        lists.insert(entry.resource_type, tree);
    }
    Ok(lists)
}

/// Decodes the batch upload envelope into the stored sha.
///
/// # Errors
///
/// Returns [`ClientError`] when the envelope carries errors or malformed data.
pub fn decode_store_sha(envelope: &Value) -> Result<String, ClientError> {
    let result: StoreResult = operation_payload(envelope, STORE_RESOURCES_OPERATION)?;
    Ok(result.sha.unwrap_or_default())
}

/// Decodes the policy evaluation envelope.
///
/// # Errors
///
/// Returns [`ClientError`] when the envelope carries errors or malformed data.
pub fn decode_policy_output(envelope: &Value) -> Result<PolicyOutput, ClientError> {
    let result: EvaluateResult = operation_payload(envelope, EVALUATE_POLICIES_OPERATION)?;
    Ok(PolicyOutput {
        tag_policies: result.tag_policy_results.unwrap_or_default(),
        finops_policies: result.finops_policy_results.unwrap_or_default(),
    })
}
