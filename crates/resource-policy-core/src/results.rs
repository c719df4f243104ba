// crates/resource-policy-core/src/results.rs
// ============================================================================
// Module: Policy Results
// Description: Typed tag-policy and finops-policy evaluation results.
// Purpose: Give callers structured access to remote policy outcomes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These types mirror the remote policy-evaluation response. Missing and
//! `null` fields decode to defaults and unknown fields are ignored; the policy
//! semantics themselves live on the remote side.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

// ============================================================================
// SECTION: Null Handling
// ============================================================================

/// Reads an explicit `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SECTION: Tag Policies
// ============================================================================

/// Tag with a value outside the policy's accepted set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvalidTag {
    /// Tag key.
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    /// Offending value.
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    /// Accepted values, when the policy enumerates them.
    #[serde(deserialize_with = "null_as_default")]
    pub valid_values: Vec<String>,
    /// Accepted pattern, when the policy uses one.
    #[serde(deserialize_with = "null_as_default")]
    pub valid_regex: String,
}

/// Resource flagged by a tag policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagPolicyResource {
    /// Resource address.
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    /// Resource type.
    #[serde(deserialize_with = "null_as_default")]
    pub resource_type: String,
    /// Source path.
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    /// Source line.
    #[serde(deserialize_with = "null_as_default")]
    pub line: i64,
    /// Projects containing the resource.
    #[serde(deserialize_with = "null_as_default")]
    pub project_names: Vec<String>,
    /// Mandatory tags that are missing.
    #[serde(deserialize_with = "null_as_default")]
    pub missing_mandatory_tags: Vec<String>,
    /// Tags with invalid values.
    #[serde(deserialize_with = "null_as_default")]
    pub invalid_tags: Vec<InvalidTag>,
}

/// Tag policy evaluation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagPolicy {
    /// Policy name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Policy identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub tag_policy_id: String,
    /// Policy message.
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    /// Whether the result is posted as a pull request comment.
    #[serde(deserialize_with = "null_as_default")]
    pub pr_comment: bool,
    /// Whether the result blocks the pull request.
    #[serde(deserialize_with = "null_as_default")]
    pub block_pr: bool,
    /// Resources the policy detected.
    #[serde(deserialize_with = "null_as_default")]
    pub total_detected_resources: i64,
    /// Resources the policy could evaluate.
    #[serde(deserialize_with = "null_as_default")]
    pub total_taggable_resources: i64,
    /// Failing resources.
    #[serde(deserialize_with = "null_as_default")]
    pub resources: Vec<TagPolicyResource>,
}

// ============================================================================
// SECTION: FinOps Policies
// ============================================================================

/// Single finops issue on a resource attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinOpsIssue {
    /// Attribute path.
    #[serde(deserialize_with = "null_as_default")]
    pub attribute: String,
    /// Offending value.
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    /// Issue description.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// Resource flagged by a finops policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinOpsPolicyResource {
    /// Resource checksum as uploaded.
    #[serde(deserialize_with = "null_as_default")]
    pub checksum: String,
    /// Resource address.
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    /// Resource type.
    #[serde(deserialize_with = "null_as_default")]
    pub resource_type: String,
    /// Source path.
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    /// First source line.
    #[serde(deserialize_with = "null_as_default")]
    pub start_line: i64,
    /// Last source line.
    #[serde(deserialize_with = "null_as_default")]
    pub end_line: i64,
    /// Project containing the resource.
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,
    /// Issues found on the resource.
    #[serde(deserialize_with = "null_as_default")]
    pub issues: Vec<FinOpsIssue>,
    /// Exclusion identifier when the resource is excluded.
    #[serde(deserialize_with = "null_as_default")]
    pub exclusion_id: String,
}

/// FinOps policy evaluation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinOpsPolicy {
    /// Policy name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Policy identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub policy_id: String,
    /// Policy message.
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    /// Whether the result blocks the pull request.
    #[serde(deserialize_with = "null_as_default")]
    pub block_pr: bool,
    /// Whether the result is posted as a pull request comment.
    #[serde(deserialize_with = "null_as_default")]
    pub pr_comment: bool,
    /// Resources the policy applies to.
    #[serde(deserialize_with = "null_as_default")]
    pub total_applicable_resources: i64,
    /// Failing resources.
    #[serde(deserialize_with = "null_as_default")]
    pub resources: Vec<FinOpsPolicyResource>,
}

// ============================================================================
// SECTION: Policy Output
// ============================================================================

/// Results of one policy check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyOutput {
    /// Tag policy results in response order.
    #[serde(deserialize_with = "null_as_default")]
    pub tag_policies: Vec<TagPolicy>,
    /// FinOps policy results in response order.
    #[serde(deserialize_with = "null_as_default")]
    pub finops_policies: Vec<FinOpsPolicy>,
}
