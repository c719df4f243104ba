// crates/resource-policy-client/src/queries.rs
// ============================================================================
// Module: Query Documents
// Description: Query documents and request builders for the policy service.
// Purpose: Keep the remote contract in one place.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The policy service exposes three operations: fetching the allow-list,
//! storing a batch of policy resources, and evaluating policies for a run.

use resource_policy_core::PolicyResource;
use serde_json::Value;

use crate::error::ClientError;
use crate::transport::QueryRequest;

// ============================================================================
// SECTION: Operation Names
// ============================================================================

/// Allow-list fetch operation.
pub const ALLOW_LIST_OPERATION: &str = "policyResourceAllowList";
/// Batch upload operation.
pub const STORE_RESOURCES_OPERATION: &str = "storePolicyResources";
/// Policy evaluation operation.
pub const EVALUATE_POLICIES_OPERATION: &str = "evaluatePolicies";

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Query fetching allow-lists for every approved resource type.
const ALLOW_LIST_QUERY: &str = r"
query {
  policyResourceAllowList {
    resourceType
    allowed
  }
}
";

/// Mutation storing a batch of policy resources.
const STORE_RESOURCES_MUTATION: &str = r"
mutation($policyResources: [PolicyResourceInput!]!) {
  storePolicyResources(policyResources: $policyResources) {
    sha
  }
}
";

/// Query evaluating tag and finops policies for a run.
const EVALUATE_POLICIES_QUERY: &str = r"
query($run: RunInput!) {
  evaluatePolicies(run: $run) {
    tagPolicyResults {
      name
      tagPolicyId
      message
      prComment
      blockPr
      totalDetectedResources
      totalTaggableResources
      resources {
        address
        resourceType
        path
        line
        projectNames
        missingMandatoryTags
        invalidTags {
          key
          value
          validValues
          validRegex
        }
      }
    }
    finopsPolicyResults {
      name
      policyId
      message
      blockPr
      prComment
      totalApplicableResources
      resources {
        checksum
        address
        resourceType
        path
        startLine
        endLine
        projectName
        issues {
          attribute
          value
          description
        }
        exclusionId
      }
    }
  }
}
";

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds the allow-list fetch request.
#[must_use]
pub fn allow_list_request() -> QueryRequest {
    QueryRequest::new(ALLOW_LIST_QUERY)
}

/// Builds the batch upload request.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] when the batch cannot be encoded.
pub fn store_resources_request(batch: &[PolicyResource]) -> Result<QueryRequest, ClientError> {
    let resources = serde_json::to_value(batch)
        .map_err(|err| ClientError::decode(STORE_RESOURCES_OPERATION, err))?;
    Ok(QueryRequest::new(STORE_RESOURCES_MUTATION).with_variable("policyResources", resources))
}

/// Builds the policy evaluation request for `run`.
#[must_use]
pub fn evaluate_policies_request(run: &Value) -> QueryRequest {
    QueryRequest::new(EVALUATE_POLICIES_QUERY).with_variable("run", run.clone())
}
