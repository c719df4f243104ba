// crates/resource-policy-core/src/project.rs
// ============================================================================
// Module: Projects
// Description: Project-level resource sets and policy upload metadata.
// Purpose: Group current and past resources with the shas assigned on upload.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Project`] holds the current resource set and the past (baseline)
//! resource set. Uploads record a sha per set in [`ProjectMetadata`].
//! Invariants:
//! - `None` means policy upload never ran for that set.
//! - [`crate::POLICY_SHA_PLACEHOLDER`] means it ran with nothing to upload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::resource::ResourceRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Shas assigned to a project's uploaded resource sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Sha of the uploaded current resource set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_sha: Option<String>,
    /// Sha of the uploaded past resource set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_policy_sha: Option<String>,
}

/// A project's current and past resource sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// Current resources.
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
    /// Past (baseline) resources.
    #[serde(default)]
    pub past_resources: Vec<ResourceRecord>,
    /// Upload metadata.
    #[serde(default)]
    pub metadata: ProjectMetadata,
}
