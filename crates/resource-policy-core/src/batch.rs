// crates/resource-policy-core/src/batch.rs
// ============================================================================
// Module: Batch Assembler
// Description: Filters a resource set into an address-ordered upload batch.
// Purpose: Keep unapproved resource types local and make batches reproducible.
// Dependencies: none
// ============================================================================

//! ## Overview
//! [`assemble_batch`] transforms every resource whose type has an allow-list
//! and drops the rest. The batch is sorted by address so it does not depend
//! on input iteration order.
//! Invariants:
//! - Resources with no allow-list entry never appear in the batch.
//! - Output is sorted by address ascending.
//! - An empty batch is a valid outcome; callers record [`POLICY_SHA_PLACEHOLDER`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::allow_list::AllowLists;
use crate::events::EventSink;
use crate::policy_resource::PolicyResource;
use crate::policy_resource::transform_resource;
use crate::resource::ResourceRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sha recorded when filtering ran but produced nothing to upload.
pub const POLICY_SHA_PLACEHOLDER: &str = "0";

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Filters and transforms `resources` into an address-sorted batch.
#[must_use]
pub fn assemble_batch(
    resources: &[ResourceRecord],
    allow_lists: &AllowLists,
    events: &dyn EventSink,
) -> Vec<PolicyResource> {
    let mut batch: Vec<PolicyResource> = resources
        .iter()
        .filter_map(|resource| {
            allow_lists
                .get(&resource.resource_type)
                .map(|tree| transform_resource(resource, tree, events))
        })
        .collect();
    batch.sort_by(|left, right| left.address.cmp(&right.address));
    batch
}
