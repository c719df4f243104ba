// crates/resource-policy-core/src/lib.rs
// ============================================================================
// Module: Resource Policy Core
// Description: Allow-list filtering and canonicalization of resource data.
// Purpose: Produce privacy-filtered, checksum-stable payloads for upload.
// Dependencies: serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! Resource Policy Core turns a project's resource records into the batch
//! uploaded for remote policy evaluation. Only fields named by a
//! server-supplied allow-list leave the machine, and the output is
//! byte-stable so checksums and shas are reproducible.
//! Invariants:
//! - Unlisted fields and unapproved resource types are never emitted.
//! - Batches are sorted by address; tags and references by key.
//! - Recoverable problems go to an injected [`EventSink`]; nothing here fails a batch.
//!
//! Everything in this crate is pure apart from event sinks and is safe to run
//! in parallel across resources.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod allow_list;
pub mod batch;
pub mod events;
pub mod filter;
pub mod hashing;
pub mod policy_resource;
pub mod project;
pub mod resource;
pub mod results;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use allow_list::AllowListTree;
pub use allow_list::AllowLists;
pub use allow_list::AllowRule;
pub use allow_list::RuleKind;
pub use batch::POLICY_SHA_PLACEHOLDER;
pub use batch::assemble_batch;
pub use events::EventSink;
pub use events::JsonLineEventSink;
pub use events::LogEvent;
pub use events::LogLevel;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use filter::filter_values;
pub use filter::to_sorted_json;
pub use hashing::resource_checksum;
pub use policy_resource::PolicyMetadata;
pub use policy_resource::PolicyMetadataCall;
pub use policy_resource::PolicyReference;
pub use policy_resource::PolicyResource;
pub use policy_resource::PolicyTag;
pub use policy_resource::transform_resource;
pub use project::Project;
pub use project::ProjectMetadata;
pub use resource::MetadataCall;
pub use resource::RawValues;
pub use resource::ResourceMetadata;
pub use resource::ResourceRecord;
pub use results::FinOpsIssue;
pub use results::FinOpsPolicy;
pub use results::FinOpsPolicyResource;
pub use results::InvalidTag;
pub use results::PolicyOutput;
pub use results::TagPolicy;
pub use results::TagPolicyResource;
