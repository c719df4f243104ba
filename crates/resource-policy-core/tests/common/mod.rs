// crates/resource-policy-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for resource-policy-core tests.
// Purpose: Provide sample resources and allow-lists for integration tests.
// Dependencies: resource-policy-core, serde_json
// ============================================================================

//! ## Overview
//! Provides an EC2-style resource fixture and matching allow-list.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]
#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use resource_policy_core::AllowListTree;
use resource_policy_core::AllowLists;
use resource_policy_core::RawValues;
use resource_policy_core::ResourceMetadata;
use resource_policy_core::ResourceRecord;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Allow-List Fixtures
// ============================================================================

/// Allow-list for `aws_instance` used across scenarios.
pub fn instance_allow_list() -> AllowListTree {
    AllowListTree::from_value(&json!({
        "instance_type": true,
        "ebs_block_device": {"volume_size": true},
    }))
}

/// Allow-list set approving only `aws_instance`.
pub fn instance_allow_lists() -> AllowLists {
    let mut lists = AllowLists::new();
    lists.insert("aws_instance", instance_allow_list());
    lists
}

// ============================================================================
// SECTION: Resource Fixtures
// ============================================================================

/// Raw values containing an allowed field, a nested array, and a secret.
pub const INSTANCE_RAW_VALUES: &str = r#"{"instance_type":"t3.micro","ebs_block_device":[{"volume_size":8,"delete_on_termination":true}],"secret":"x"}"#;

/// Parses raw JSON into [`RawValues`].
pub fn raw(text: &str) -> RawValues {
    RawValues::from_json(text).expect("fixture json")
}

/// Builds an `aws_instance` record at `address` with fixture raw values.
pub fn instance(address: &str) -> ResourceRecord {
    ResourceRecord::new("aws_instance", "aws", address).with_raw_values(raw(INSTANCE_RAW_VALUES))
}

/// Builds metadata with a source location and optional checksum.
pub fn metadata(
    filename: &str,
    start_line: i64,
    end_line: i64,
    checksum: &str,
) -> ResourceMetadata {
    ResourceMetadata::new()
        .with("filename", filename)
        .with("startLine", start_line)
        .with("endLine", end_line)
        .with("checksum", checksum)
}

/// Parses serialized values back into JSON for structural comparison.
pub fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("valid json")
}
