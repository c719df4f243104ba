// crates/resource-policy-client/src/tests.rs
// ============================================================================
// Module: Resource Policy Client Unit Tests
// Description: Unit tests for correlation IDs, progress lines, and decoding.
// Purpose: Pin small helpers that integration tests only touch indirectly.
// Dependencies: resource-policy-client
// ============================================================================

//! ## Overview
//! Unit coverage for the client crate's helper functions.

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

use serde_json::json;

use crate::correlation::CorrelationIdRejection;
use crate::correlation::MAX_CORRELATION_ID_LENGTH;
use crate::correlation::generate_correlation_id;
use crate::correlation::resolve_correlation_id;
use crate::correlation::sanitize_correlation_id;
use crate::decode::AllowListEntry;
use crate::decode::allow_lists_from_entries;
use crate::decode::decode_allow_lists;
use crate::decode::decode_store_sha;
use crate::error::ClientError;
use crate::error::ResourceSet;
use crate::progress::policies_checked_line;
use crate::queries::STORE_RESOURCES_OPERATION;
use crate::queries::evaluate_policies_request;
use crate::transport::QueryRequest;
use crate::transport::parse_envelopes;

// ============================================================================
// SECTION: Correlation IDs
// ============================================================================

#[test]
fn sanitize_trims_valid_ids() {
    assert_eq!(sanitize_correlation_id("  run-42  ").unwrap(), "run-42");
}

#[test]
fn sanitize_rejects_invalid_ids() {
    assert_eq!(sanitize_correlation_id("   "), Err(CorrelationIdRejection::EmptyAfterTrim));
    let long = "a".repeat(MAX_CORRELATION_ID_LENGTH + 1);
    assert_eq!(sanitize_correlation_id(&long), Err(CorrelationIdRejection::TooLong));
    assert_eq!(sanitize_correlation_id("a b"), Err(CorrelationIdRejection::InvalidChar));
    assert_eq!(sanitize_correlation_id("caf\u{e9}"), Err(CorrelationIdRejection::InvalidChar));
    assert_eq!(sanitize_correlation_id("a\"b"), Err(CorrelationIdRejection::InvalidChar));
}

#[test]
fn generated_ids_are_version_four_uuids() {
    let id = generate_correlation_id();
    let groups: Vec<&str> = id.split('-').collect();
    let lengths: Vec<usize> = groups.iter().map(|group| group.len()).collect();
    assert_eq!(lengths, vec![8, 4, 4, 4, 12]);
    assert!(groups[2].starts_with('4'));
    assert!(matches!(groups[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
    assert!(id.chars().all(|ch| ch == '-' || ch.is_ascii_hexdigit()));
    assert_ne!(id, generate_correlation_id());
}

#[test]
fn resolve_prefers_configured_id() {
    assert_eq!(resolve_correlation_id(Some("fixed")).unwrap(), "fixed");
    assert_eq!(resolve_correlation_id(None).unwrap().len(), 36);
}

// ============================================================================
// SECTION: Progress Lines
// ============================================================================

#[test]
fn progress_lines_pluralize_by_count() {
    assert_eq!(policies_checked_line(1, "tag"), "1 tag policy checked");
    assert_eq!(policies_checked_line(3, "tag"), "3 tag policies checked");
    assert_eq!(policies_checked_line(1, "finops"), "1 finops policy checked");
    assert_eq!(policies_checked_line(2, "finops"), "2 finops policies checked");
}

// ============================================================================
// SECTION: Requests and Envelopes
// ============================================================================

#[test]
fn query_request_serializes_query_and_variables() {
    let request = QueryRequest::new("query { a }").with_variable("run", json!({"id": 1}));
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"query": "query { a }", "variables": {"run": {"id": 1}}})
    );
    assert_eq!(
        serde_json::to_value(QueryRequest::new("q")).unwrap(),
        json!({"query": "q", "variables": {}})
    );
}

#[test]
fn evaluate_request_carries_run_variable() {
    let request = evaluate_policies_request(&json!({"projects": []}));
    assert!(request.query.contains("evaluatePolicies(run: $run)"));
    assert_eq!(request.variables.get("run"), Some(&json!({"projects": []})));
}

#[test]
fn envelopes_accept_arrays_and_single_objects() {
    assert_eq!(parse_envelopes(b"[]").unwrap(), Vec::<serde_json::Value>::new());
    assert_eq!(parse_envelopes(br#"[{"data":{}},{"data":null}]"#).unwrap().len(), 2);
    assert_eq!(parse_envelopes(br#"{"data":{}}"#).unwrap(), vec![json!({"data": {}})]);
}

#[test]
fn envelopes_reject_scalars_and_invalid_json() {
    assert!(matches!(parse_envelopes(b"42"), Err(ClientError::Decode { .. })));
    assert!(matches!(parse_envelopes(b"not json"), Err(ClientError::Decode { .. })));
}

// ============================================================================
// SECTION: Errors
// ============================================================================

#[test]
fn upload_error_names_resource_set() {
    let inner = ClientError::Remote {
        operation: STORE_RESOURCES_OPERATION,
        errors: r#"[{"message":"denied"}]"#.to_string(),
    };
    let wrapped = ClientError::upload(ResourceSet::Past, inner);
    let message = wrapped.to_string();
    assert!(message.starts_with("failed to upload past policy resources"));
    assert!(message.contains(r#"[{"message":"denied"}]"#));
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

#[test]
fn later_allow_list_entries_replace_earlier_ones() {
    let entries: Vec<AllowListEntry> = serde_json::from_value(json!([
        {"resourceType": "aws_instance", "allowed": {"ami": true}},
        {"resourceType": "aws_instance", "allowed": {"instance_type": true}},
        {"resourceType": "aws_s3_bucket", "allowed": [true]},
    ]))
    .unwrap();
    let lists = allow_lists_from_entries(entries).unwrap();
    assert_eq!(lists.len(), 2);
    let instance = lists.get("aws_instance").unwrap();
    assert!(instance.rule("ami").is_none());
    assert!(instance.rule("instance_type").is_some());
    assert!(lists.get("aws_s3_bucket").unwrap().is_empty());
}

#[test]
fn null_data_decodes_as_empty_results() {
    assert!(decode_allow_lists(&json!({"data": null})).unwrap().is_empty());
    assert_eq!(decode_store_sha(&json!({"data": {"storePolicyResources": null}})).unwrap(), "");
    let null_sha = json!({"data": {"storePolicyResources": {"sha": null}}});
    assert_eq!(decode_store_sha(&null_sha).unwrap(), "");
}

#[test]
fn non_object_data_is_rejected_for_every_operation() {
    let envelope = json!({"data": ["storePolicyResources"]});
    assert!(matches!(
        decode_store_sha(&envelope),
        Err(ClientError::Decode { operation: STORE_RESOURCES_OPERATION, .. })
    ));
    assert!(matches!(decode_allow_lists(&envelope), Err(ClientError::Decode { .. })));
}

#[test]
fn remote_errors_win_over_data() {
    let envelope = json!({
        "errors": [{"message": "boom"}],
        "data": {"storePolicyResources": {"sha": "abc"}},
    });
    assert_eq!(
        decode_store_sha(&envelope),
        Err(ClientError::Remote {
            operation: STORE_RESOURCES_OPERATION,
            errors: r#"[{"message":"boom"}]"#.to_string(),
        })
    );
}
