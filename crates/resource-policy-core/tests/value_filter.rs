// crates/resource-policy-core/tests/value_filter.rs
// ============================================================================
// Module: Value Filter Tests
// Description: Behavioural tests for allow-list filtering of raw values.
// Purpose: Pin the privacy boundary and nested-rule semantics.
// Dependencies: resource-policy-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises [`resource_policy_core::filter_values`] against leaf, nested,
//! array, and malformed rules.

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

mod common;

use resource_policy_core::AllowListTree;
use resource_policy_core::MemoryEventSink;
use resource_policy_core::NoopEventSink;
use resource_policy_core::events::EVENT_UNKNOWN_ALLOW_RULE;
use resource_policy_core::filter_values;
use resource_policy_core::to_sorted_json;
use serde_json::Value;
use serde_json::json;

use crate::common::INSTANCE_RAW_VALUES;
use crate::common::instance_allow_list;
use crate::common::parse;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Filters `value` with `rules` and returns the result as a JSON value.
fn filtered(value: &Value, rules: &Value) -> Value {
    let tree = AllowListTree::from_value(rules);
    Value::Object(filter_values(value, &tree, &NoopEventSink))
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

#[test]
fn instance_scenario_drops_secret_and_unlisted_nested_fields() {
    let value = parse(INSTANCE_RAW_VALUES);
    let tree = instance_allow_list();
    let result = Value::Object(filter_values(&value, &tree, &NoopEventSink));
    assert_eq!(
        result,
        json!({"instance_type": "t3.micro", "ebs_block_device": [{"volume_size": 8}]})
    );
}

#[test]
fn false_leaf_omits_field() {
    let result = filtered(&json!({"a": 1, "b": 2}), &json!({"a": false, "b": true}));
    assert_eq!(result, json!({"b": 2}));
}

#[test]
fn true_leaf_copies_composite_values_verbatim() {
    let value = json!({"tags_all": {"z": "1", "a": "2"}, "ports": [443, 80]});
    let result = filtered(&value, &json!({"tags_all": true, "ports": true}));
    assert_eq!(result, value);
}

#[test]
fn allow_list_fields_missing_from_value_are_ignored() {
    let result = filtered(&json!({"a": 1}), &json!({"a": true, "b": true, "c": {"d": true}}));
    assert_eq!(result, json!({"a": 1}));
}

#[test]
fn nested_rule_on_single_object_recurses() {
    let value = json!({"root_block_device": {"volume_size": 20, "kms_key_id": "secret"}});
    let result = filtered(&value, &json!({"root_block_device": {"volume_size": true}}));
    assert_eq!(result, json!({"root_block_device": {"volume_size": 20}}));
}

#[test]
fn nested_rule_on_array_preserves_element_order() {
    let value = json!({"rules": [
        {"port": 22, "cidr": "10.0.0.0/8"},
        {"port": 443, "cidr": "0.0.0.0/0"},
        {"port": 80, "cidr": "0.0.0.0/0"},
    ]});
    let result = filtered(&value, &json!({"rules": {"port": true}}));
    assert_eq!(result, json!({"rules": [{"port": 22}, {"port": 443}, {"port": 80}]}));
}

#[test]
fn nested_rule_on_scalar_yields_empty_object() {
    let result = filtered(&json!({"block": "scalar", "list": [1, "x"]}), &json!({
        "block": {"inner": true},
        "list": {"inner": true},
    }));
    assert_eq!(result, json!({"block": {}, "list": [{}, {}]}));
}

#[test]
fn deeply_nested_rules_recurse_without_limit() {
    let mut value = json!({"leaf": 1, "secret": 2});
    let mut rules = json!({"leaf": true});
    for _ in 0..64 {
        value = json!({"next": value, "noise": true});
        rules = json!({"next": rules});
    }
    let mut result = filtered(&value, &rules);
    for _ in 0..64 {
        assert!(result.get("noise").is_none());
        result = result.get("next").cloned().unwrap();
    }
    assert_eq!(result, json!({"leaf": 1}));
}

#[test]
fn non_object_input_yields_empty_output() {
    assert_eq!(filtered(&json!([1, 2, 3]), &json!({"a": true})), json!({}));
    assert_eq!(filtered(&Value::Null, &json!({"a": true})), json!({}));
}

// ============================================================================
// SECTION: Malformed Rules
// ============================================================================

#[test]
fn malformed_rule_skips_field_and_reports_event() {
    let events = MemoryEventSink::new();
    let tree = AllowListTree::from_value(&json!({"a": "yes", "b": true, "c": [true]}));
    let result = filter_values(&json!({"a": 1, "b": 2, "c": 3}), &tree, &events);
    assert_eq!(Value::Object(result), json!({"b": 2}));

    let reported = events.events_named(EVENT_UNKNOWN_ALLOW_RULE);
    assert_eq!(reported.len(), 2);
    let kinds: Vec<&str> =
        reported.iter().filter_map(|event| event.field("rule_type")?.as_str()).collect();
    assert!(kinds.contains(&"string"));
    assert!(kinds.contains(&"array"));
}

#[test]
fn malformed_rule_for_absent_field_is_silent() {
    let events = MemoryEventSink::new();
    let tree = AllowListTree::from_value(&json!({"missing": 5}));
    let _ = filter_values(&json!({"present": 1}), &tree, &events);
    assert!(events.events().is_empty());
}

// ============================================================================
// SECTION: Determinism
// ============================================================================

#[test]
fn filtering_is_byte_identical_across_key_orders() {
    let first = parse(r#"{"b":{"y":1,"x":2},"a":[{"k":1,"j":2}],"z":0}"#);
    let second = parse(r#"{"z":0,"a":[{"j":2,"k":1}],"b":{"x":2,"y":1}}"#);
    let rules = json!({"a": {"j": true, "k": true}, "b": true});
    let left = to_sorted_json(&filtered(&first, &rules)).unwrap();
    let right = to_sorted_json(&filtered(&second, &rules)).unwrap();
    assert_eq!(left, right);
    assert_eq!(left, r#"{"a":[{"j":2,"k":1}],"b":{"x":2,"y":1}}"#);
}
