// crates/resource-policy-core/src/allow_list.rs
// ============================================================================
// Module: Allow-List Rules
// Description: Per-resource-type rule trees naming fields that may leave the host.
// Purpose: Parse server-supplied allow-lists into an immutable, typed tree.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! An allow-list maps field names to either a boolean leaf (copy the field
//! verbatim when `true`) or a nested tree (recurse into the object or array of
//! objects). Rule shapes that are neither are preserved as
//! [`AllowRule::Unsupported`] so the filter can report them and skip the field.
//! Invariants:
//! - Trees are immutable once parsed.
//! - A non-object rule document parses to an empty tree, which allows nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

// ============================================================================
// SECTION: Rule Types
// ============================================================================

/// JSON shape of a rule that cannot be interpreted.
///
/// # Invariants
/// - Variants are stable for diagnostic labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `null` rule.
    Null,
    /// Numeric rule.
    Number,
    /// String rule.
    String,
    /// Array rule.
    Array,
}

impl RuleKind {
    /// Returns a stable label for the rule shape.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
        }
    }
}

/// A single allow-list rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowRule {
    /// Boolean leaf: include the raw field value when `true`.
    Include(bool),
    /// Nested rules applied to an object or to each element of an array.
    Nested(AllowListTree),
    /// Malformed rule; the field is skipped.
    Unsupported(RuleKind),
}

impl AllowRule {
    /// Interprets a JSON value as a rule.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(flag) => Self::Include(*flag),
            Value::Object(_) => Self::Nested(AllowListTree::from_value(value)),
            Value::Null => Self::Unsupported(RuleKind::Null),
            Value::Number(_) => Self::Unsupported(RuleKind::Number),
            Value::String(_) => Self::Unsupported(RuleKind::String),
            Value::Array(_) => Self::Unsupported(RuleKind::Array),
        }
    }
}

// ============================================================================
// SECTION: Rule Tree
// ============================================================================

/// Field-name keyed rule tree for one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowListTree {
    /// Rules keyed by field name.
    rules: BTreeMap<String, AllowRule>,
}

impl AllowListTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a rule document. Non-object documents produce an empty tree.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::new();
        };
        let rules =
            map.iter().map(|(key, rule)| (key.clone(), AllowRule::from_value(rule))).collect();
        Self {
            rules,
        }
    }

    /// Adds or replaces a rule.
    #[must_use]
    pub fn with_rule(mut self, field: impl Into<String>, rule: AllowRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Returns the rule for a field, if any.
    #[must_use]
    pub fn rule(&self, field: &str) -> Option<&AllowRule> {
        self.rules.get(field)
    }

    /// Returns the number of top-level rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the tree allows nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// SECTION: Allow-List Set
// ============================================================================

/// Allow-list trees keyed by resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowLists {
    /// Trees keyed by resource type.
    by_type: BTreeMap<String, AllowListTree>,
}

impl AllowLists {
    /// Creates an empty set; every resource type is unapproved.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the tree for a resource type, replacing an earlier entry.
    pub fn insert(&mut self, resource_type: impl Into<String>, tree: AllowListTree) {
        self.by_type.insert(resource_type.into(), tree);
    }

    /// Returns the tree for a resource type.
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&AllowListTree> {
        self.by_type.get(resource_type)
    }

    /// Returns the number of approved resource types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns true when no resource type is approved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Iterates approved resource types in sorted order.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }
}

impl FromIterator<(String, AllowListTree)> for AllowLists {
    fn from_iter<I: IntoIterator<Item = (String, AllowListTree)>>(iter: I) -> Self {
        Self {
            by_type: iter.into_iter().collect(),
        }
    }
}
