// crates/resource-policy-config/src/lib.rs
// ============================================================================
// Module: Resource Policy Config Library
// Description: Configuration model and fail-closed validation.
// Purpose: Single source of truth for resource-policy.toml semantics.
// Dependencies: resource-policy-client, serde, toml, url
// ============================================================================

//! ## Overview
//! `resource-policy-config` loads `resource-policy.toml`, applies
//! environment overrides, and validates the result before any command runs.
//! Configuration inputs are untrusted: size, encoding, and path limits are
//! enforced before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
