// crates/resource-policy-client/src/lib.rs
// ============================================================================
// Module: Resource Policy Client
// Description: Remote policy workflow over a pluggable query transport.
// Purpose: Load allow-lists, upload filtered batches, and check policies.
// Dependencies: rand, reqwest, resource-policy-core, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! This crate drives the policy service. [`PolicyClient`] owns the do-once
//! allow-list cache and the progress output; [`HttpQueryTransport`] is the
//! production transport, and tests substitute any [`QueryTransport`].
//! Transport, remote, and decode failures are always returned to the caller;
//! nothing is partially decoded.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod client;
pub mod correlation;
pub mod decode;
pub mod error;
pub mod progress;
pub mod queries;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::AllowListCache;
pub use client::PolicyClient;
pub use correlation::CorrelationIdRejection;
pub use correlation::generate_correlation_id;
pub use correlation::resolve_correlation_id;
pub use decode::AllowListEntry;
pub use decode::allow_lists_from_entries;
pub use error::ClientError;
pub use error::ResourceSet;
pub use progress::ProgressOutput;
pub use transport::HttpQueryTransport;
pub use transport::HttpTransportConfig;
pub use transport::QueryRequest;
pub use transport::QueryTransport;

#[cfg(test)]
mod tests;
