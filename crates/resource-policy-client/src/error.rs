// crates/resource-policy-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error taxonomy for remote policy operations.
// Purpose: Separate transport, remote, decode, and output failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every variant carries owned strings so errors are `Clone`; the allow-list
//! cache hands the same cached error to every caller.

use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Resource Sets
// ============================================================================

/// Which of a project's resource sets an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSet {
    /// Resources of the current run.
    Current,
    /// Baseline resources the current run is compared against.
    Past,
}

impl ResourceSet {
    /// Returns a stable label for this set.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Past => "past",
        }
    }
}

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Client Error
// ============================================================================

/// Errors raised by the policy client and its transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Request could not be delivered or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// Remote service returned an `errors` field in the response envelope.
    #[error("query {operation} failed, received remote errors: {errors}")]
    Remote {
        /// Remote operation name.
        operation: &'static str,
        /// Raw JSON text of the `errors` field.
        errors: String,
    },
    /// Response payload did not match the expected shape.
    #[error("failed to decode {operation}: {detail}")]
    Decode {
        /// Remote operation name.
        operation: &'static str,
        /// Decoder failure detail.
        detail: String,
    },
    /// Uploading one resource set failed.
    #[error("failed to upload {set} policy resources: {source}")]
    Upload {
        /// Resource set whose upload failed.
        set: ResourceSet,
        /// Underlying failure.
        source: Box<Self>,
    },
    /// Progress output could not be written.
    #[error("failed to write progress output: {0}")]
    Output(String),
    /// Client could not be constructed from its settings.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Wraps an error with the resource set whose upload failed.
    #[must_use]
    pub fn upload(set: ResourceSet, source: Self) -> Self {
        Self::Upload {
            set,
            source: Box::new(source),
        }
    }

    /// Builds a decode error for `operation`.
    pub(crate) fn decode(operation: &'static str, detail: impl fmt::Display) -> Self {
        Self::Decode {
            operation,
            detail: detail.to_string(),
        }
    }
}
