// crates/resource-policy-client/src/cache.rs
// ============================================================================
// Module: Allow-List Cache
// Description: Do-once cache for the remote allow-list.
// Purpose: Fetch allow-lists at most once per client, success or failure.
// Dependencies: resource-policy-core
// ============================================================================

//! ## Overview
//! [`AllowListCache`] wraps a [`OnceLock`] holding the outcome of the first
//! load. Concurrent callers block until that load finishes and then observe
//! the same allow-lists or the same error. Failures are never retried; a new
//! cache is required to fetch again.

use std::sync::Arc;
use std::sync::OnceLock;

use resource_policy_core::AllowLists;

use crate::error::ClientError;

/// Cached outcome of the allow-list load.
type LoadOutcome = Result<Arc<AllowLists>, ClientError>;

/// Single-execution allow-list cache.
#[derive(Debug, Default)]
pub struct AllowListCache {
    /// Outcome of the first load.
    outcome: OnceLock<LoadOutcome>,
}

impl AllowListCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
        }
    }

    /// Returns the cached allow-lists, running `load` if no load has happened.
    ///
    /// `load` runs at most once over the cache's lifetime.
    ///
    /// # Errors
    ///
    /// Returns the cached [`ClientError`] when the first load failed.
    pub fn get_or_load<F>(&self, load: F) -> LoadOutcome
    where
        F: FnOnce() -> Result<AllowLists, ClientError>,
    {
        self.outcome.get_or_init(|| load().map(Arc::new)).clone()
    }

    /// Returns the cached outcome without loading.
    #[must_use]
    pub fn get(&self) -> Option<&LoadOutcome> {
        self.outcome.get()
    }

    /// Returns true once a load has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.outcome.get().is_some()
    }
}
