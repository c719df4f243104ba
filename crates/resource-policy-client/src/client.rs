// crates/resource-policy-client/src/client.rs
// ============================================================================
// Module: Policy Client
// Description: Orchestrates allow-list loading, uploads, and policy checks.
// Purpose: Provide the remote policy workflow over an injected transport.
// Dependencies: resource-policy-core, serde_json
// ============================================================================

//! ## Overview
//! [`PolicyClient`] loads the allow-list once, filters resource sets into
//! batches, uploads them, and evaluates policies for a run. Zero envelopes
//! from the transport is a valid empty outcome for every operation.
//! Invariants:
//! - The allow-list fetch runs at most once per client.
//! - Current and past uploads are independent; a past failure keeps the
//!   current sha already recorded on the project.
//! - Empty batches are never uploaded and record [`POLICY_SHA_PLACEHOLDER`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use resource_policy_core::AllowLists;
use resource_policy_core::EventSink;
use resource_policy_core::LogEvent;
use resource_policy_core::POLICY_SHA_PLACEHOLDER;
use resource_policy_core::PolicyOutput;
use resource_policy_core::PolicyResource;
use resource_policy_core::Project;
use resource_policy_core::ResourceRecord;
use resource_policy_core::assemble_batch;
use serde_json::Value;

use crate::cache::AllowListCache;
use crate::decode::decode_allow_lists;
use crate::decode::decode_policy_output;
use crate::decode::decode_store_sha;
use crate::error::ClientError;
use crate::error::ResourceSet;
use crate::progress::ProgressOutput;
use crate::progress::policies_checked_line;
use crate::queries::allow_list_request;
use crate::queries::evaluate_policies_request;
use crate::queries::store_resources_request;
use crate::transport::QueryRequest;
use crate::transport::QueryTransport;

// ============================================================================
// SECTION: Event Identifiers
// ============================================================================

/// Event id recorded after the allow-list load.
pub const EVENT_ALLOW_LIST_LOADED: &str = "allow_list_loaded";
/// Event id recorded after a batch upload.
pub const EVENT_POLICY_RESOURCES_STORED: &str = "policy_resources_stored";

// ============================================================================
// SECTION: Policy Client
// ============================================================================

/// Remote policy workflow over a query transport.
pub struct PolicyClient<T: QueryTransport> {
    /// Transport used for every remote call.
    transport: T,
    /// Diagnostic event sink.
    events: Arc<dyn EventSink>,
    /// Destination for progress lines.
    progress: ProgressOutput,
    /// Do-once allow-list cache.
    allow_lists: AllowListCache,
}

impl<T: QueryTransport> PolicyClient<T> {
    /// Creates a client with an empty allow-list cache.
    #[must_use]
    pub const fn new(transport: T, events: Arc<dyn EventSink>, progress: ProgressOutput) -> Self {
        Self {
            transport,
            events,
            progress,
            allow_lists: AllowListCache::new(),
        }
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Loads the allow-lists on first use and returns the cached outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] of the first load; failures are cached.
    pub fn ensure_allow_list_loaded(&self) -> Result<Arc<AllowLists>, ClientError> {
        self.allow_lists.get_or_load(|| self.fetch_allow_lists())
    }

    /// Filters `resources` into an address-sorted batch.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the allow-lists cannot be loaded.
    pub fn filter_resources(
        &self,
        resources: &[ResourceRecord],
    ) -> Result<Vec<PolicyResource>, ClientError> {
        let allow_lists = self.ensure_allow_list_loaded()?;
        Ok(assemble_batch(resources, &allow_lists, self.events.as_ref()))
    }

    /// Uploads a batch and returns the sha assigned to it.
    ///
    /// Returns an empty sha when the service sends no response envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport, remote, or decode failure.
    pub fn store_policy_resources(&self, batch: &[PolicyResource]) -> Result<String, ClientError> {
        let request = store_resources_request(batch)?;
        let sha = match self.execute_one(&request)? {
            Some(envelope) => decode_store_sha(&envelope)?,
            None => String::new(),
        };
        self.events.record(
            &LogEvent::debug(EVENT_POLICY_RESOURCES_STORED, "Stored policy resources")
                .with_field("count", batch.len())
                .with_field("sha", sha.as_str()),
        );
        Ok(sha)
    }

    /// Uploads a project's current and past resource sets.
    ///
    /// Records the returned shas, or [`POLICY_SHA_PLACEHOLDER`] for sets with
    /// nothing to upload, on the project metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the allow-lists cannot be loaded, or
    /// [`ClientError::Upload`] naming the set whose upload failed.
    pub fn upload_policy_data(&self, project: &mut Project) -> Result<(), ClientError> {
        self.ensure_allow_list_loaded()?;
        let current = self.upload_set(&project.resources, ResourceSet::Current)?;
        project.metadata.policy_sha = Some(current);
        let past = self.upload_set(&project.past_resources, ResourceSet::Past)?;
        project.metadata.past_policy_sha = Some(past);
        Ok(())
    }

    /// Evaluates policies for `run`.
    ///
    /// Returns `None` when the service sends no response envelope. Writes one
    /// progress line per non-empty policy kind.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport, remote, decode, or output failure.
    pub fn check_policies(&self, run: &Value) -> Result<Option<PolicyOutput>, ClientError> {
        let Some(envelope) = self.execute_one(&evaluate_policies_request(run))? else {
            return Ok(None);
        };
        let output = decode_policy_output(&envelope)?;
        if !output.tag_policies.is_empty() {
            self.progress.emit(&policies_checked_line(output.tag_policies.len(), "tag"))?;
        }
        if !output.finops_policies.is_empty() {
            self.progress.emit(&policies_checked_line(output.finops_policies.len(), "finops"))?;
        }
        Ok(Some(output))
    }

    /// Fetches and decodes the allow-lists.
    fn fetch_allow_lists(&self) -> Result<AllowLists, ClientError> {
        let allow_lists = match self.execute_one(&allow_list_request())? {
            Some(envelope) => decode_allow_lists(&envelope)?,
            None => AllowLists::new(),
        };
        self.events.record(
            &LogEvent::debug(EVENT_ALLOW_LIST_LOADED, "Loaded policy resource allow-list")
                .with_field("resource_types", allow_lists.len()),
        );
        Ok(allow_lists)
    }

    /// Filters and uploads one resource set, returning its sha.
    fn upload_set(
        &self,
        resources: &[ResourceRecord],
        set: ResourceSet,
    ) -> Result<String, ClientError> {
        let batch = self.filter_resources(resources)?;
        if batch.is_empty() {
            return Ok(POLICY_SHA_PLACEHOLDER.to_string());
        }
        self.store_policy_resources(&batch).map_err(|err| ClientError::upload(set, err))
    }

    /// Executes a single request and returns its envelope, if any.
    fn execute_one(&self, request: &QueryRequest) -> Result<Option<Value>, ClientError> {
        let envelopes = self.transport.execute(std::slice::from_ref(request))?;
        Ok(envelopes.into_iter().next())
    }
}
