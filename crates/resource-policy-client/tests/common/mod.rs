// crates/resource-policy-client/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Scripted transport and fixtures for policy client tests.
// Purpose: Drive the client without a network and observe its requests.
// Dependencies: resource-policy-client, resource-policy-core, serde_json
// ============================================================================

//! ## Overview
//! [`ScriptedTransport`] answers each request with a caller-supplied handler
//! and records every request it sees.

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

use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use resource_policy_client::ClientError;
use resource_policy_client::PolicyClient;
use resource_policy_client::ProgressOutput;
use resource_policy_client::QueryRequest;
use resource_policy_client::QueryTransport;
use resource_policy_core::MemoryEventSink;
use resource_policy_core::RawValues;
use resource_policy_core::ResourceRecord;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Scripted Transport
// ============================================================================

/// Handler answering one request.
type Handler = dyn Fn(&QueryRequest, usize) -> Result<Vec<Value>, ClientError> + Send + Sync;

/// Transport that answers requests with a handler and records them.
pub struct ScriptedTransport {
    /// Request handler; receives the request and its zero-based call index.
    handler: Box<Handler>,
    /// Number of `execute` calls.
    calls: AtomicUsize,
    /// Every request seen, in arrival order.
    requests: Mutex<Vec<QueryRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport answering with `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&QueryRequest, usize) -> Result<Vec<Value>, ClientError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Routes requests by operation name to fixed envelopes.
    pub fn routed(allow_list: Value, store: Value, evaluate: Value) -> Self {
        Self::new(move |request, _| {
            let envelope = match operation_of(request) {
                "policyResourceAllowList" => allow_list.clone(),
                "storePolicyResources" => store.clone(),
                _ => evaluate.clone(),
            };
            Ok(vec![envelope])
        })
    }

    /// Returns the number of `execute` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns every request seen.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the requests for one operation.
    pub fn requests_for(&self, operation: &str) -> Vec<QueryRequest> {
        self.requests().into_iter().filter(|request| operation_of(request) == operation).collect()
    }
}

impl QueryTransport for ScriptedTransport {
    fn execute(&self, requests: &[QueryRequest]) -> Result<Vec<Value>, ClientError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().extend(requests.iter().cloned());
        (self.handler)(&requests[0], index)
    }
}

/// Returns the operation a request targets.
pub fn operation_of(request: &QueryRequest) -> &'static str {
    ["policyResourceAllowList", "storePolicyResources", "evaluatePolicies"]
        .into_iter()
        .find(|operation| request.query.contains(operation))
        .unwrap_or("unknown")
}

// ============================================================================
// SECTION: Envelopes
// ============================================================================

/// Allow-list envelope approving `aws_instance`.
pub fn instance_allow_list_envelope() -> Value {
    json!({"data": {"policyResourceAllowList": [
        {"resourceType": "aws_instance", "allowed": {
            "instance_type": true,
            "ebs_block_device": {"volume_size": true},
        }},
    ]}})
}

/// Store envelope returning `sha`.
pub fn store_envelope(sha: &str) -> Value {
    json!({"data": {"storePolicyResources": {"sha": sha}}})
}

/// Evaluation envelope with `tags` tag policies and `finops` finops policies.
pub fn evaluate_envelope(tags: usize, finops: usize) -> Value {
    let tag_results: Vec<Value> = (0..tags)
        .map(|index| {
            json!({
                "name": format!("tag-{index}"),
                "tagPolicyId": format!("tp-{index}"),
                "blockPr": index == 0,
                "totalDetectedResources": 2,
                "totalTaggableResources": 3,
                "resources": [{
                    "address": "aws_instance.web",
                    "resourceType": "aws_instance",
                    "path": "main.tf",
                    "line": 4,
                    "projectNames": ["infra"],
                    "missingMandatoryTags": ["owner"],
                    "invalidTags": [{"key": "env", "value": "qa", "validValues": ["dev", "prod"]}],
                }],
            })
        })
        .collect();
    let finops_results: Vec<Value> = (0..finops)
        .map(|index| {
            json!({
                "name": format!("finops-{index}"),
                "policyId": format!("fp-{index}"),
                "totalApplicableResources": 1,
                "resources": [{
                    "checksum": "abc",
                    "address": "aws_instance.web",
                    "resourceType": "aws_instance",
                    "startLine": 1,
                    "endLine": 9,
                    "issues": [{"attribute": "instance_type", "value": "t2.micro"}],
                    "unexpected": "ignored",
                }],
            })
        })
        .collect();
    json!({"data": {"evaluatePolicies": {
        "tagPolicyResults": tag_results,
        "finopsPolicyResults": finops_results,
    }}})
}

// ============================================================================
// SECTION: Resources
// ============================================================================

/// Raw values with an allowed field, a nested array, and a secret.
pub const INSTANCE_RAW_VALUES: &str = r#"{"instance_type":"t3.micro","ebs_block_device":[{"volume_size":8,"delete_on_termination":true}],"secret":"x"}"#;

/// Builds an `aws_instance` record at `address`.
pub fn instance(address: &str) -> ResourceRecord {
    ResourceRecord::new("aws_instance", "aws", address)
        .with_raw_values(RawValues::from_json(INSTANCE_RAW_VALUES).unwrap())
}

/// Builds a record of a type no allow-list approves.
pub fn unapproved(address: &str) -> ResourceRecord {
    ResourceRecord::new("aws_iam_user", "aws", address)
        .with_raw_values(RawValues::from_json(r#"{"name":"admin"}"#).unwrap())
}

// ============================================================================
// SECTION: Clients
// ============================================================================

/// Creates a client with a memory event sink and structured progress.
pub fn client_with_events(
    transport: ScriptedTransport,
) -> (PolicyClient<ScriptedTransport>, Arc<MemoryEventSink>) {
    let events = Arc::new(MemoryEventSink::new());
    let progress = ProgressOutput::structured(events.clone());
    (PolicyClient::new(transport, events.clone(), progress), events)
}

/// Creates a client with plain progress written to `buffer`.
pub fn client_with_buffer(
    transport: ScriptedTransport,
    buffer: SharedBuffer,
) -> PolicyClient<ScriptedTransport> {
    PolicyClient::new(transport, Arc::new(MemoryEventSink::new()), ProgressOutput::plain(buffer))
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Cloneable in-memory writer.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    /// Written bytes.
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8(self.bytes.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that always fails.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
