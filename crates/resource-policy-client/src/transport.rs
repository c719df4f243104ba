// crates/resource-policy-client/src/transport.rs
// ============================================================================
// Module: Query Transport
// Description: Query request model and the blocking HTTP transport.
// Purpose: Deliver batched queries to the policy service and return envelopes.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`QueryTransport`] is the seam between the policy client and the network.
//! [`HttpQueryTransport`] POSTs a JSON array of [`QueryRequest`] values and
//! returns one response envelope per request, in order.
//! Invariants:
//! - Redirects are not followed; any non-2xx status is a transport error.
//! - Response bodies are capped at [`HttpTransportConfig::max_response_bytes`].
//! - A single-object body is accepted as a one-element envelope list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::correlation::CORRELATION_HEADER;
use crate::error::ClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Default response body cap in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Operation label used for envelope-list decode failures.
const RESPONSE_OPERATION: &str = "response";

// ============================================================================
// SECTION: Requests
// ============================================================================

/// One query with its variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRequest {
    /// Query document.
    pub query: String,
    /// Query variables.
    pub variables: Map<String, Value>,
}

impl QueryRequest {
    /// Creates a request with no variables.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }

    /// Adds a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Executes query batches against the policy service.
pub trait QueryTransport: Send + Sync {
    /// Sends `requests` and returns the response envelopes in request order.
    ///
    /// Fewer envelopes than requests (including none) is a valid outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the batch cannot be delivered or the
    /// response is not a list of envelopes.
    fn execute(&self, requests: &[QueryRequest]) -> Result<Vec<Value>, ClientError>;
}

impl<T: QueryTransport + ?Sized> QueryTransport for Box<T> {
    fn execute(&self, requests: &[QueryRequest]) -> Result<Vec<Value>, ClientError> {
        (**self).execute(requests)
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Settings for [`HttpQueryTransport`].
#[derive(Clone)]
pub struct HttpTransportConfig {
    /// Query endpoint.
    pub endpoint: Url,
    /// API key sent with every request.
    pub api_key: String,
    /// Correlation ID sent with every request.
    pub correlation_id: String,
    /// User agent string.
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
}

impl HttpTransportConfig {
    /// Creates settings with default timeout, user agent, and size cap.
    #[must_use]
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            api_key: api_key.into(),
            correlation_id: correlation_id.into(),
            user_agent: concat!("resource-policy/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransportConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("correlation_id", &self.correlation_id)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

/// Blocking HTTP transport for the policy service.
#[derive(Debug, Clone)]
pub struct HttpQueryTransport {
    /// HTTP client with redirects disabled.
    client: Client,
    /// Transport settings.
    config: HttpTransportConfig,
}

impl HttpQueryTransport {
    /// Builds a transport from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the HTTP client cannot be built.
    pub fn new(config: HttpTransportConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ClientError::Config(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
            config,
        })
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn config(&self) -> &HttpTransportConfig {
        &self.config
    }
}

impl QueryTransport for HttpQueryTransport {
    fn execute(&self, requests: &[QueryRequest]) -> Result<Vec<Value>, ClientError> {
        let mut response = self
            .client
            .post(self.config.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .header(CORRELATION_HEADER, self.config.correlation_id.as_str())
            .json(requests)
            .send()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::Transport(format!("http status {}", response.status())));
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        parse_envelopes(&body)
    }
}

// ============================================================================
// SECTION: Response Helpers
// ============================================================================

/// Reads a response body, failing when it exceeds `max_bytes`.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, ClientError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| ClientError::Config("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(ClientError::Transport("http response exceeds size limit".to_string()));
    }
    let mut body = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|err| ClientError::Transport(format!("failed to read response: {err}")))?;
    if body.len() > max_bytes {
        return Err(ClientError::Transport("http response exceeds size limit".to_string()));
    }
    Ok(body)
}

/// Parses a response body into a list of envelopes.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] when the body is not JSON, or is JSON
/// other than an array or a single object.
pub fn parse_envelopes(body: &[u8]) -> Result<Vec<Value>, ClientError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| ClientError::decode(RESPONSE_OPERATION, err))?;
    match value {
        Value::Array(envelopes) => Ok(envelopes),
        Value::Object(_) => Ok(vec![value]),
        _ => Err(ClientError::decode(RESPONSE_OPERATION, "expected a list of response envelopes")),
    }
}
