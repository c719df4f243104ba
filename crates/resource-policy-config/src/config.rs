// crates/resource-policy-config/src/config.rs
// ============================================================================
// Module: Resource Policy Configuration
// Description: Configuration loading and validation for the policy tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: resource-policy-client, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then environment overrides are applied and the result is validated.
//! Missing or invalid configuration fails closed: an endpoint that is not
//! `https` is rejected unless `allow_http` is set explicitly.
//!
//! Environment access goes through an [`EnvLookup`] so loading is testable
//! without mutating process state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use resource_policy_client::HttpTransportConfig;
use resource_policy_client::resolve_correlation_id;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "resource-policy.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "RESOURCE_POLICY_CONFIG";
/// Environment variable overriding `api.api_key`.
pub const API_KEY_ENV_VAR: &str = "RESOURCE_POLICY_API_KEY";
/// Environment variable overriding `api.endpoint`.
pub const API_ENDPOINT_ENV_VAR: &str = "RESOURCE_POLICY_API_ENDPOINT";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum user agent length.
const MAX_USER_AGENT_LENGTH: usize = 256;

/// Environment lookup used while loading configuration.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Resource policy tooling configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcePolicyConfig {
    /// Policy service connection settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Progress and diagnostics output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ResourcePolicyConfig {
    /// Loads configuration from disk using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &process_env)
    }

    /// Loads configuration from disk, resolving variables through `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(path: Option<&Path>, env: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env)?;
        Self::read(&resolved, env)
    }

    /// Loads configuration, falling back to defaults when no file exists.
    ///
    /// The fallback applies only to the implicit path; an explicit `path`
    /// that does not exist is an error. Environment overrides still apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_or_default_with_env(path, &process_env)
    }

    /// Like [`Self::load_or_default`], resolving variables through `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_or_default_with_env(
        path: Option<&Path>,
        env: EnvLookup<'_>,
    ) -> Result<Self, ConfigError> {
        if path.is_some() || env(CONFIG_ENV_VAR).is_some() {
            return Self::load_with_env(path, env);
        }
        let resolved = PathBuf::from(DEFAULT_CONFIG_NAME);
        match fs::metadata(&resolved) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env_overrides(env);
                config.validate()?;
                Ok(config)
            }
            _ => Self::read(&resolved, env),
        }
    }

    /// Applies `RESOURCE_POLICY_API_*` overrides on top of parsed values.
    pub fn apply_env_overrides(&mut self, env: EnvLookup<'_>) {
        if let Some(api_key) = env(API_KEY_ENV_VAR) {
            self.api.api_key = Some(api_key);
        }
        if let Some(endpoint) = env(API_ENDPOINT_ENV_VAR) {
            self.api.endpoint = Some(endpoint);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.logging.validate()
    }

    /// Reads, parses, overrides, and validates the file at `path`.
    fn read(path: &Path, env: EnvLookup<'_>) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }
}

/// Policy service connection settings.
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    /// Query endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Permit cleartext `http://` endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Optional user agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional fixed correlation ID; generated per process when unset.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
            allow_http: false,
            user_agent: None,
            correlation_id: None,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("allow_http", &self.allow_http)
            .field("user_agent", &self.user_agent)
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}

impl ApiConfig {
    /// Validates the values that are present.
    ///
    /// An unset endpoint or key is valid here; commands that talk to the
    /// service require them through [`Self::transport_config`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a present value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "api.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            self.parse_endpoint(endpoint)?;
        }
        if let Some(api_key) = &self.api_key
            && api_key.trim().is_empty()
        {
            return Err(ConfigError::Invalid("api.api_key must be non-empty".to_string()));
        }
        if let Some(user_agent) = &self.user_agent {
            validate_user_agent(user_agent)?;
        }
        if let Some(correlation_id) = &self.correlation_id {
            resolve_correlation_id(Some(correlation_id)).map_err(|reason| {
                ConfigError::Invalid(format!("api.correlation_id is invalid: {reason}"))
            })?;
        }
        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint is unset or invalid.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            ConfigError::Invalid(format!("api.endpoint must be set (or {API_ENDPOINT_ENV_VAR})"))
        })?;
        self.parse_endpoint(endpoint)
    }

    /// Builds HTTP transport settings, resolving the correlation ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint or key is missing or invalid.
    pub fn transport_config(&self) -> Result<HttpTransportConfig, ConfigError> {
        let endpoint = self.endpoint_url()?;
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ConfigError::Invalid(format!("api.api_key must be set (or {API_KEY_ENV_VAR})"))
            })?;
        let correlation_id =
            resolve_correlation_id(self.correlation_id.as_deref()).map_err(|reason| {
                ConfigError::Invalid(format!("api.correlation_id is invalid: {reason}"))
            })?;
        let mut config = HttpTransportConfig::new(endpoint, api_key, correlation_id);
        config.timeout = self.timeout();
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.trim().to_string();
        }
        Ok(config)
    }

    /// Parses `endpoint` and enforces the scheme policy.
    fn parse_endpoint(&self, endpoint: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(endpoint.trim()).map_err(|err| {
            ConfigError::Invalid(format!("api.endpoint is not a valid url: {err}"))
        })?;
        match url.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(ConfigError::Invalid(
                    "api.endpoint uses http:// without allow_http".to_string(),
                ));
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "api.endpoint scheme {other} is not supported"
                )));
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::Invalid("api.endpoint must include a host".to_string()));
        }
        Ok(url)
    }
}

/// Progress and diagnostics output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Progress line format.
    #[serde(default)]
    pub format: LogFormat,
    /// Destination for diagnostic events.
    #[serde(default)]
    pub diagnostics: DiagnosticsTarget,
}

impl LoggingConfig {
    /// Validates logging configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the diagnostics path is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.diagnostics {
            DiagnosticsTarget::File(path) => {
                validate_path_string("logging.diagnostics.file", path)
            }
            DiagnosticsTarget::Stderr | DiagnosticsTarget::Disabled => Ok(()),
        }
    }
}

/// Progress output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable progress lines.
    #[default]
    Plain,
    /// Progress recorded as events on the diagnostics sink.
    Structured,
}

/// Destination for diagnostic events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsTarget {
    /// JSON lines on standard error.
    #[default]
    Stderr,
    /// Diagnostics discarded.
    #[serde(rename = "none")]
    Disabled,
    /// JSON lines appended to a file.
    File(String),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a variable from the process environment.
fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>, env: EnvLookup<'_>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
pub(crate) fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a configured user agent.
fn validate_user_agent(value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("api.user_agent must be non-empty".to_string()));
    }
    if trimmed.len() > MAX_USER_AGENT_LENGTH {
        return Err(ConfigError::Invalid("api.user_agent exceeds max length".to_string()));
    }
    if !trimmed.chars().all(|ch| ch.is_ascii() && !ch.is_ascii_control()) {
        return Err(ConfigError::Invalid("api.user_agent must be printable ascii".to_string()));
    }
    Ok(())
}

/// Default request timeout in milliseconds.
pub(crate) const fn default_timeout_ms() -> u64 {
    30_000
}
