// crates/resource-policy-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config loading and validation tests.
// Purpose: Reduce duplication across integration tests for resource-policy-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use resource_policy_config::ResourcePolicyConfig;
use tempfile::TempDir;

/// Parses a TOML string into a `ResourcePolicyConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<ResourcePolicyConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config with an https endpoint and an API key.
pub fn connected_config() -> Result<ResourcePolicyConfig, toml::de::Error> {
    config_from_toml(
        r#"
        [api]
        endpoint = "https://policy.example.com/graphql"
        api_key = "key-from-file"
        "#,
    )
}

/// Writes `contents` to `resource-policy.toml` inside a fresh temp dir.
pub fn write_config(contents: &[u8]) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("resource-policy.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

/// Environment with no variables set.
pub fn no_env(_name: &str) -> Option<String> {
    None
}

/// Fixed environment used in place of the process environment.
#[derive(Debug, Default, Clone)]
pub struct FakeEnv {
    /// Variables visible to the loader.
    vars: BTreeMap<String, String>,
}

impl FakeEnv {
    /// Adds a variable.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Looks up a variable.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
