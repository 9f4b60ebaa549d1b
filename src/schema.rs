//! Schema definitions for fsconform suite configuration.
//!
//! A suite config is optional. When present it lives in the tests root as
//! `fsconform.yaml`, `fsconform.yml` or `fsconform.toml`, and supplies
//! defaults that command-line flags may override.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Suite-level configuration loaded from the tests root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Schema version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Path to the executable under test (default: `./fs`).
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Timeout in seconds for each subject invocation.
    /// When not set, the runner waits for the subject indefinitely.
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Abort the whole suite on the first case that cannot be evaluated
    /// (unreadable fixture, missing expected output, spawn failure).
    #[serde(default)]
    pub fail_fast: bool,

    /// Directory to create sandboxes in instead of the system temp directory.
    #[serde(default)]
    pub sandbox_root: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

/// Generate the JSON schema for the suite config.
pub fn generate_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(SuiteConfig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config: SuiteConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.version, 1);
        assert!(config.executable.is_none());
        assert!(config.timeout.is_none());
        assert!(!config.fail_fast);
        assert!(config.sandbox_root.is_none());
    }

    #[test]
    fn parse_full_yaml_config() {
        let yaml = r#"
version: 1
executable: ./build/fs
timeout: 5
fail_fast: true
sandbox_root: /tmp/sandboxes
"#;
        let config: SuiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.executable, Some(PathBuf::from("./build/fs")));
        assert_eq!(config.timeout, Some(5));
        assert!(config.fail_fast);
        assert_eq!(config.sandbox_root, Some(PathBuf::from("/tmp/sandboxes")));
    }

    #[test]
    fn parse_toml_config() {
        let config: SuiteConfig = toml::from_str("executable = \"fs-sim\"\ntimeout = 2\n").unwrap();
        assert_eq!(config.executable, Some(PathBuf::from("fs-sim")));
        assert_eq!(config.timeout, Some(2));
    }

    #[test]
    fn reject_unknown_field() {
        let result: Result<SuiteConfig, _> = serde_yaml::from_str("retries: 3");
        assert!(result.is_err());
    }

    #[test]
    fn schema_names_fields() {
        let json = serde_json::to_string(&generate_schema()).unwrap();
        assert!(json.contains("\"timeout\""));
        assert!(json.contains("\"fail_fast\""));
    }
}
