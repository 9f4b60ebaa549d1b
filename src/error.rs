//! Error types.
//!
//! Comparison mismatches are never errors; they are verdicts. Everything in
//! here is a structural problem that prevents a case (or the whole suite)
//! from being evaluated.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to load the suite configuration or discover test cases.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a file or directory.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse YAML.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// Failed to parse TOML.
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Unsupported config file extension.
    #[error("unsupported file format: {0} (expected .yaml, .yml, or .toml)")]
    UnsupportedFormat(String),
    /// The tests root does not exist or is not a directory.
    #[error("tests directory not found: {0}")]
    MissingRoot(PathBuf),
}

/// Failure to run the subject executable.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for subject: {0}")]
    Wait(#[source] std::io::Error),
    #[error("subject timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Failure that stops a single test case from being evaluated.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The fixture could not be copied into a sandbox.
    #[error("failed to prepare sandbox from {fixture}: {source}")]
    Sandbox {
        fixture: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A required expected-output file is missing or unreadable.
    #[error("cannot read {path}: {source}")]
    MissingExpectation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    /// A disk artifact or its expectation could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
