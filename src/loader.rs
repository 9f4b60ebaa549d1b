//! Suite loader.
//!
//! Loads the optional suite configuration and discovers test cases on disk.

use crate::error::LoadError;
use crate::schema::SuiteConfig;
use std::path::{Path, PathBuf};

/// Candidate names for the suite configuration file, in lookup order.
pub const SUITE_CONFIG_FILENAMES: [&str; 3] = ["fsconform.yaml", "fsconform.yml", "fsconform.toml"];

/// Directory name prefix that marks a test case.
pub const CASE_PREFIX: &str = "test";

/// A test case discovered under the tests root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Directory name, used as the case name in reports.
    pub name: String,
    /// Fixture directory.
    pub dir: PathBuf,
}

/// Load a suite config from a file path.
pub fn load_config_file(path: &Path) -> Result<SuiteConfig, LoadError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match ext {
        "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        "toml" => toml::from_str(&contents).map_err(|source| LoadError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Load suite configuration from the tests root.
///
/// Returns `None` if no config file exists, `Err` if one exists but is invalid.
pub fn load_suite_config(dir: &Path) -> Result<Option<SuiteConfig>, LoadError> {
    let Some(path) = SUITE_CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
    else {
        return Ok(None);
    };

    tracing::debug!(path = %path.display(), "loading suite config");
    load_config_file(&path).map(Some)
}

/// Find all test cases under `root`.
///
/// Only immediate subdirectories whose name starts with `test` are cases.
/// Results are sorted by name; `filter` keeps names containing the substring.
pub fn find_cases(root: &Path, filter: Option<&str>) -> Result<Vec<TestCase>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }

    let io_err = |source: std::io::Error| LoadError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut cases = Vec::new();
    for entry in std::fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping non-UTF-8 directory name");
            continue;
        };
        if !name.starts_with(CASE_PREFIX) {
            continue;
        }
        if filter.is_some_and(|f| !name.contains(f)) {
            continue;
        }
        cases.push(TestCase {
            name: name.to_string(),
            dir: path.clone(),
        });
    }

    cases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn find_cases_filters_by_prefix_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["test_b", "test_a", "other", "test10", "atest"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("test_file"), "").unwrap();

        let cases = find_cases(dir.path(), None).unwrap();
        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["test10", "test_a", "test_b"]);
        assert_eq!(cases[1].dir, dir.path().join("test_a"));
    }

    #[test]
    fn find_cases_with_filter() {
        let dir = tempdir().unwrap();
        for name in ["test_mount", "test_write", "test_write_big"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }

        let cases = find_cases(dir.path(), Some("write")).unwrap();
        assert_eq!(cases.len(), 2);
        assert!(cases.iter().all(|c| c.name.contains("write")));
    }

    #[test]
    fn find_cases_missing_root() {
        let dir = tempdir().unwrap();
        let result = find_cases(&dir.path().join("nope"), None);
        assert!(matches!(result, Err(LoadError::MissingRoot(_))));
    }

    #[test]
    fn find_cases_empty_root() {
        let dir = tempdir().unwrap();
        assert!(find_cases(dir.path(), None).unwrap().is_empty());
    }

    #[test]
    fn load_suite_config_not_found() {
        let dir = tempdir().unwrap();
        assert!(load_suite_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn load_suite_config_yaml() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("fsconform.yaml"),
            "version: 1\ntimeout: 10\nexecutable: ./fs\n",
        )
        .unwrap();

        let config = load_suite_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.timeout, Some(10));
        assert_eq!(config.executable, Some(PathBuf::from("./fs")));
    }

    #[test]
    fn load_suite_config_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("fsconform.toml"), "fail_fast = true\n").unwrap();

        let config = load_suite_config(dir.path()).unwrap().unwrap();
        assert!(config.fail_fast);
    }

    #[test]
    fn load_suite_config_yaml_wins_over_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("fsconform.yaml"), "timeout: 1\n").unwrap();
        std::fs::write(dir.path().join("fsconform.toml"), "timeout = 2\n").unwrap();

        let config = load_suite_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.timeout, Some(1));
    }

    #[test]
    fn load_suite_config_invalid() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("fsconform.yaml"), "invalid: [yaml: {").unwrap();

        let result = load_suite_config(dir.path());
        assert!(matches!(result, Err(LoadError::Yaml { .. })));
    }

    #[test]
    fn load_config_file_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fsconform.ini");
        std::fs::write(&path, "").unwrap();

        let result = load_config_file(&path);
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }
}
