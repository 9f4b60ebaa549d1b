//! Byte-exact comparison of disk image artifacts.

use crate::error::CaseError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Artifact names: `disk` optionally followed by one digit.
static DISK_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^disk[0-9]?$").expect("disk name pattern is valid")
});

/// Suffix appended to an artifact's name to find its expected image.
pub const EXPECTED_SUFFIX: &str = "_expected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskOutcome {
    /// Byte-identical to the expected image.
    Match,
    /// Differs from the expected image.
    Mismatch,
    /// No expected image exists; counted as a match.
    NoExpectation,
}

#[derive(Debug, Clone)]
pub struct DiskVerdict {
    pub name: String,
    pub outcome: DiskOutcome,
}

impl DiskVerdict {
    pub fn passed(&self) -> bool {
        !matches!(self.outcome, DiskOutcome::Mismatch)
    }
}

/// True if `name` is a disk artifact name.
pub fn is_disk_name(name: &str) -> bool {
    DISK_NAME.is_match(name)
}

/// Path of the expected image for `artifact`.
pub fn expected_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.file_name().unwrap_or_default().to_os_string();
    name.push(EXPECTED_SUFFIX);
    artifact.with_file_name(name)
}

/// List disk artifacts directly inside `dir`, sorted by name.
///
/// Only actual artifacts are returned; expected-only images are ignored.
pub fn discover_disks(dir: &Path) -> Result<Vec<PathBuf>, CaseError> {
    let io_err = |source: std::io::Error| CaseError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut disks = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let is_file = entry.file_type().map_err(io_err)?.is_file();
        if is_file && entry.file_name().to_str().is_some_and(is_disk_name) {
            disks.push(entry.path());
        }
    }
    disks.sort();
    Ok(disks)
}

/// Compare `artifact` against its `_expected` sibling.
pub fn compare_disk(artifact: &Path) -> Result<DiskVerdict, CaseError> {
    let name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let expected = expected_path(artifact);

    if !expected.exists() {
        tracing::debug!(disk = %name, "no expected image, accepting");
        return Ok(DiskVerdict {
            name,
            outcome: DiskOutcome::NoExpectation,
        });
    }

    let read = |path: &Path| {
        std::fs::read(path).map_err(|source| CaseError::Io {
            path: path.to_path_buf(),
            source,
        })
    };
    let outcome = if read(artifact)? == read(&expected)? {
        DiskOutcome::Match
    } else {
        DiskOutcome::Mismatch
    };

    Ok(DiskVerdict { name, outcome })
}
