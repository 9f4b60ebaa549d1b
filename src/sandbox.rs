//! Per-case isolation sandbox.
//!
//! Each test case runs inside a private copy of its fixture directory. The
//! sandbox path is handed to the invoker and comparators explicitly; the
//! process working directory is never touched. The directory is removed when
//! the [`Sandbox`] is dropped, on every exit path.

use std::io;
use std::path::{Path, PathBuf};

/// A disposable working copy of one fixture.
#[derive(Debug)]
pub struct Sandbox {
    dir: tempfile::TempDir,
}

/// Options controlling where sandboxes are created and whether they persist.
#[derive(Debug, Clone, Default)]
pub struct SandboxOptions {
    /// Parent directory for sandboxes (system temp dir when `None`).
    pub root: Option<PathBuf>,
    /// Leave the directory on disk after the case finishes.
    pub keep: bool,
}

impl Sandbox {
    /// Create a sandbox seeded with a recursive copy of `fixture`.
    pub fn from_fixture(fixture: &Path, options: &SandboxOptions) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("fsconform-").keep(options.keep);
        let dir = match &options.root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        copy_dir_recursive(fixture, dir.path())?;
        tracing::debug!(
            fixture = %fixture.display(),
            sandbox = %dir.path().display(),
            "sandbox ready"
        );
        if options.keep {
            tracing::info!(sandbox = %dir.path().display(), "keeping sandbox");
        }

        Ok(Self { dir })
    }

    /// Root of the sandbox.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Recursively copy `src` into `dst`.
///
/// Existing entries in `dst` are overwritten rather than treated as errors.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}
