//! Scratch directories owned by a single run.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::SCRATCH_PREFIX;
use crate::utils::ensure_dir;

/// A uniquely named directory removed when dropped or [`close`](Self::close)d.
///
/// Removal happens on every exit path, including early returns through `?`
/// and panics that unwind.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `dephash-<label>-XXXXXX` under `parent`, or under the system
    /// temp directory when `parent` is `None`.
    pub fn create(parent: Option<&Path>, label: &str) -> Result<Self> {
        let prefix = format!("{SCRATCH_PREFIX}{label}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match parent {
            Some(parent) => {
                // The hash tool runs with a different working directory, so
                // every scratch path handed out must be absolute.
                let parent = std::path::absolute(parent).with_context(|| {
                    format!("Invalid scratch directory: {}", parent.display())
                })?;
                ensure_dir(&parent)?;
                builder.tempdir_in(&parent)
            }
            None => builder.tempdir(),
        }
        .with_context(|| format!("Failed to create {label} scratch directory"))?;

        tracing::debug!(target: "pipeline", "Created scratch directory {}", dir.path().display());
        Ok(Self {
            dir,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path: PathBuf = self.dir.path().to_path_buf();
        tracing::debug!(target: "pipeline", "Removing scratch directory {}", path.display());
        self.dir
            .close()
            .with_context(|| format!("Failed to remove scratch directory: {}", path.display()))
    }
}
