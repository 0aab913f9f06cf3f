use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

/// Scratch directory owned by one run. Created with a run-unique name and
/// removed on drop, so cleanup happens on success, failure, and unwind alike.
pub struct RunSession {
    id: String,
    scratch: TempDir,
}

impl RunSession {
    pub fn new() -> anyhow::Result<Self> {
        let scratch = tempfile::Builder::new().prefix("storyvid-").tempdir()?;
        let id = scratch
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("storyvid-run")
            .to_string();
        debug!("Created scratch directory {}", scratch.path().display());
        Ok(Self { id, scratch })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Path of a named artifact inside the scratch directory.
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.scratch.path().join(name)
    }
}
