use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{FilesystemError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Pending,
    Succeeded,
    Failed,
}

/// The directory that holds one run's intermediate artifacts
///
/// Created exclusively and removed when dropped, whichever way the run
/// ended, unless the matching keep flag is set. A run that never reports
/// an outcome (cancelled, timed out) counts as failed.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: PathBuf,
    keep_on_success: bool,
    keep_on_failure: bool,
    outcome: Outcome,
}

impl RunWorkspace {
    pub async fn create(root: &Path, run_id: &str, keep_on_success: bool, keep_on_failure: bool) -> Result<Self> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|source| FilesystemError::CreateDir {
                path: root.to_path_buf(),
                source,
            })?;

        let dir = root.join(run_id);
        tokio::fs::create_dir(&dir).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                FilesystemError::RunDirExists { path: dir.clone() }
            } else {
                FilesystemError::CreateDir {
                    path: dir.clone(),
                    source,
                }
            }
        })?;

        debug!(path = %dir.display(), "Run directory created");

        Ok(Self {
            dir,
            keep_on_success,
            keep_on_failure,
            outcome: Outcome::Pending,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path of an artifact inside the run directory
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn mark_succeeded(&mut self) {
        self.outcome = Outcome::Succeeded;
    }

    pub fn mark_failed(&mut self) {
        self.outcome = Outcome::Failed;
    }

    fn keep(&self) -> bool {
        match self.outcome {
            Outcome::Succeeded => self.keep_on_success,
            Outcome::Failed | Outcome::Pending => self.keep_on_failure,
        }
    }
}

// Drop cannot await, so removal stays on std::fs
impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.keep() {
            info!(path = %self.dir.display(), "Keeping run directory");
            return;
        }

        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove run directory {}: {}", self.dir.display(), e);
            }
        } else {
            debug!(path = %self.dir.display(), "Run directory removed");
        }
    }
}
