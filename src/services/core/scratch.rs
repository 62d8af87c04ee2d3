//! Temporary directories owned by a single job.
//!
//! Each directory is a `tempfile::TempDir` (removed on drop) and is also
//! recorded here, so the owner can purge leftovers of a worker it abandoned.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const SCRATCH_PREFIX: &str = "dimcreator-";

#[derive(Debug, Clone, Default)]
pub struct ScratchSpace {
    dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScratchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh temporary directory and track it.
    pub fn create_dir(&self) -> io::Result<TempDir> {
        let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        self.dirs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(dir.path().to_path_buf());
        Ok(dir)
    }

    /// Paths handed out so far that still exist on disk.
    pub fn live_dirs(&self) -> Vec<PathBuf> {
        self.dirs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|p| p.exists())
            .cloned()
            .collect()
    }

    /// Best-effort removal of every tracked directory. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let dirs: Vec<PathBuf> = std::mem::take(
            &mut *self
                .dirs
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        let mut removed = 0;
        for dir in dirs {
            if !dir.exists() {
                continue;
            }
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Failed to remove scratch dir {}: {e}", dir.display()),
            }
        }
        removed
    }
}
