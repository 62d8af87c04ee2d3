use crate::services::fs_utils::file_utils::remove_path_force;
use crate::types::errors::PackagingError;
use std::fs;
use std::path::{Path, PathBuf};

/// `Runtime/Support` below the content directory.
pub fn support_dir(content_dir: &Path) -> PathBuf {
    content_dir.join("Runtime").join("Support")
}

/// Delete everything inside the support directory, keeping the directory.
///
/// Stops at the first entry that cannot be removed. A missing directory is
/// already clean. Returns the number of top-level entries removed.
pub fn clean_support_directory(content_dir: &Path) -> Result<usize, PackagingError> {
    let target = support_dir(content_dir);
    if !target.exists() {
        return Ok(0);
    }

    log::info!("Attempting to clean Support Directory: {}", target.display());

    let entries = fs::read_dir(&target).map_err(|source| PackagingError::CleanSupport {
        path: target.clone(),
        source,
    })?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|source| PackagingError::CleanSupport {
            path: target.clone(),
            source,
        })?;

        if let Err((path, source)) = remove_path_force(&entry.path()) {
            log::error!("Failed to delete {}. Reason: {source}", path.display());
            return Err(PackagingError::CleanSupport { path, source });
        }
        removed += 1;
    }

    log::info!("Support directory successfully cleaned.");
    Ok(removed)
}
