//! Housekeeping on the build directory that holds `Content/` and the
//! generated metadata files.

use crate::services::archive::FolderMatcher;
use crate::services::fs_utils::file_utils::remove_path_force;
use std::fs;
use std::io;
use std::path::Path;

pub const CONTENT_DIR_NAME: &str = "Content";

/// Delete every entry of `build_dir` and recreate an empty `Content/`.
///
/// Entries that cannot be removed are logged and skipped. Returns how many
/// top-level entries were removed.
pub fn reset_build_dir(build_dir: &Path) -> io::Result<usize> {
    log::info!("Attempting to clean the build folder: {}", build_dir.display());
    fs::create_dir_all(build_dir)?;

    let mut removed = 0;
    for entry in fs::read_dir(build_dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to read entry in {}: {e}", build_dir.display());
                continue;
            }
        };
        match remove_path_force(&entry.path()) {
            Ok(()) => removed += 1,
            Err((path, e)) => log::error!("Failed to delete {}: {e}", path.display()),
        }
    }

    fs::create_dir_all(build_dir.join(CONTENT_DIR_NAME))?;
    log::info!("Build folder successfully cleared ({removed} entries removed).");
    Ok(removed)
}

/// True when a recognized folder is a direct child of `content_dir`.
pub fn validate_content_dir<S: AsRef<str>>(content_dir: &Path, folders: &[S]) -> bool {
    let matcher = FolderMatcher::new(folders.iter().map(|f| f.as_ref()));
    let entries = match fs::read_dir(content_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read content dir {}: {e}", content_dir.display());
            return false;
        }
    };

    entries.filter_map(|e| e.ok()).any(|entry| {
        entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
            && matcher.matches(&entry.file_name().to_string_lossy())
    })
}

#[cfg(test)]
#[path = "tests/workspace_tests.rs"]
mod tests;
