use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// OS metadata entries never copied, packaged or listed.
pub const JUNK_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini", "__MACOSX"];

/// Upper bound for the file copy pool.
const MAX_WORKERS: usize = 8;

pub fn is_junk_name(name: &OsStr) -> bool {
    JUNK_NAMES.iter().any(|junk| OsStr::new(junk) == name)
}

/// Copy pool size: 1.5x logical cores, at least 2, capped at 8.
pub fn optimal_workers() -> usize {
    let logical = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let suggested = std::cmp::max(2, logical * 3 / 2);
    std::cmp::min(suggested, MAX_WORKERS)
}

/// Walk `root` without following links. Within each directory, files come
/// before subdirectories and both are sorted by name, which yields the same
/// file order as a top-down walk with sorted listings.
pub fn sorted_walk(root: &Path) -> WalkDir {
    WalkDir::new(root).follow_links(false).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    })
}

/// Drop the read-only attribute so the entry can be removed.
pub fn clear_readonly(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }
    let mut permissions = metadata.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = permissions.mode();
        if mode & 0o200 != 0 {
            return Ok(());
        }
        permissions.set_mode(mode | 0o200);
    }
    #[cfg(not(unix))]
    {
        if !permissions.readonly() {
            return Ok(());
        }
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
    }

    fs::set_permissions(path, permissions)
}

/// Remove a file, symlink or directory tree, clearing read-only attributes
/// on the way. On failure returns the first entry that could not be removed.
pub fn remove_path_force(path: &Path) -> Result<(), (PathBuf, io::Error)> {
    let metadata = fs::symlink_metadata(path).map_err(|e| (path.to_path_buf(), e))?;

    if metadata.is_dir() {
        if let Err(e) = clear_readonly(path) {
            log::debug!("Could not clear read-only on {}: {e}", path.display());
        }
        let entries = fs::read_dir(path).map_err(|e| (path.to_path_buf(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| (path.to_path_buf(), e))?;
            remove_path_force(&entry.path())?;
        }
        fs::remove_dir(path).map_err(|e| (path.to_path_buf(), e))
    } else {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(first) => {
                log::debug!("Retrying delete of {} after clearing read-only: {first}", path.display());
                clear_readonly(path).map_err(|e| (path.to_path_buf(), e))?;
                fs::remove_file(path).map_err(|e| (path.to_path_buf(), e))
            }
        }
    }
}

/// Copy a file and carry over its modification time.
pub fn copy_file_preserving(src: &Path, dst: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dst)?;
    let metadata = fs::metadata(src)?;
    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    if let Err(e) = filetime::set_file_mtime(dst, mtime) {
        log::warn!("Could not preserve mtime on {}: {e}", dst.display());
    }
    Ok(bytes)
}
