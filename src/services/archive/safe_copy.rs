//! Copy the recognized subtree of an unpacked archive into the content directory.
//!
//! Every destination is validated before anything is written, so a single
//! unsafe path aborts the run with the destination untouched.

use crate::services::core::cancel::CancelToken;
use crate::services::fs_utils::file_utils::{copy_file_preserving, is_junk_name, optimal_workers};
use crate::services::fs_utils::path_utils::{
    absolute, common_ancestor, normalize_relative, safe_join,
};
use crate::types::errors::ExtractionError;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Validated work list for one copy step.
#[derive(Debug, Default)]
pub struct CopyPlan {
    pub source_root: PathBuf,
    pub dirs: Vec<PathBuf>,
    pub files: Vec<(PathBuf, PathBuf)>,
    pub total_bytes: u64,
}

#[derive(Debug, Default)]
pub struct CopyStats {
    pub files_copied: usize,
    pub failed_files: Vec<PathBuf>,
}

/// Common ancestor of all candidates below `scan_root`, clamped to `scan_root`.
pub fn effective_root(scan_root: &Path, candidates: &BTreeSet<PathBuf>) -> PathBuf {
    let root_abs = absolute(scan_root).unwrap_or_else(|_| scan_root.to_path_buf());

    let mut anchored = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match normalize_relative(candidate) {
            Some(rel) => anchored.push(root_abs.join(rel)),
            None => log::warn!("Ignoring candidate outside scan root: {}", candidate.display()),
        }
    }

    match common_ancestor(&anchored) {
        Some(common) if common.starts_with(&root_abs) => common,
        Some(common) => {
            log::warn!(
                "Common base {} escapes {}, clamping",
                common.display(),
                root_abs.display()
            );
            root_abs
        }
        None => root_abs,
    }
}

/// Enumerate directories and files under `source_root` and re-anchor them
/// under `content_dir`. Fails on the first destination outside `content_dir`.
pub fn plan_copy(source_root: &Path, content_dir: &Path) -> Result<CopyPlan, ExtractionError> {
    let content_abs = absolute(content_dir)?;
    let mut plan = CopyPlan {
        source_root: source_root.to_path_buf(),
        ..CopyPlan::default()
    };

    let walker = WalkDir::new(source_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_junk_name(e.file_name())));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        let rel = match entry.path().strip_prefix(source_root) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let dst = safe_join(&content_abs, rel)
            .ok_or_else(|| ExtractionError::UnsafePath(rel.to_path_buf()))?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            plan.dirs.push(dst);
        } else if file_type.is_symlink() {
            log::warn!("Skipping symlink: {}", entry.path().display());
        } else if is_junk_name(entry.file_name()) {
            log::debug!("Skipping junk file: {}", entry.path().display());
        } else {
            plan.total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            plan.files.push((entry.path().to_path_buf(), dst));
        }
    }

    Ok(plan)
}

/// Refuse to start copying when the destination disk cannot hold the payload.
/// Skipped when no mounted disk contains `dest`.
pub fn ensure_disk_space(dest: &Path, required: u64) -> Result<(), ExtractionError> {
    let search_path = dest.canonicalize().unwrap_or_else(|_| dest.to_path_buf());
    let disks = sysinfo::Disks::new_with_refreshed_list();

    let mut available = 0;
    let mut matched_len = 0;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if search_path.starts_with(mount) {
            let mount_len = mount.as_os_str().len();
            if mount_len > matched_len {
                matched_len = mount_len;
                available = disk.available_space();
            }
        }
    }

    if matched_len > 0 && available < required {
        return Err(ExtractionError::InsufficientSpace {
            required,
            available,
        });
    }
    Ok(())
}

/// Create directories serially, then copy files on a bounded local pool.
/// Individual copy failures are logged and reported, not fatal.
pub fn execute_copy(
    plan: &CopyPlan,
    content_dir: &Path,
    cancel: &CancelToken,
) -> Result<CopyStats, ExtractionError> {
    fs::create_dir_all(content_dir)?;
    ensure_disk_space(content_dir, plan.total_bytes)?;

    log::info!(
        "Starting to extract relevant content from [{}] ({} dirs, {} files)",
        plan.source_root.display(),
        plan.dirs.len(),
        plan.files.len()
    );

    for dir in &plan.dirs {
        if let Err(e) = fs::create_dir_all(dir) {
            log::error!("Failed to create directory [{}]: {e}", dir.display());
        }
    }

    if cancel.is_cancelled() {
        return Err(ExtractionError::Cancelled);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(optimal_workers())
        .thread_name(|i| format!("dimcreator-copy-{i}"))
        .build()
        .map_err(|e| ExtractionError::Io(std::io::Error::other(e.to_string())))?;

    let copied = AtomicUsize::new(0);
    let failed: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

    pool.install(|| {
        plan.files.par_iter().for_each(|(src, dst)| {
            if cancel.is_cancelled() {
                return;
            }
            let result = match dst.parent() {
                Some(parent) => fs::create_dir_all(parent),
                None => Ok(()),
            }
            .and_then(|_| copy_file_preserving(src, dst));

            match result {
                Ok(_) => {
                    log::debug!("Copied file [{}] to [{}]", src.display(), dst.display());
                    copied.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    log::error!(
                        "Failed to copy file [{}] to [{}]: {e}",
                        src.display(),
                        dst.display()
                    );
                    failed
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(src.clone());
                }
            }
        });
    });

    if cancel.is_cancelled() {
        return Err(ExtractionError::Cancelled);
    }

    let stats = CopyStats {
        files_copied: copied.into_inner(),
        failed_files: failed
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner()),
    };
    log::info!(
        "Completed extracting relevant content: {} copied, {} failed",
        stats.files_copied,
        stats.failed_files.len()
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "tests/safe_copy_tests.rs"]
mod tests;
