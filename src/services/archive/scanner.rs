//! Single-pass walker that finds content roots and nested archives.
//! Uses `walkdir` without following links.

use super::types::{is_archive_name, ScanResult};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Case-insensitive set of recognized content folder names.
#[derive(Debug, Clone, Default)]
pub struct FolderMatcher {
    names: HashSet<String>,
}

impl FolderMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn matches(&self, segment: &str) -> bool {
        self.names.contains(&segment.to_lowercase())
    }
}

/// Walk `root` once, recording content-root candidates and embedded archives.
///
/// For a non-archive file, the first path segment matching a recognized folder
/// marks everything before it as a candidate; deeper matches are ignored.
pub fn scan_directory(root: &Path, matcher: &FolderMatcher) -> ScanResult {
    let mut result = ScanResult::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry during scan: {e}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if is_archive_name(&file_name) {
            result.embedded_archives.push(entry.path().to_path_buf());
            continue;
        }

        let rel = match entry.path().strip_prefix(root) {
            Ok(r) => r,
            Err(_) => continue,
        };

        if let Some(candidate) = content_root_for(rel, matcher) {
            result.content_roots.insert(candidate);
        }
    }

    log::debug!(
        "Scanned {}: {} content root(s), {} embedded archive(s)",
        root.display(),
        result.content_roots.len(),
        result.embedded_archives.len()
    );
    result
}

/// Prefix of `rel` in front of the first recognized segment, if any.
fn content_root_for(rel: &Path, matcher: &FolderMatcher) -> Option<PathBuf> {
    let mut prefix = PathBuf::new();
    for component in rel.components() {
        let Component::Normal(segment) = component else {
            // Walk output is always plain segments; anything else is not a candidate.
            return None;
        };
        if matcher.matches(&segment.to_string_lossy()) {
            return Some(prefix);
        }
        prefix.push(segment);
    }
    None
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
