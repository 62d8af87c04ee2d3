use std::path::{Component, Path, PathBuf};

/// Validates that the `target_path` strictly resolves _inside_ the `base_path`.
/// Rejects path traversal attempts using `..` or absolute paths aiming outside the allowed directory.
pub fn is_path_safe(base_path: &Path, target_path: &Path) -> bool {
    // If the target is absolute, it MUST start with the base_path
    if target_path.is_absolute() {
        return target_path.starts_with(base_path);
    }

    let mut depth = 0;
    for component in target_path.components() {
        match component {
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Component::Normal(_) => {
                depth += 1;
            }
            Component::CurDir => {}
            // Roots or prefixes inside a relative path are never safe.
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }

    true
}

/// Lexically normalize a relative path: drops `.`, resolves `..` against
/// earlier segments. Returns `None` when the path would climb above its start
/// or carries a root/prefix.
pub fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().collect())
}

/// Re-anchor `relative` under `base`. Returns `None` if the result would not
/// resolve inside `base`.
pub fn safe_join(base: &Path, relative: &Path) -> Option<PathBuf> {
    if !is_path_safe(base, relative) || relative.is_absolute() {
        return None;
    }
    let normalized = normalize_relative(relative)?;
    let joined = base.join(normalized);
    if joined.starts_with(base) {
        Some(joined)
    } else {
        None
    }
}

/// Nearest common ancestor of a set of paths, compared component by component.
pub fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut common: Vec<Component> = first.components().collect();

    for path in rest {
        let shared = common
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        return None;
    }
    Some(common.iter().map(|c| c.as_os_str()).collect())
}

/// `path` relative to `base`, joined with forward slashes.
pub fn to_forward_slash_relative(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let segments: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(segments.join("/"))
}

/// Absolute form of `path` without touching the filesystem beyond the
/// current directory lookup.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    // `absolute` keeps `..`; collapse them so prefix checks are meaningful.
    let mut out = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}
