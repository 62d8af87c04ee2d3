use super::path_utils::*;
use std::path::{Path, PathBuf};

#[test]
fn test_is_path_safe_rejects_escape() {
    let base = Path::new("/content");
    assert!(is_path_safe(base, Path::new("data/file.duf")));
    assert!(is_path_safe(base, Path::new("data/../runtime")));
    assert!(!is_path_safe(base, Path::new("../outside")));
    assert!(!is_path_safe(base, Path::new("data/../../outside")));
    assert!(!is_path_safe(base, Path::new("/etc/passwd")));
    assert!(is_path_safe(base, Path::new("/content/data")));
}

#[test]
fn test_safe_join_stays_inside_base() {
    let base = Path::new("/content");
    assert_eq!(
        safe_join(base, Path::new("data/./b.duf")),
        Some(PathBuf::from("/content/data/b.duf"))
    );
    assert_eq!(
        safe_join(base, Path::new("data/x/../b.duf")),
        Some(PathBuf::from("/content/data/b.duf"))
    );
    assert_eq!(safe_join(base, Path::new("../b.duf")), None);
    assert_eq!(safe_join(base, Path::new("/content/b.duf")), None);
}

#[test]
fn test_normalize_relative() {
    assert_eq!(
        normalize_relative(Path::new("a/./b/../c")),
        Some(PathBuf::from("a/c"))
    );
    assert_eq!(normalize_relative(Path::new("a/../..")), None);
    assert_eq!(normalize_relative(Path::new("")), Some(PathBuf::new()));
}

#[test]
fn test_common_ancestor() {
    let paths = vec![
        PathBuf::from("/tmp/x/Product/Content"),
        PathBuf::from("/tmp/x/Product/Extras"),
    ];
    assert_eq!(
        common_ancestor(&paths),
        Some(PathBuf::from("/tmp/x/Product"))
    );

    let single = vec![PathBuf::from("/tmp/x/Product")];
    assert_eq!(common_ancestor(&single), Some(PathBuf::from("/tmp/x/Product")));

    assert_eq!(common_ancestor(&[]), None);
}

#[test]
fn test_common_ancestor_does_not_split_names() {
    let paths = vec![PathBuf::from("/tmp/abc"), PathBuf::from("/tmp/abd")];
    assert_eq!(common_ancestor(&paths), Some(PathBuf::from("/tmp")));
}

#[test]
fn test_forward_slash_relative() {
    let base = Path::new("/build/Content");
    let file = Path::new("/build/Content/Runtime/Support/a.jpg");
    assert_eq!(
        to_forward_slash_relative(file, base),
        Some("Runtime/Support/a.jpg".to_string())
    );
    assert_eq!(to_forward_slash_relative(Path::new("/other"), base), None);
}

#[test]
fn test_absolute_collapses_parent_segments() {
    let abs = absolute(Path::new("/a/b/../c")).unwrap();
    assert_eq!(abs, PathBuf::from("/a/c"));
}
