use super::*;
use crate::test_utils::{list_files, write_tree};
use std::path::Component;
use tempfile::TempDir;

#[test]
fn test_effective_root_common_ancestor() {
    let dir = TempDir::new().unwrap();
    let candidates: BTreeSet<PathBuf> = [
        PathBuf::from("Product/Content"),
        PathBuf::from("Product/Extras"),
    ]
    .into_iter()
    .collect();

    let base = effective_root(dir.path(), &candidates);
    assert_eq!(base, absolute(dir.path()).unwrap().join("Product"));
}

#[test]
fn test_effective_root_empty_candidates_is_scan_root() {
    let dir = TempDir::new().unwrap();
    let base = effective_root(dir.path(), &BTreeSet::new());
    assert_eq!(base, absolute(dir.path()).unwrap());
}

#[test]
fn test_effective_root_clamps_escaping_candidate() {
    let dir = TempDir::new().unwrap();
    let candidates: BTreeSet<PathBuf> = [PathBuf::from("../../elsewhere")].into_iter().collect();
    let base = effective_root(dir.path(), &candidates);
    assert_eq!(base, absolute(dir.path()).unwrap());
}

#[test]
fn test_plan_copy_destinations_stay_inside_content_dir() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tree(
        src.path(),
        &[
            ("data/a/b.duf", b"b"),
            ("Runtime/Textures/t.png", b"t"),
            ("Runtime/.DS_Store", b"junk"),
            ("__MACOSX/data/._b.duf", b"junk"),
        ],
    );

    let plan = plan_copy(src.path(), dest.path()).unwrap();
    let content_abs = absolute(dest.path()).unwrap();

    assert_eq!(plan.files.len(), 2);
    for (_, dst) in &plan.files {
        assert!(dst.starts_with(&content_abs));
        let rel = dst.strip_prefix(&content_abs).unwrap();
        assert!(rel.components().all(|c| matches!(c, Component::Normal(_))));
    }
    assert!(plan.dirs.iter().all(|d| d.starts_with(&content_abs)));
    assert!(!plan.dirs.iter().any(|d| d.ends_with("__MACOSX")));
    assert_eq!(plan.total_bytes, 2);
}

#[test]
fn test_execute_copy_copies_planned_files() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tree(
        src.path(),
        &[("data/a.duf", b"aaa"), ("Runtime/empty/.keep", b""), ("Thumbs.db", b"x")],
    );
    std::fs::create_dir_all(src.path().join("Runtime/Libraries")).unwrap();

    let plan = plan_copy(src.path(), dest.path()).unwrap();
    let stats = execute_copy(&plan, dest.path(), &CancelToken::new()).unwrap();

    assert_eq!(stats.files_copied, 2);
    assert!(stats.failed_files.is_empty());
    assert_eq!(
        list_files(dest.path()),
        vec!["Runtime/empty/.keep".to_string(), "data/a.duf".to_string()]
    );
    // Empty directories are recreated serially before file copies.
    assert!(dest.path().join("Runtime/Libraries").is_dir());
}

#[test]
fn test_execute_copy_respects_cancellation() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tree(src.path(), &[("data/a.duf", b"a")]);

    let plan = plan_copy(src.path(), dest.path()).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = execute_copy(&plan, dest.path(), &cancel).unwrap_err();
    assert!(matches!(err, ExtractionError::Cancelled));
    assert!(!dest.path().join("data/a.duf").exists());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_skipped() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write_tree(src.path(), &[("data/real.duf", b"r")]);
    write_tree(outside.path(), &[("secret.txt", b"s")]);

    std::os::unix::fs::symlink(
        outside.path().join("secret.txt"),
        src.path().join("data/link.duf"),
    )
    .unwrap();
    std::os::unix::fs::symlink(outside.path(), src.path().join("data/linked_dir")).unwrap();

    let plan = plan_copy(src.path(), dest.path()).unwrap();
    execute_copy(&plan, dest.path(), &CancelToken::new()).unwrap();

    assert_eq!(list_files(dest.path()), vec!["data/real.duf".to_string()]);
    assert!(std::fs::symlink_metadata(dest.path().join("data/link.duf")).is_err());
    assert!(std::fs::symlink_metadata(dest.path().join("data/linked_dir")).is_err());
}

#[test]
fn test_disk_space_check_passes_for_small_payload() {
    let dest = TempDir::new().unwrap();
    assert!(ensure_disk_space(dest.path(), 1).is_ok());
}

#[test]
fn test_disk_space_requirement_is_the_payload_size() {
    let dest = TempDir::new().unwrap();
    match ensure_disk_space(dest.path(), u64::MAX) {
        Err(ExtractionError::InsufficientSpace {
            required,
            available,
        }) => {
            assert_eq!(required, u64::MAX);
            assert!(available < required);
        }
        // No mounted disk contains the temp dir.
        Ok(()) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }
}
