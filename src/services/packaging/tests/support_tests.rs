use super::support::*;
use crate::test_utils::{init_test_logger, write_tree};
use crate::types::errors::PackagingError;
use std::fs;
use tempfile::TempDir;

fn set_readonly(path: &std::path::Path) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms).unwrap();
}

#[test]
fn test_missing_support_dir_is_already_clean() {
    let dir = TempDir::new().unwrap();
    assert_eq!(clean_support_directory(dir.path()).unwrap(), 0);
}

#[test]
fn test_readonly_files_are_removed() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[
            ("Runtime/Support/cover.jpg", b"jpg"),
            ("Runtime/Support/Product.dsx", b"dsx"),
            ("Runtime/Support/nested/deep.png", b"png"),
            ("Runtime/Textures/keep.png", b"keep"),
        ],
    );
    let support = support_dir(dir.path());
    set_readonly(&support.join("cover.jpg"));
    set_readonly(&support.join("Product.dsx"));
    set_readonly(&support.join("nested/deep.png"));

    let removed = clean_support_directory(dir.path()).unwrap();

    assert_eq!(removed, 3);
    assert!(support.is_dir(), "the directory itself is kept");
    assert_eq!(fs::read_dir(&support).unwrap().count(), 0);
    assert!(dir.path().join("Runtime/Textures/keep.png").exists());
}

#[test]
fn test_failure_names_offending_path() {
    let dir = TempDir::new().unwrap();
    // A file where the directory should be cannot be listed.
    write_tree(dir.path(), &[("Runtime/Support", b"not a dir")]);

    let err = clean_support_directory(dir.path()).unwrap_err();
    match &err {
        PackagingError::CleanSupport { path, .. } => assert_eq!(path, &support_dir(dir.path())),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("Failed to clean the Support directory"));
}
