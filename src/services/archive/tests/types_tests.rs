use super::types::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_format_detection() {
    assert_eq!(
        ArchiveFormat::from_path(Path::new("product.zip")),
        Some(ArchiveFormat::Zip)
    );
    assert_eq!(
        ArchiveFormat::from_path(Path::new("product.7Z")),
        Some(ArchiveFormat::SevenZ)
    );
    assert_eq!(
        ArchiveFormat::from_path(Path::new("product.rar")),
        Some(ArchiveFormat::Rar)
    );
    assert_eq!(ArchiveFormat::from_path(Path::new("product.txt")), None);
}

#[test]
fn test_magic_bytes_win_over_extension() {
    let dir = TempDir::new().unwrap();
    let disguised = dir.path().join("really_a_zip.rar");
    fs::write(&disguised, b"PK\x03\x04rest-of-header").unwrap();

    assert_eq!(ArchiveFormat::detect(&disguised), Some(ArchiveFormat::Zip));
}

#[test]
fn test_archive_names_and_templates() {
    assert!(is_archive_name("Bundle.ZIP"));
    assert!(is_archive_name("x.7z"));
    assert!(!is_archive_name("x.zipx"));

    assert!(is_template_archive(Path::new("/tmp/MyProduct_Templates.zip")));
    assert!(is_template_archive(Path::new("TEMPLATE.rar")));
    assert!(!is_template_archive(Path::new("/tmp/templ_dir/Content.zip")));
}

#[test]
fn test_stage_percent_is_monotonic() {
    let stages = [
        ExtractionStage::Decompressing,
        ExtractionStage::Scanning,
        ExtractionStage::NestedArchive,
        ExtractionStage::Copying,
        ExtractionStage::Done,
    ];
    assert!(stages.windows(2).all(|w| w[0].percent() <= w[1].percent()));
    assert_eq!(ExtractionStage::Done.percent(), 100);
}
