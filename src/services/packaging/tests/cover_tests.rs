use super::cover::*;
use crate::types::errors::PackagingError;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use tempfile::TempDir;

fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 128]));
    DynamicImage::ImageRgba8(img).save(&path).unwrap();
    path
}

#[test]
fn test_large_image_is_downscaled_into_support_dir() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("Content");
    let source = write_png(dir.path(), "cover.png", 600, 400);

    let target = process_cover_image(&content, "DAZ 3D", "47", "My Product", &source).unwrap();

    assert_eq!(
        target,
        content.join("Runtime/Support/DAZ_3D_47_My_Product.jpg")
    );
    let saved = image::open(&target).unwrap();
    assert_eq!(saved.dimensions(), (300, 200));
    assert_eq!(saved.color(), image::ColorType::Rgb8);
}

#[test]
fn test_small_image_is_not_enlarged() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("Content");
    let source = write_png(dir.path(), "small.png", 120, 80);

    let target = process_cover_image(&content, "Shop", "1", "Tiny", &source).unwrap();

    let saved = image::open(&target).unwrap();
    assert_eq!(saved.dimensions(), (120, 80));
}

#[test]
fn test_invalid_image_is_image_error() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"definitely not a png").unwrap();

    let err = process_cover_image(dir.path(), "S", "1", "P", &bogus).unwrap_err();
    assert!(matches!(err, PackagingError::Image(_)));
    assert!(err.to_string().starts_with("Image processing failed"));
}

#[test]
fn test_missing_image_is_image_error() {
    let dir = TempDir::new().unwrap();
    let err =
        process_cover_image(dir.path(), "S", "1", "P", &dir.path().join("nope.jpg")).unwrap_err();
    assert!(matches!(err, PackagingError::Image(_)));
}
