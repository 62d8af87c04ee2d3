use super::naming::cover_image_name;
use super::support::support_dir;
use crate::types::errors::PackagingError;
use image::{imageops::FilterType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Bounding box of the generated cover.
pub const COVER_MAX_SIZE: u32 = 300;

/// Normalize `image_path` into a JPEG cover under the support directory.
///
/// EXIF orientation is applied, the image is forced to RGB and shrunk to fit
/// the bounding box (never enlarged). Returns the written path.
pub fn process_cover_image(
    content_dir: &Path,
    store: &str,
    sku: &str,
    product_name: &str,
    image_path: &Path,
) -> Result<PathBuf, PackagingError> {
    log::info!(
        "Attempting to generate Product cover from: {}",
        image_path.display()
    );

    let image = load_oriented(image_path)?;
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let resized = if rgb.width() > COVER_MAX_SIZE || rgb.height() > COVER_MAX_SIZE {
        rgb.resize(COVER_MAX_SIZE, COVER_MAX_SIZE, FilterType::Lanczos3)
    } else {
        rgb
    };

    let mut encoded = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .map_err(|e| PackagingError::Image(format!("Failed to encode cover: {e}")))?;

    let target_dir = support_dir(content_dir);
    fs::create_dir_all(&target_dir)
        .map_err(|e| PackagingError::Image(format!("Failed to create support dir: {e}")))?;
    let target = target_dir.join(cover_image_name(store, sku, product_name));
    fs::write(&target, encoded)
        .map_err(|e| PackagingError::Image(format!("Failed to save cover: {e}")))?;

    log::info!("Product cover successfully generated at: {}", target.display());
    Ok(target)
}

fn load_oriented(path: &Path) -> Result<DynamicImage, PackagingError> {
    let mut decoder = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| PackagingError::Image(format!("Failed to open image: {e}")))?
        .into_decoder()
        .map_err(|e| PackagingError::Image(format!("Unsupported image: {e}")))?;

    let orientation = decoder
        .orientation()
        .unwrap_or(image::metadata::Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| PackagingError::Image(format!("Failed to decode image: {e}")))?;
    image.apply_orientation(orientation);
    Ok(image)
}
