//! The "decompress archive X into directory Y" capability.
//!
//! Pipelines only see the `Decompressor` trait; `BuiltinDecompressor` backs it
//! with the zip, sevenz-rust and rar crates.

use super::types::ArchiveFormat;
use crate::types::errors::DecompressError;
use std::fs;
use std::io;
use std::path::Path;

pub trait Decompressor: Send + Sync {
    /// Unpack every entry of `archive_path` below `out_dir`.
    fn decompress(&self, archive_path: &Path, out_dir: &Path) -> Result<(), DecompressError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinDecompressor;

impl Decompressor for BuiltinDecompressor {
    fn decompress(&self, archive_path: &Path, out_dir: &Path) -> Result<(), DecompressError> {
        let format =
            ArchiveFormat::detect(archive_path).ok_or_else(|| DecompressError::NoDecompressor {
                format: archive_path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_else(|| "unknown".to_string()),
            })?;

        fs::create_dir_all(out_dir)?;
        log::debug!(
            "Decompressing {} ({}) into {}",
            archive_path.display(),
            format.label(),
            out_dir.display()
        );

        match format {
            ArchiveFormat::Zip => extract_zip_inner(archive_path, out_dir),
            ArchiveFormat::SevenZ => extract_7z_inner(archive_path, out_dir),
            ArchiveFormat::Rar => extract_rar_inner(archive_path, out_dir),
        }
    }
}

fn failed(format: ArchiveFormat, message: impl Into<String>) -> DecompressError {
    DecompressError::Failed {
        format: format.label().to_string(),
        message: message.into(),
    }
}

fn extract_zip_inner(archive_path: &Path, dest_path: &Path) -> Result<(), DecompressError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| failed(ArchiveFormat::Zip, format!("Invalid or corrupt ZIP: {e}")))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| failed(ArchiveFormat::Zip, format!("Failed to read entry {i}: {e}")))?;

        let entry_path = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                log::warn!("Skipping unsafe ZIP entry: {}", entry.name());
                continue;
            }
        };

        let output_path = dest_path.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)?;
        } else {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&output_path)?;
            io::copy(&mut entry, &mut outfile)?;
        }
    }
    Ok(())
}

fn extract_7z_inner(archive_path: &Path, dest_path: &Path) -> Result<(), DecompressError> {
    sevenz_rust::decompress_file(archive_path, dest_path)
        .map_err(|e| failed(ArchiveFormat::SevenZ, e.to_string()))
}

fn extract_rar_inner(archive_path: &Path, dest_path: &Path) -> Result<(), DecompressError> {
    let path_str = archive_path
        .to_str()
        .ok_or_else(|| failed(ArchiveFormat::Rar, "RAR path contains invalid UTF-8"))?;
    let dest_str = dest_path
        .to_str()
        .ok_or_else(|| failed(ArchiveFormat::Rar, "Dest path contains invalid UTF-8"))?;

    rar::Archive::extract_all(path_str, dest_str, "")
        .map_err(|e| failed(ArchiveFormat::Rar, format!("{e:?}")))?;
    Ok(())
}
