use super::Compressor;
use crate::services::core::cancel::CancelToken;
use crate::services::fs_utils::file_utils::{is_junk_name, sorted_walk};
use crate::services::fs_utils::path_utils::{absolute, to_forward_slash_relative};
use crate::types::errors::CompressionError;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const DEFAULT_LEVEL: i64 = 6;

/// In-process zip writer (Deflate) with byte-based progress.
#[derive(Debug, Clone)]
pub struct BuiltinCompressor {
    level: i64,
}

impl Default for BuiltinCompressor {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

struct PendingFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl Compressor for BuiltinCompressor {
    fn name(&self) -> &'static str {
        "built-in zip"
    }

    fn compress(
        &self,
        source_root: &Path,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
        cancel: &CancelToken,
    ) -> Result<(), CompressionError> {
        let root = absolute(source_root)?;
        let dest_abs = absolute(dest)?;
        let files = collect_files(&root, &dest_abs)?;
        let total_bytes: u64 = files.iter().map(|f| f.size).sum();

        let result = self.write_archive(&files, total_bytes, &dest_abs, on_progress, cancel);
        if result.is_err() {
            if let Err(e) = fs::remove_file(&dest_abs) {
                log::warn!("Failed to remove partial archive {}: {e}", dest_abs.display());
            }
        }
        result
    }
}

impl BuiltinCompressor {
    fn write_archive(
        &self,
        files: &[PendingFile],
        total_bytes: u64,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
        cancel: &CancelToken,
    ) -> Result<(), CompressionError> {
        let mut writer = ZipWriter::new(fs::File::create(dest)?);
        let base_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.level));

        let mut written: u64 = 0;
        for file in files {
            if cancel.is_cancelled() {
                return Err(CompressionError::Cancelled);
            }

            let metadata = fs::metadata(&file.path)?;
            let mut options = base_options.large_file(metadata.len() >= u32::MAX as u64);
            if let Some(modified) = metadata.modified().ok().and_then(zip_timestamp) {
                options = options.last_modified_time(modified);
            }

            writer.start_file(file.name.as_str(), options)?;
            let mut reader = fs::File::open(&file.path)?;
            written += io::copy(&mut reader, &mut writer)?;

            let percent = if total_bytes == 0 {
                100
            } else {
                ((written.min(total_bytes) * 100) / total_bytes) as u8
            };
            on_progress(percent);
        }

        writer.finish()?;
        on_progress(100);
        log::debug!("Wrote {} file(s), {written} byte(s) to {}", files.len(), dest.display());
        Ok(())
    }
}

/// Files to archive in sorted walk order, skipping links, junk and `dest`.
fn collect_files(root: &Path, dest: &Path) -> Result<Vec<PendingFile>, CompressionError> {
    let walker = sorted_walk(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_junk_name(e.file_name())));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if file_type.is_symlink() {
            log::warn!("Skipping symlink: {}", entry.path().display());
            continue;
        }
        if is_junk_name(entry.file_name()) || entry.path() == dest {
            continue;
        }
        let Some(name) = to_forward_slash_relative(entry.path(), root) else {
            continue;
        };
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        files.push(PendingFile {
            path: entry.into_path(),
            name,
            size,
        });
    }
    Ok(files)
}

fn zip_timestamp(time: std::time::SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second().min(59) as u8,
    )
    .ok()
}
