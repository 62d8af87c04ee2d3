//! Compression backends behind a single progress model.
//!
//! The strategy is picked once per packaging job: an external 7-Zip binary
//! when one is available and preferred, otherwise the in-process zip writer.

pub mod builtin;
pub mod external;

pub use builtin::BuiltinCompressor;
pub use external::ExternalCompressor;

use crate::services::config::CompressorConfig;
use crate::services::core::cancel::CancelToken;
use crate::types::errors::CompressionError;
use std::path::{Path, PathBuf};

/// Binary names probed on `PATH`, in order.
const SEVEN_ZIP_BINARIES: &[&str] = &["7z", "7za", "7zz"];

pub trait Compressor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Zip every entry below `source_root` into `dest`, with entry names
    /// relative to `source_root`. `on_progress` receives 0-100 and always
    /// ends with 100 on success.
    fn compress(
        &self,
        source_root: &Path,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
        cancel: &CancelToken,
    ) -> Result<(), CompressionError>;
}

/// Locate a 7-Zip binary: the configured path first, then `PATH`.
pub fn find_seven_zip(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        log::warn!("Configured 7-Zip path {} does not exist", path.display());
    }
    SEVEN_ZIP_BINARIES
        .iter()
        .find_map(|name| which::which(name).ok())
}

pub fn select_compressor(config: &CompressorConfig) -> Box<dyn Compressor> {
    if config.prefer_external {
        if let Some(program) = find_seven_zip(config.seven_zip_path.as_deref()) {
            log::info!("Using external compressor: {}", program.display());
            return Box::new(ExternalCompressor::new(program));
        }
        log::info!("No external compressor found; using built-in zip writer");
    }
    Box::new(BuiltinCompressor::default())
}

#[cfg(test)]
#[path = "tests/builtin_tests.rs"]
mod builtin_tests;

#[cfg(test)]
#[path = "tests/external_tests.rs"]
mod external_tests;
