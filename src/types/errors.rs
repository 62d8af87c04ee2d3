use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of the delegated "decompress archive X into directory Y" capability.
#[derive(Debug, Error)]
pub enum DecompressError {
    #[error("No suitable extractor found for {format} archives. Please install one and try again.")]
    NoDecompressor { format: String },
    #[error("Failed to extract {format}: {message}")]
    Failed { format: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Multiple archive files found, canceling extraction.")]
    MultipleArchives { count: usize },
    #[error("No recognized content folders found in the archive.")]
    NoRecognizedFolders,
    #[error("No recognized content folders found in the embedded archive.")]
    NoRecognizedFoldersInEmbedded,
    #[error(transparent)]
    Decompress(#[from] DecompressError),
    #[error("Unsafe path outside content dir: {}", .0.display())]
    UnsafePath(PathBuf),
    #[error(
        "Insufficient disk space. Requires {required} bytes, but only {available} bytes available."
    )]
    InsufficientSpace { required: u64, available: u64 },
    #[error("Extraction cancelled.")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ExtractionError {
    /// Host is missing a decompressor for the detected format.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            ExtractionError::Decompress(DecompressError::NoDecompressor { .. })
        )
    }

    pub fn is_safety_violation(&self) -> bool {
        matches!(self, ExtractionError::UnsafePath(_))
    }
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Failed to launch compressor {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Compressor exited with status {code:?}: {output}")]
    ToolFailed { code: Option<i32>, output: String },
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Compression cancelled.")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("Invalid package spec: {0}")]
    InvalidSpec(String),
    #[error("Failed to clean the Support directory: could not delete {}", path.display())]
    CleanSupport {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Image processing failed: {0}")]
    Image(String),
    #[error("Manifest creation failed: {0}")]
    Manifest(#[source] io::Error),
    #[error("Supplement creation failed: {0}")]
    Supplement(#[source] io::Error),
    #[error("Failed to create ZIP archive: {0}")]
    Compression(#[source] CompressionError),
    #[error("Packaging cancelled.")]
    Cancelled,
}

impl From<CompressionError> for PackagingError {
    fn from(error: CompressionError) -> Self {
        match error {
            CompressionError::Cancelled => PackagingError::Cancelled,
            other => PackagingError::Compression(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to persist config: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("Worker stopped without reporting an outcome.")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} in progress. Please wait.")]
    Busy(String),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Packaging(#[from] PackagingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
