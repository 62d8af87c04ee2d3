//! Archive import: scan unpacked archives for recognized content folders and
//! copy that subtree into the content directory.

pub mod decompress;
pub mod extract;
pub mod safe_copy;
pub mod scanner;
pub mod types;

// Re-export public API
pub use decompress::{BuiltinDecompressor, Decompressor};
pub use extract::run_extraction;
pub use scanner::{scan_directory, FolderMatcher};
pub use types::{
    ArchiveFormat, ExtractionReport, ExtractionRequest, ExtractionStage, ScanResult,
};

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod extract_tests;

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod types_tests;
