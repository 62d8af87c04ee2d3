use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Lower-case file suffixes treated as embedded archives.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".zip", ".rar", ".7z"];

/// Substring (case-insensitive) marking an embedded archive as a template.
pub const TEMPLATE_MARKER: &str = "templ";

/// Supported archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    Zip,
    SevenZ,
    Rar,
}

impl ArchiveFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "zip" => Some(Self::Zip),
            "7z" => Some(Self::SevenZ),
            "rar" => Some(Self::Rar),
            _ => None,
        }
    }

    /// Detect format from the leading bytes of the file.
    pub fn from_magic(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"PK\x03\x04") || header.starts_with(b"PK\x05\x06") {
            Some(Self::Zip)
        } else if header.starts_with(b"7z\xBC\xAF\x27\x1C") {
            Some(Self::SevenZ)
        } else if header.starts_with(b"Rar!\x1A\x07") {
            Some(Self::Rar)
        } else {
            None
        }
    }

    /// Magic bytes first, extension as fallback.
    pub fn detect(path: &Path) -> Option<Self> {
        let mut header = [0u8; 8];
        let sniffed = fs::File::open(path).ok().and_then(|mut f| {
            let n = f.read(&mut header).ok()?;
            Self::from_magic(&header[..n])
        });
        sniffed.or_else(|| Self::from_path(path))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::SevenZ => "7z",
            Self::Rar => "rar",
        }
    }
}

/// True if the file name ends with one of the archive suffixes.
pub fn is_archive_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// True if the archive's file name marks it as a template bundle.
pub fn is_template_archive(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().contains(TEMPLATE_MARKER))
        .unwrap_or(false)
}

/// Outcome of a single scanner pass.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Relative paths (empty = scan root) directly above a recognized folder.
    pub content_roots: BTreeSet<PathBuf>,
    /// Absolute paths of nested archives, in walk order.
    pub embedded_archives: Vec<PathBuf>,
}

impl ScanResult {
    /// Split embedded archives into (templates, content archives).
    pub fn partition_archives(&self) -> (Vec<PathBuf>, Vec<PathBuf>) {
        self.embedded_archives
            .iter()
            .cloned()
            .partition(|p| is_template_archive(p))
    }
}

/// Immutable description of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub archive_path: PathBuf,
    pub content_folders: Vec<String>,
    pub content_dir: PathBuf,
    pub copy_templates: bool,
    pub template_destination: PathBuf,
}

/// Coarse checkpoints reported while extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Decompressing,
    Scanning,
    NestedArchive,
    Copying,
    Done,
}

impl ExtractionStage {
    pub fn percent(&self) -> u8 {
        match self {
            Self::Decompressing => 0,
            Self::Scanning => 30,
            Self::NestedArchive => 40,
            Self::Copying => 60,
            Self::Done => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Decompressing => "Decompressing",
            Self::Scanning => "Scanning",
            Self::NestedArchive => "Extracting embedded archive",
            Self::Copying => "Copying",
            Self::Done => "Done",
        }
    }
}

/// Result of a successful extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub files_copied: usize,
    pub templates_copied: Vec<String>,
    pub failed_files: Vec<PathBuf>,
}
