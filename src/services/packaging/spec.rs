use super::naming::zip_file_name;
use crate::services::fs_utils::path_utils::absolute;
use crate::types::errors::PackagingError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything one packaging run needs. Built once, never mutated after
/// submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub content_dir: PathBuf,
    pub store: String,
    pub product_name: String,
    pub prefix: String,
    pub sku: String,
    pub part: u8,
    /// Comma-joined, written verbatim to the supplement.
    pub tags: String,
    pub image_path: Option<PathBuf>,
    pub clean_support: bool,
    pub guid: String,
    pub destination: PathBuf,
}

impl PackageSpec {
    pub fn validate(&self) -> Result<(), PackagingError> {
        if !(1..=99).contains(&self.part) {
            return Err(PackagingError::InvalidSpec(format!(
                "part number must be between 1 and 99, got {}",
                self.part
            )));
        }
        if self.guid.trim().is_empty() {
            return Err(PackagingError::InvalidSpec("GUID is empty".to_string()));
        }
        if !self.content_dir.is_dir() {
            return Err(PackagingError::InvalidSpec(format!(
                "content directory does not exist: {}",
                self.content_dir.display()
            )));
        }
        Ok(())
    }

    pub fn zip_file_name(&self) -> String {
        zip_file_name(&self.prefix, &self.sku, self.part, &self.product_name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.destination.join(self.zip_file_name())
    }

    /// Same spec with `content_dir` and `destination` anchored at the current
    /// directory. Stages look at the content directory's parent, which a
    /// bare relative name like `Content` does not have.
    pub fn with_absolute_paths(&self) -> Result<PackageSpec, PackagingError> {
        Ok(PackageSpec {
            content_dir: resolve(&self.content_dir)?,
            destination: resolve(&self.destination)?,
            ..self.clone()
        })
    }
}

fn resolve(path: &Path) -> Result<PathBuf, PackagingError> {
    absolute(path).map_err(|e| {
        PackagingError::InvalidSpec(format!("cannot resolve {}: {e}", path.display()))
    })
}
