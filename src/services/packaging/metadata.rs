//! `Manifest.dsx` and `Supplement.dsx`, written next to the content directory.
//!
//! Both documents are tiny and flat, so they are rendered directly: two-space
//! indent, self-closing children, no XML declaration, trailing newline.

use crate::services::fs_utils::file_utils::{is_junk_name, sorted_walk};
use crate::services::fs_utils::path_utils::to_forward_slash_relative;
use crate::types::errors::PackagingError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "Manifest.dsx";
pub const SUPPLEMENT_FILE_NAME: &str = "Supplement.dsx";
const SCHEMA_VERSION: &str = "0.1";

type Attributes<'a> = Vec<(&'a str, String)>;

/// Install paths (`Content/<rel>`) of every file under `content_dir`, in
/// sorted walk order.
pub fn manifest_entries(content_dir: &Path) -> io::Result<Vec<String>> {
    let walker = sorted_walk(content_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_junk_name(e.file_name())));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || is_junk_name(entry.file_name()) {
            continue;
        }
        if let Some(rel) = to_forward_slash_relative(entry.path(), content_dir) {
            entries.push(format!("Content/{rel}"));
        }
    }
    Ok(entries)
}

pub fn render_manifest(guid: &str, entries: &[String]) -> String {
    let mut children: Vec<(&str, Attributes)> = Vec::with_capacity(entries.len() + 1);
    children.push(("GlobalID", vec![("VALUE", guid.to_string())]));
    for entry in entries {
        children.push((
            "File",
            vec![
                ("TARGET", "Content".to_string()),
                ("ACTION", "Install".to_string()),
                ("VALUE", entry.clone()),
            ],
        ));
    }
    render_document("DAZInstallManifest", &children)
}

pub fn render_supplement(product_name: &str, tags: &str) -> String {
    render_document(
        "ProductSupplement",
        &[
            ("ProductName", vec![("VALUE", product_name.to_string())]),
            ("InstallTypes", vec![("VALUE", "Content".to_string())]),
            ("ProductTags", vec![("VALUE", tags.to_string())]),
        ],
    )
}

pub fn write_manifest(content_dir: &Path, guid: &str) -> Result<PathBuf, PackagingError> {
    log::info!("Attempting to generate Product Manifest.");
    let entries = manifest_entries(content_dir).map_err(PackagingError::Manifest)?;
    let path = output_dir(content_dir)
        .map_err(PackagingError::Manifest)?
        .join(MANIFEST_FILE_NAME);

    fs::write(&path, render_manifest(guid, &entries)).map_err(PackagingError::Manifest)?;
    log::info!(
        "Product Manifest successfully generated at: {} ({} file(s))",
        path.display(),
        entries.len()
    );
    Ok(path)
}

pub fn write_supplement(
    content_dir: &Path,
    product_name: &str,
    tags: &str,
) -> Result<PathBuf, PackagingError> {
    log::info!("Attempting to generate Product Supplement.");
    let path = output_dir(content_dir)
        .map_err(PackagingError::Supplement)?
        .join(SUPPLEMENT_FILE_NAME);

    fs::write(&path, render_supplement(product_name, tags)).map_err(PackagingError::Supplement)?;
    log::info!("Product Supplement successfully generated at: {}", path.display());
    Ok(path)
}

fn output_dir(content_dir: &Path) -> io::Result<&Path> {
    content_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            io::Error::other(format!(
                "content directory {} has no parent",
                content_dir.display()
            ))
        })
}

fn render_document(root: &str, children: &[(&str, Attributes)]) -> String {
    let mut out = format!("<{root} VERSION=\"{SCHEMA_VERSION}\">\n");
    for (name, attrs) in children {
        out.push_str("  <");
        out.push_str(name);
        for (key, value) in attrs {
            out.push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
        }
        out.push_str("/>\n");
    }
    out.push_str(&format!("</{root}>\n"));
    out
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            other => escaped.push(other),
        }
    }
    escaped
}
