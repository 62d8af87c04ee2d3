use super::decompress::Decompressor;
use super::safe_copy::{effective_root, execute_copy, plan_copy};
use super::scanner::{scan_directory, FolderMatcher};
use super::types::{ExtractionReport, ExtractionRequest, ExtractionStage};
use crate::services::core::cancel::CancelToken;
use crate::services::core::scratch::ScratchSpace;
use crate::services::fs_utils::file_utils::copy_file_preserving;
use crate::types::errors::ExtractionError;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Import the recognized content of an archive into the content directory.
///
/// Steps:
/// 1. Decompress the archive into a scratch directory
/// 2. Scan for content roots and embedded archives
/// 3. Decide between: ambiguous (several content archives), one nested
///    content archive, direct content, or nothing recognized
/// 4. Siphon template archives off to the template destination
/// 5. Safe-copy the common content root into `content_dir`
///
/// Scratch directories are removed on every exit path.
pub fn run_extraction(
    request: &ExtractionRequest,
    decompressor: &dyn Decompressor,
    scratch: &ScratchSpace,
    cancel: &CancelToken,
    on_stage: &mut dyn FnMut(ExtractionStage),
) -> Result<ExtractionReport, ExtractionError> {
    log::info!("Starting extraction of {}", request.archive_path.display());
    on_stage(ExtractionStage::Decompressing);

    let temp_dir = scratch.create_dir()?;
    decompressor.decompress(&request.archive_path, temp_dir.path())?;
    log::info!(
        "Archive extracted to temporary directory: [{}]",
        temp_dir.path().display()
    );
    checkpoint(cancel)?;

    on_stage(ExtractionStage::Scanning);
    let matcher = FolderMatcher::new(&request.content_folders);
    let scan = scan_directory(temp_dir.path(), &matcher);
    let (templates, content_archives) = scan.partition_archives();
    checkpoint(cancel)?;

    let mut report = ExtractionReport::default();

    if content_archives.len() > 1 {
        log::warn!(
            "Found {} content archives in {}, refusing to guess",
            content_archives.len(),
            request.archive_path.display()
        );
        return Err(ExtractionError::MultipleArchives {
            count: content_archives.len(),
        });
    }

    if let Some(embedded) = content_archives.first() {
        report.templates_copied = siphon_templates(&templates, request)?;

        on_stage(ExtractionStage::NestedArchive);
        let nested_dir = scratch.create_dir()?;
        decompressor.decompress(embedded, nested_dir.path())?;
        log::info!(
            "Embedded archive [{}] extracted to [{}]",
            embedded.display(),
            nested_dir.path().display()
        );
        checkpoint(cancel)?;

        let nested_scan = scan_directory(nested_dir.path(), &matcher);
        if nested_scan.content_roots.is_empty() {
            return Err(ExtractionError::NoRecognizedFoldersInEmbedded);
        }

        on_stage(ExtractionStage::Copying);
        copy_relevant_content(
            nested_dir.path(),
            &nested_scan.content_roots,
            &request.content_dir,
            cancel,
            &mut report,
        )?;
        log::info!("Cleaning up temporary files from embedded archive extraction.");
    } else if !scan.content_roots.is_empty() {
        report.templates_copied = siphon_templates(&templates, request)?;

        on_stage(ExtractionStage::Copying);
        copy_relevant_content(
            temp_dir.path(),
            &scan.content_roots,
            &request.content_dir,
            cancel,
            &mut report,
        )?;
    } else {
        return Err(ExtractionError::NoRecognizedFolders);
    }

    on_stage(ExtractionStage::Done);
    log::info!(
        "Extraction of {} completed: {} file(s) copied",
        request.archive_path.display(),
        report.files_copied
    );
    Ok(report)
}

fn checkpoint(cancel: &CancelToken) -> Result<(), ExtractionError> {
    if cancel.is_cancelled() {
        Err(ExtractionError::Cancelled)
    } else {
        Ok(())
    }
}

fn copy_relevant_content(
    scan_root: &Path,
    content_roots: &BTreeSet<PathBuf>,
    content_dir: &Path,
    cancel: &CancelToken,
    report: &mut ExtractionReport,
) -> Result<(), ExtractionError> {
    let base = effective_root(scan_root, content_roots);
    log::info!("Using base path [{}]", base.display());

    let plan = plan_copy(&base, content_dir)?;
    let stats = execute_copy(&plan, content_dir, cancel)?;

    report.files_copied += stats.files_copied;
    report.failed_files.extend(stats.failed_files);
    Ok(())
}

/// Move template archives out of the scratch tree: copy them to the template
/// destination when enabled, then delete them either way.
/// Returns the file names that were copied.
pub fn siphon_templates(
    templates: &[PathBuf],
    request: &ExtractionRequest,
) -> Result<Vec<String>, ExtractionError> {
    let mut copied = Vec::new();

    for template in templates {
        let file_name = match template.file_name() {
            Some(n) => n.to_owned(),
            None => continue,
        };

        if request.copy_templates {
            fs::create_dir_all(&request.template_destination)?;
            let target = request.template_destination.join(&file_name);
            copy_file_preserving(template, &target)?;
            copied.push(file_name.to_string_lossy().to_string());
            log::info!(
                "Copied template archive [{}] to [{}]",
                template.display(),
                request.template_destination.display()
            );
        } else {
            log::info!("Not copying template file as per user setting.");
        }

        match fs::remove_file(template) {
            Ok(()) => log::info!(
                "Removed template archive from temporary directory: [{}]",
                template.display()
            ),
            Err(e) => log::error!(
                "Failed to remove template archive from temporary directory: [{e}]"
            ),
        }
    }

    Ok(copied)
}
