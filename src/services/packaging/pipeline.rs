use super::cover::process_cover_image;
use super::metadata::{write_manifest, write_supplement};
use super::spec::PackageSpec;
use super::support::clean_support_directory;
use crate::services::compression::Compressor;
use crate::services::core::cancel::CancelToken;
use crate::types::errors::PackagingError;
use std::fs;
use std::path::PathBuf;

/// The five packaging stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingStage {
    CleanSupport,
    ProcessImage,
    Manifest,
    Supplement,
    Compress,
}

impl PackagingStage {
    /// Progress range owned by the stage.
    pub fn band(&self) -> (u8, u8) {
        match self {
            Self::CleanSupport => (0, 5),
            Self::ProcessImage => (5, 10),
            Self::Manifest => (10, 15),
            Self::Supplement => (15, 20),
            Self::Compress => (20, 100),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CleanSupport => "Cleaning",
            Self::ProcessImage => "Processing Image",
            Self::Manifest => "Creating Manifest",
            Self::Supplement => "Creating Supplement",
            Self::Compress => "Packaging",
        }
    }

    /// Map a 0-100 stage-local value into the stage's band.
    pub fn scale(&self, local: u8) -> u8 {
        let (start, end) = self.band();
        let local = u32::from(local.min(100));
        (u32::from(start) + (u32::from(end - start) * local) / 100) as u8
    }
}

/// Forwards progress while keeping it monotonic and within 0-100.
struct ProgressTracker<'a> {
    last: u8,
    sink: &'a mut dyn FnMut(u8, &str),
}

impl<'a> ProgressTracker<'a> {
    fn new(sink: &'a mut dyn FnMut(u8, &str)) -> Self {
        Self { last: 0, sink }
    }

    fn report(&mut self, percent: u8, stage: PackagingStage) {
        let percent = percent.clamp(self.last, 100);
        self.last = percent;
        (self.sink)(percent, stage.label());
    }
}

/// Run every stage of a packaging job and return the path of the archive.
///
/// Stages run strictly in order; the first failure ends the run. `cancel` is
/// honoured between stages and between compressed files.
pub fn run_packaging(
    spec: &PackageSpec,
    compressor: &dyn Compressor,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(u8, &str),
) -> Result<PathBuf, PackagingError> {
    let spec = &spec.with_absolute_paths()?;
    spec.validate()?;
    let mut progress = ProgressTracker::new(on_progress);

    run_stage(PackagingStage::CleanSupport, cancel, &mut progress, || {
        if spec.clean_support {
            clean_support_directory(&spec.content_dir)?;
        }
        Ok(())
    })?;

    run_stage(PackagingStage::ProcessImage, cancel, &mut progress, || {
        match &spec.image_path {
            Some(image_path) => {
                process_cover_image(
                    &spec.content_dir,
                    &spec.store,
                    &spec.sku,
                    &spec.product_name,
                    image_path,
                )?;
            }
            None => log::info!("No image path provided, skipping image processing."),
        }
        Ok(())
    })?;

    run_stage(PackagingStage::Manifest, cancel, &mut progress, || {
        write_manifest(&spec.content_dir, &spec.guid).map(|_| ())
    })?;

    run_stage(PackagingStage::Supplement, cancel, &mut progress, || {
        write_supplement(&spec.content_dir, &spec.product_name, &spec.tags).map(|_| ())
    })?;

    checkpoint(cancel)?;
    progress.report(PackagingStage::Compress.band().0, PackagingStage::Compress);
    let output = compress(spec, compressor, cancel, &mut progress)?;
    progress.report(100, PackagingStage::Compress);
    Ok(output)
}

fn run_stage<F>(
    stage: PackagingStage,
    cancel: &CancelToken,
    progress: &mut ProgressTracker<'_>,
    work: F,
) -> Result<(), PackagingError>
where
    F: FnOnce() -> Result<(), PackagingError>,
{
    checkpoint(cancel)?;
    progress.report(stage.band().0, stage);
    work()?;
    progress.report(stage.band().1, stage);
    Ok(())
}

fn checkpoint(cancel: &CancelToken) -> Result<(), PackagingError> {
    if cancel.is_cancelled() {
        log::info!("Packaging cancelled");
        Err(PackagingError::Cancelled)
    } else {
        Ok(())
    }
}

fn compress(
    spec: &PackageSpec,
    compressor: &dyn Compressor,
    cancel: &CancelToken,
    progress: &mut ProgressTracker<'_>,
) -> Result<PathBuf, PackagingError> {
    let source_root = spec.content_dir.parent().ok_or_else(|| {
        PackagingError::InvalidSpec(format!(
            "content directory {} has no parent",
            spec.content_dir.display()
        ))
    })?;

    fs::create_dir_all(&spec.destination).map_err(|e| PackagingError::Compression(e.into()))?;
    let output = spec.output_path();
    log::info!(
        "Attempting to generate the DIM file: {} ({})",
        output.display(),
        compressor.name()
    );

    let mut on_percent =
        |local: u8| progress.report(PackagingStage::Compress.scale(local), PackagingStage::Compress);
    compressor.compress(source_root, &output, &mut on_percent, cancel)?;

    log::info!("DIM file created at: {}", output.display());
    Ok(output)
}
