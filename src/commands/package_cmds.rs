use super::AppState;
use crate::services::compression::{select_compressor, BuiltinCompressor, Compressor};
use crate::services::config::AppConfig;
use crate::services::core::job_runner::JobHandle;
use crate::services::packaging::PackageSpec;
use crate::services::workspace::validate_content_dir;
use crate::types::errors::{AppResult, PackagingError};
use std::path::PathBuf;

/// User input for one packaging run.
#[derive(Debug, Clone, Default)]
pub struct PackageArgs {
    pub store: String,
    pub product_name: String,
    /// Looked up from the store list when absent.
    pub prefix: Option<String>,
    pub sku: String,
    pub part: u8,
    pub tags: Vec<String>,
    pub image: Option<PathBuf>,
    pub clean_support: bool,
    /// Generated when absent or blank.
    pub guid: Option<String>,
    pub destination: Option<PathBuf>,
    pub content_dir: Option<PathBuf>,
    pub force_builtin: bool,
    /// Package even when no recognized folder is present.
    pub force: bool,
}

pub fn build_package_spec(config: &AppConfig, args: PackageArgs) -> AppResult<PackageSpec> {
    for (field, value) in [
        ("store", &args.store),
        ("product name", &args.product_name),
        ("SKU", &args.sku),
    ] {
        if value.trim().is_empty() {
            return Err(PackagingError::InvalidSpec(format!("missing required field: {field}")).into());
        }
    }

    let content_dir = args.content_dir.unwrap_or_else(|| config.content_dir());
    if !validate_content_dir(&content_dir, &config.content_folders) {
        if !args.force {
            return Err(PackagingError::InvalidSpec(format!(
                "no recognized content folders found in {}",
                content_dir.display()
            ))
            .into());
        }
        log::warn!(
            "No recognized content folders in {}; continuing anyway",
            content_dir.display()
        );
    }

    let prefix = args
        .prefix
        .filter(|p| !p.trim().is_empty())
        .or_else(|| config.store_prefix(&args.store).map(str::to_string))
        .unwrap_or_default();

    let guid = match args.guid.filter(|g| !g.trim().is_empty()) {
        Some(guid) => guid,
        None => {
            let generated = uuid::Uuid::new_v4().to_string();
            log::info!("Generated package GUID {generated}");
            generated
        }
    };

    let destination = match args.destination {
        Some(dest) => dest,
        None => std::env::current_dir()?,
    };

    let spec = PackageSpec {
        content_dir,
        store: args.store,
        product_name: args.product_name,
        prefix,
        sku: args.sku,
        part: args.part,
        tags: args.tags.join(","),
        image_path: args.image,
        clean_support: args.clean_support,
        guid,
        destination,
    }
    .with_absolute_paths()?;
    spec.validate()?;
    Ok(spec)
}

pub fn start_packaging(state: &AppState, args: PackageArgs) -> AppResult<JobHandle> {
    let config = state.config.get_settings();
    let compressor: Box<dyn Compressor> = if args.force_builtin {
        Box::new(BuiltinCompressor::default())
    } else {
        select_compressor(&config.compressor)
    };
    let spec = build_package_spec(&config, args)?;

    log::info!(
        "Submitting packaging of {} as {} ({})",
        spec.content_dir.display(),
        spec.zip_file_name(),
        compressor.name()
    );
    state.runner.start_packaging(spec, compressor)
}
