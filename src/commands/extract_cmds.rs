use super::AppState;
use crate::services::archive::{BuiltinDecompressor, ExtractionRequest};
use crate::services::config::AppConfig;
use crate::services::core::job_runner::JobHandle;
use crate::types::errors::AppResult;
use std::path::PathBuf;
use std::sync::Arc;

/// User input for one extraction; unset fields come from the config.
#[derive(Debug, Clone, Default)]
pub struct ExtractArgs {
    pub archive: PathBuf,
    pub content_dir: Option<PathBuf>,
    pub copy_templates: Option<bool>,
    pub template_dir: Option<PathBuf>,
}

pub fn build_extraction_request(config: &AppConfig, args: ExtractArgs) -> ExtractionRequest {
    let template_destination = args
        .template_dir
        .or_else(|| config.templates.destination.clone())
        .unwrap_or_else(|| config.build_dir.join("Templates"));

    ExtractionRequest {
        archive_path: args.archive,
        content_folders: config.content_folders.clone(),
        content_dir: args.content_dir.unwrap_or_else(|| config.content_dir()),
        copy_templates: args.copy_templates.unwrap_or(config.templates.copy_templates),
        template_destination,
    }
}

pub fn start_extraction(state: &AppState, args: ExtractArgs) -> AppResult<JobHandle> {
    let request = build_extraction_request(&state.config.get_settings(), args);
    log::info!(
        "Submitting extraction of {} into {}",
        request.archive_path.display(),
        request.content_dir.display()
    );
    state
        .runner
        .start_extraction(request, Arc::new(BuiltinDecompressor))
}
