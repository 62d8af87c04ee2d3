use super::AppState;
use crate::services::config::AppConfig;
use crate::services::core::operation_lock::JobKind;
use crate::services::workspace::{reset_build_dir, validate_content_dir};
use crate::types::errors::AppResult;
use std::path::PathBuf;

/// Clear the configured build directory. Refused while a job is running.
pub fn reset_build(state: &AppState) -> AppResult<usize> {
    let guard = state.runner.reserve(JobKind::Reset)?;
    let build_dir = state.config.get_settings().build_dir;
    log::info!("{} of {} holding the job slot", guard.kind(), build_dir.display());
    Ok(reset_build_dir(&build_dir)?)
}

pub fn validate_content(state: &AppState, content_dir: Option<PathBuf>) -> (PathBuf, bool) {
    let config = state.config.get_settings();
    let content_dir = content_dir.unwrap_or_else(|| config.content_dir());
    let valid = validate_content_dir(&content_dir, &config.content_folders);
    (content_dir, valid)
}

pub fn get_config(state: &AppState) -> AppConfig {
    state.config.get_settings()
}
