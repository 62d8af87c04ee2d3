//! Command layer: turns user input plus stored settings into pipeline jobs.
//! The only place that combines `ConfigService` with the pipelines.

pub mod extract_cmds;
pub mod package_cmds;
pub mod workspace_cmds;

use crate::services::config::ConfigService;
use crate::services::core::job_runner::JobRunner;
use std::path::PathBuf;

/// Shared state behind every command.
pub struct AppState {
    pub config: ConfigService,
    pub runner: JobRunner,
}

impl AppState {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config: ConfigService::new(config_path),
            runner: JobRunner::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/extract_cmds_tests.rs"]
mod extract_cmds_tests;

#[cfg(test)]
#[path = "tests/package_cmds_tests.rs"]
mod package_cmds_tests;
