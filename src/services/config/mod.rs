//! Persisted application settings.
//!
//! `ConfigService` is the only place that reads ambient settings; pipelines
//! receive plain values derived from [`AppConfig`].

pub mod models;

pub use models::*;

use crate::types::errors::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct ConfigService {
    path: PathBuf,
    settings: Mutex<AppConfig>,
}

impl ConfigService {
    /// Load (or initialize) the config stored at `path`.
    ///
    /// Never fails: an unreadable file falls back to defaults, which are
    /// written back when possible.
    pub fn new(path: PathBuf) -> Self {
        let settings = Self::load(&path);
        Self {
            path,
            settings: Mutex::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings with every list sorted.
    pub fn get_settings(&self) -> AppConfig {
        let mut settings = self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        sort_lists(&mut settings);
        settings
    }

    pub fn save_settings(&self, new_settings: AppConfig) -> Result<(), ConfigError> {
        write_atomic(&self.path, &new_settings)?;

        *self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_settings;
        Ok(())
    }

    fn load(path: &Path) -> AppConfig {
        let (config, dirty) = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => upgrade(value),
                Err(e) => {
                    log::warn!(
                        "JSON decode error in {}: {e}; rewriting with defaults.",
                        path.display()
                    );
                    (AppConfig::default(), true)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Config not found; initializing defaults: {}", path.display());
                (AppConfig::default(), true)
            }
            Err(e) => {
                log::error!("Failed reading {}: {e}; using defaults.", path.display());
                (AppConfig::default(), true)
            }
        };

        if dirty {
            match write_atomic(path, &config) {
                Ok(()) => log::info!(
                    "Wrote configuration {} (version={})",
                    path.display(),
                    config.version
                ),
                Err(e) => log::error!("Failed writing {}: {e}", path.display()),
            }
        }

        log::info!(
            "Configuration loaded: stores={}, tags={}, content folders={}",
            config.stores.len(),
            config.tags.len(),
            config.content_folders.len()
        );
        config
    }
}

/// Parse a stored document and merge in the current defaults when its
/// version is older. Returns the config and whether it must be rewritten.
fn upgrade(value: serde_json::Value) -> (AppConfig, bool) {
    let old_version = value
        .get("version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let mut config: AppConfig = match serde_json::from_value(value) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Invalid config schema ({e}); resetting to defaults.");
            return (AppConfig::default(), true);
        }
    };

    if old_version >= CONFIG_VERSION {
        log::debug!("Config already at version {old_version}");
        return (config, false);
    }

    log::info!("Upgrading config from v{old_version} to v{CONFIG_VERSION}");
    let defaults = AppConfig::default();
    config.content_folders = union(&config.content_folders, &defaults.content_folders);
    config.tags = union(&config.tags, &defaults.tags);

    let mut stores: BTreeMap<String, StoreConfig> = config
        .stores
        .into_iter()
        .map(|s| (s.name.clone(), s))
        .collect();
    for store in defaults.stores {
        stores.insert(store.name.clone(), store);
    }
    config.stores = stores.into_values().collect();
    config.version = CONFIG_VERSION;

    (config, true)
}

fn union(current: &[String], defaults: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = current.iter().chain(defaults).cloned().collect();
    merged.sort();
    merged.dedup();
    merged
}

fn sort_lists(config: &mut AppConfig) {
    config.content_folders.sort();
    config.tags.sort();
    config.stores.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(config)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
