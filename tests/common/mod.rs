#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// A throwaway workspace with its own settings file and build directory.
pub struct TestContext {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub build_dir: PathBuf,
}

impl TestContext {
    pub fn content_dir(&self) -> PathBuf {
        self.build_dir.join("Content")
    }
}

pub fn init_test_context() -> TestContext {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("Config").join("settings.json");
    let build_dir = dir.path().join("DIMBuild");
    fs::create_dir_all(build_dir.join("Content")).expect("Failed to create build dir");

    let settings = serde_json::json!({
        "version": dimcreator_lib::services::config::CONFIG_VERSION,
        "build_dir": build_dir,
        "templates": { "copy_templates": true, "destination": dir.path().join("Templates") },
        "compressor": { "prefer_external": false, "seven_zip_path": null },
        "content_folders": ["data", "Runtime", "People"],
        "stores": [{ "name": "DAZ 3D", "prefix": "IM" }],
        "tags": ["DAZStudio4_5"]
    });
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, settings.to_string()).unwrap();

    TestContext {
        dir,
        config_path,
        build_dir,
    }
}

/// Zip `files` into `dir/name`.
pub fn write_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (entry, content) in files {
        writer.start_file(entry.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    path
}

/// Same as [`write_zip`] but returns the archive bytes.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    fs::read(write_zip(dir.path(), "tmp.zip", files)).unwrap()
}

pub fn list_files(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}
