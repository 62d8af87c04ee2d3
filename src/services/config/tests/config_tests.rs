use super::*;
use crate::test_utils::init_test_logger;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_initialized_with_defaults() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Config").join("settings.json");

    let service = ConfigService::new(path.clone());
    let settings = service.get_settings();

    assert!(path.exists(), "defaults should be written on first load");
    assert_eq!(service.path(), path.as_path());
    assert_eq!(settings.version, CONFIG_VERSION);
    assert_eq!(settings.content_folders.len(), 15);
    assert_eq!(settings.stores.len(), 15);
    assert_eq!(settings.tags.len(), 27);
    assert!(!settings.templates.copy_templates);
}

#[test]
fn test_lists_are_returned_sorted() {
    let dir = TempDir::new().unwrap();
    let service = ConfigService::new(dir.path().join("settings.json"));
    let settings = service.get_settings();

    let mut folders = settings.content_folders.clone();
    folders.sort();
    assert_eq!(settings.content_folders, folders);
    assert_eq!(settings.content_folders.first().map(String::as_str), Some("Environments"));
    assert_eq!(settings.tags.first().map(String::as_str), Some("Bryce"));
    assert_eq!(settings.stores.first().map(|s| s.name.as_str()), Some("3DExport"));
}

#[test]
fn test_invalid_json_is_replaced_with_defaults() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let service = ConfigService::new(path.clone());
    assert_eq!(service.get_settings().tags.len(), 27);

    let rewritten: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rewritten.version, CONFIG_VERSION);
}

#[test]
fn test_older_version_is_merged_with_defaults() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    let old = serde_json::json!({
        "version": 0,
        "content_folders": ["data", "My Custom Folder"],
        "stores": [
            { "name": "DAZ 3D", "prefix": "XX" },
            { "name": "My Shop", "prefix": "MS" }
        ],
        "tags": ["CustomTag"],
        "build_dir": "/tmp/build"
    });
    fs::write(&path, old.to_string()).unwrap();

    let settings = ConfigService::new(path.clone()).get_settings();

    assert_eq!(settings.version, CONFIG_VERSION);
    assert_eq!(settings.content_folders.len(), 16);
    assert!(settings.content_folders.contains(&"My Custom Folder".to_string()));
    assert_eq!(settings.tags.len(), 28);
    assert_eq!(settings.stores.len(), 16);
    assert_eq!(settings.store_prefix("DAZ 3D"), Some("IM"), "default entry wins");
    assert_eq!(settings.store_prefix("my shop"), Some("MS"));
    assert_eq!(settings.build_dir, PathBuf::from("/tmp/build"));

    let on_disk: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.version, CONFIG_VERSION);
}

#[test]
fn test_current_version_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    let mut config = AppConfig::default();
    config.tags = vec!["OnlyThis".to_string()];
    fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let settings = ConfigService::new(path).get_settings();
    assert_eq!(settings.tags, vec!["OnlyThis".to_string()]);
}

#[test]
fn test_save_settings_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    let service = ConfigService::new(path.clone());

    let mut first = service.get_settings();
    first.templates.copy_templates = true;
    service.save_settings(first).unwrap();

    let mut second = service.get_settings();
    second.compressor.prefer_external = false;
    service.save_settings(second).unwrap();

    let saved: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(saved.templates.copy_templates);
    assert!(!saved.compressor.prefer_external);

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path() != path)
        .collect();
    assert!(leftovers.is_empty(), "no temp files left behind");
}

#[test]
fn test_content_dir_is_below_build_dir() {
    let mut config = AppConfig::default();
    config.build_dir = PathBuf::from("/work/DIMBuild");
    assert_eq!(config.content_dir(), PathBuf::from("/work/DIMBuild/Content"));
}
