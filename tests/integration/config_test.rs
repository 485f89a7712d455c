use std::fs;
use tempfile::TempDir;
use yt_archiver::core::config::{Config, DownloaderSettings};
use yt_archiver::ArchiverError;

#[test]
fn test_load_missing_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::load(&temp_dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(ArchiverError::Config(_))));
}

#[test]
fn test_load_unparseable_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.yaml");
    fs::write(&path, "channels: [\n  - name: {").unwrap();

    assert!(matches!(Config::load(&path), Err(ArchiverError::Yaml(_))));
}

#[test]
fn test_save_then_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("archive.yaml");

    let mut config = Config::new(DownloaderSettings::new("/srv/videos"));
    config.sync.jobs = 3;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_default_sync_block_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("archive.yaml");

    Config::new(DownloaderSettings::new("/srv/videos"))
        .save(&path)
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("sync:"));
    assert!(!text.contains("yt_dlp_path"));
    assert!(text.contains("/srv/videos"));
}

#[test]
fn test_sync_settings_partial_block() {
    let config = Config::parse(
        "downloader:\n  output_path: /x\nsync:\n  jobs: 2\n  protect_on_empty_remote: true\n",
    )
    .unwrap();

    assert_eq!(config.sync.jobs, 2);
    assert!(config.sync.protect_on_empty_remote);
    assert_eq!(config.sync.lookup_timeout_secs, 120);
}

#[test]
fn test_zero_jobs_rejected() {
    let result = Config::parse("downloader:\n  output_path: /x\nsync:\n  jobs: 0\n");
    assert!(result.is_err());
}
