use digipage_core::*;
use std::path::PathBuf;
use std::time::Duration;

fn valid_config(dir: &tempfile::TempDir) -> StationConfig {
    let scans = dir.path().join("scans");
    let books = dir.path().join("books");
    std::fs::create_dir_all(&scans).unwrap();
    std::fs::create_dir_all(&books).unwrap();

    StationConfig {
        scan_folder: scans,
        todays_books_folder: books,
        ..Default::default()
    }
}

#[test]
fn test_defaults() {
    let config = StationConfig::default();
    assert_eq!(config.scanner_mode, ScannerMode::DualScan);
    assert_eq!(config.backup_folder, PathBuf::from("scan_viewer_backups"));
    assert_eq!(
        config.probe_options(),
        ProbeOptions {
            timeout: Duration::from_secs(3),
            interval: Duration::from_millis(100),
        }
    );
}

#[test]
fn test_validation_requires_scan_folder() {
    let config = StationConfig::default();
    match config.validate() {
        Err(StationError::Config(msg)) => assert!(msg.contains("Scan folder")),
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_validation_rejects_missing_books_folder() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = valid_config(&dir);
    config.todays_books_folder = dir.path().join("nowhere");

    match config.validate() {
        Err(StationError::Config(msg)) => assert!(msg.contains("does not exist")),
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_validation_of_city_codes() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = valid_config(&dir);
    assert!(config.validate().is_ok());

    config
        .city_paths
        .insert("297".to_string(), PathBuf::from("/archive/297"));
    assert!(config.validate().is_ok());

    config
        .city_paths
        .insert("29a".to_string(), PathBuf::from("/archive/x"));
    assert!(config.validate().is_err());

    config.city_paths.remove("29a");
    config
        .city_paths
        .insert("2970".to_string(), PathBuf::from("/archive/x"));
    assert!(config.validate().is_err());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_config() {
    use tempfile::NamedTempFile;

    let mut config = StationConfig::default();
    config.scan_folder = PathBuf::from("/scans");
    config.todays_books_folder = PathBuf::from("/books");
    config.scanner_mode = ScannerMode::SingleSplit;
    config
        .city_paths
        .insert("123".to_string(), PathBuf::from("/archive/123"));
    config.stability_timeout_ms = 5000;

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    config.save(path).await.unwrap();
    let loaded = StationConfig::load(path).await.unwrap();
    assert_eq!(loaded, config);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_config_uses_defaults() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(
        temp_file.path(),
        r#"{"scan_folder": "/scans", "scanner_mode": "single_split", "theme": "dark"}"#,
    )
    .unwrap();

    let loaded = StationConfig::load(temp_file.path()).await.unwrap();
    assert_eq!(loaded.scan_folder, PathBuf::from("/scans"));
    assert_eq!(loaded.scanner_mode, ScannerMode::SingleSplit);
    assert_eq!(loaded.stability_poll_ms, 100);
    assert!(loaded.caching_enabled);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_invalid_json_is_config_error() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), b"{ not json").unwrap();

    match StationConfig::load(temp_file.path()).await {
        Err(StationError::Config(msg)) => assert!(msg.contains("Failed to parse")),
        _ => panic!("Expected Config error"),
    }
}
