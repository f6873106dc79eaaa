//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Configuration loading and saving
//! - Default configuration generation
//! - Partial files falling back to defaults per key
//! - Configuration validation

use camino::Utf8PathBuf;
use file_converter::ConfigManager;
use file_converter::config::USER_CONFIG_FILE;
use file_converter::models::{ConfigError, MediaKind, UserConfig};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
    assert_eq!(manager.user_config_path(), config_path.join(USER_CONFIG_FILE));
}

#[test]
fn test_config_dir_created_on_demand() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("Converter Data");

    ConfigManager::new(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_missing_file_yields_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let config = manager.load_user_config().unwrap();
    let settings = &config.settings;

    assert_eq!(settings.ffmpeg_path, "ffmpeg");
    assert!(settings.overwrite_output);
    assert_eq!(settings.poll_interval(), Duration::from_millis(25));
    assert_eq!(settings.shutdown_timeout(), Duration::from_secs(5));
    assert_eq!(settings.default_format, "MP4");
    assert_eq!(settings.supported_formats.len(), 11);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_ensure_writes_defaults_once() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let created = manager.ensure_user_config().unwrap();
    assert!(manager.user_config_path().exists());

    // A later edit survives the next ensure
    let mut edited = created.clone();
    edited.settings.ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg".to_string();
    manager.save_user_config(&edited).unwrap();

    let loaded = manager.ensure_user_config().unwrap();
    assert_eq!(loaded, edited);
}

#[test]
fn test_save_and_reload() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut config = UserConfig::default();
    config.settings.debug_mode = true;
    config.settings.default_format = "WEBM".to_string();
    config.settings.ui_refresh_ms = 100;

    manager.save_user_config(&config).unwrap();
    let loaded = manager.load_user_config().unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_uses_defaults_for_missing_keys() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let yaml = r#"
Converter_Settings:
  FFmpeg Path: C:/Tools/ffmpeg.exe
  Supported Formats:
    MP4: video
    FLAC: audio
  Default Format: FLAC
"#;
    fs::write(manager.user_config_path(), yaml).unwrap();

    let settings = manager.load_user_config().unwrap().settings;

    assert_eq!(settings.ffmpeg_path, "C:/Tools/ffmpeg.exe");
    assert_eq!(settings.poll_interval_ms, 25);
    let names: Vec<&str> = settings.supported_formats.names().collect();
    assert_eq!(names, vec!["MP4", "FLAC"]);
    assert_eq!(settings.supported_formats.kind("flac"), Some(MediaKind::Audio));
    assert!(settings.validate().is_ok());
}

#[test]
fn test_invalid_values_rejected_by_validate() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let yaml = r#"
Converter_Settings:
  Default Format: XYZ
"#;
    fs::write(manager.user_config_path(), yaml).unwrap();

    let settings = manager.load_user_config().unwrap().settings;
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::UnknownDefaultFormat(_))
    ));
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.user_config_path(), "Converter_Settings: [unclosed").unwrap();

    let err = manager.load_user_config().unwrap_err();
    assert!(err.to_string().contains("Failed to parse user config"));
}
