//! Comprehensive unit tests for config.rs module

use std::fs;
use std::path::PathBuf;

use ios_backup_extract::config::AppConfig;
use ios_backup_extract::filters::FilterConfig;
use ios_backup_extract::OutputFormat;

#[test]
fn test_default_backup_config() {
    let config = AppConfig::default();

    assert_eq!(config.backup.root, ".");
    assert_eq!(config.backup.manifest_file, "Manifest.db");
    assert_eq!(config.backup.contacts_file_id, "31bb7ba8914766d4ba40d6dfb6113c8b614be442");
    assert_eq!(config.backup.messages_file_id, "3d0d7e5fb2ce288813306e4d4636395e047a3d28");
}

#[test]
fn test_default_output_config() {
    let config = AppConfig::default();

    assert_eq!(config.output.directory, "files");
    assert_eq!(config.output.transcript_format, OutputFormat::Csv);
    assert_eq!(config.contacts_export_path(), PathBuf::from("files/Contacts.csv"));
}

#[test]
fn test_default_extraction_config() {
    let config = AppConfig::default();

    assert!(config.extraction.continue_on_domain_error);
    assert_eq!(config.extraction.progress_interval, 100);
    assert_eq!(config.extraction.filters.len(), 2);
    assert_eq!(config.extraction.filters[0].destination, "camera");
    assert_eq!(config.extraction.filters[1].destination, "sms");
}

#[test]
fn test_default_correlation_config() {
    let config = AppConfig::default();

    assert_eq!(config.correlation.batch_size, 500);
    assert!(!config.correlation.local_time);
    assert_eq!(config.correlation.self_label, "Me");
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_config_validation_success() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_config_validation_invalid_file_id() {
    let mut config = AppConfig::default();
    config.backup.messages_file_id = "z".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_empty_manifest() {
    let mut config = AppConfig::default();
    config.backup.manifest_file = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_batch_size_bounds() {
    let mut config = AppConfig::default();

    config.correlation.batch_size = 999;
    assert!(config.validate().is_ok());

    config.correlation.batch_size = 1000;
    assert!(config.validate().is_err());

    config.correlation.batch_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_zero_progress_interval() {
    let mut config = AppConfig::default();
    config.extraction.progress_interval = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_no_filters() {
    let mut config = AppConfig::default();
    config.extraction.filters.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_bad_filter() {
    let mut config = AppConfig::default();
    config.extraction.filters.push(FilterConfig {
        domain: "HomeDomain".to_string(),
        condition: "Library%".to_string(),
        destination: "../outside".to_string(),
        extensions: vec!["plist".to_string()],
    });
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_shared_destination() {
    let mut config = AppConfig::default();
    config.extraction.filters.push(FilterConfig {
        domain: "HomeDomain".to_string(),
        condition: "Media/DCIM%".to_string(),
        destination: "SMS".to_string(),
        extensions: vec!["jpg".to_string()],
    });
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_valid_log_levels() {
    let mut config = AppConfig::default();
    for level in ["trace", "debug", "info", "warn", "error"] {
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "level {level} should be valid");
    }
}

#[test]
fn test_config_validation_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_empty_self_label() {
    let mut config = AppConfig::default();
    config.correlation.self_label = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_explicit_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extract.toml");
    fs::write(
        &path,
        r#"
[backup]
root = "/backups/phone"

[output]
directory = "out"
transcript_format = "json"

[correlation]
batch_size = 250
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.backup.root, "/backups/phone");
    assert_eq!(config.backup.manifest_file, "Manifest.db");
    assert_eq!(config.output.directory, "out");
    assert_eq!(config.output.transcript_format, OutputFormat::Json);
    assert_eq!(config.correlation.batch_size, 250);
    assert_eq!(config.extraction.filters.len(), 2);
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extract.toml");
    fs::write(&path, "[correlation]\nbatch_size = 0\n").unwrap();

    assert!(AppConfig::load(Some(&path)).is_err());
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
}

#[test]
fn test_load_from_env() {
    std::env::set_var("IOS_BACKUP__CORRELATION__SELF_LABEL", "Owner");
    let config = AppConfig::load(None).unwrap();
    std::env::remove_var("IOS_BACKUP__CORRELATION__SELF_LABEL");

    assert_eq!(config.correlation.self_label, "Owner");
}

#[test]
fn test_get_log_level_from_env() {
    std::env::set_var("RUST_LOG", "debug");
    let config = AppConfig::default();
    assert_eq!(config.get_log_level(), "debug");
    std::env::remove_var("RUST_LOG");
}

#[test]
fn test_config_clone() {
    let config = AppConfig::default();
    assert_eq!(config.clone(), config);
}
