/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::fs;
use docs_i18n::app_config::{ChangeDetectionMode, Config, LogLevel, Mapping};
use docs_i18n::errors::AppError;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ru");
    assert_eq!(config.mappings, vec![
        Mapping::new("README.md", ".docs-i18n/ru/README.md"),
        Mapping::new("docs", ".docs-i18n/ru/docs"),
    ]);
    assert_eq!(config.models.first().map(String::as_str), Some("gemini-3-flash-preview"));
    assert_eq!(config.models.len(), 7);
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.base_delay_ms, 2000);
    assert_eq!(config.retry.min_response_chars, 10);
    assert_eq!(config.change_detection, ChangeDetectionMode::Hash);
    assert!(config.header.is_empty());
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.provider.api_key = "key".to_string();
    assert!(config.validate(true).is_ok());

    // Invalid source language
    config.source_language = "xyz".to_string();
    assert!(config.validate(true).is_err());
    config.source_language = "en".to_string();

    // Same source and target
    config.target_language = "eng".to_string();
    assert!(config.validate(true).is_err());
    config.target_language = "ru".to_string();

    // Empty model list
    config.models = vec!["  ".to_string()];
    assert!(config.validate(true).is_err());
    config.models = vec!["gemini-2.5-flash".to_string()];

    // No mappings
    let mappings = std::mem::take(&mut config.mappings);
    assert!(config.validate(true).is_err());
    config.mappings = mappings;

    // Excessive retries
    config.retry.max_retries = 11;
    assert!(config.validate(true).is_err());
    config.retry.max_retries = 3;

    // Bad endpoint
    config.provider.endpoint = "not a url".to_string();
    assert!(config.validate(true).is_err());
}

/// Test that the API key is only required when asked for
#[test]
fn test_config_validation_withMissingApiKey_shouldFailOnlyWhenRequired() {
    let config = Config::default();
    assert!(config.validate(false).is_ok());

    let error = config.validate(true).unwrap_err();
    assert!(error.to_string().contains("GEMINI_API_KEY"));
}

/// Test that a partial config file falls back to defaults
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "docs-i18n.json",
        r#"{ "models": ["gemini-2.5-pro"], "change_detection": "mtime", "retry": { "max_retries": 1 } }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.models, vec!["gemini-2.5-pro".to_string()]);
    assert_eq!(config.change_detection, ChangeDetectionMode::Mtime);
    assert_eq!(config.retry.max_retries, 1);
    assert_eq!(config.retry.base_delay_ms, 2000);
    assert_eq!(config.target_language, "ru");
    assert!(!config.prompt.glossary.is_empty());

    Ok(())
}

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaultConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("docs-i18n.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    let written: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(written.models, config.models);
    assert_eq!(written.mappings, config.mappings);

    Ok(())
}

/// Test that a malformed config file is reported
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "docs-i18n.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());

    Ok(())
}

/// Test parsing of the change detection mode
#[test]
fn test_change_detection_mode_fromStr_shouldParseKnownModes() {
    assert_eq!("hash".parse::<ChangeDetectionMode>().unwrap(), ChangeDetectionMode::Hash);
    assert_eq!("MTIME".parse::<ChangeDetectionMode>().unwrap(), ChangeDetectionMode::Mtime);
    assert!("size".parse::<ChangeDetectionMode>().is_err());
    assert_eq!(ChangeDetectionMode::Mtime.to_string(), "mtime");
}

/// Test that blank model names are dropped
#[test]
fn test_model_priorities_withBlankEntries_shouldTrimAndSkip() {
    let mut config = Config::default();
    config.models = vec![" gemini-2.5-flash ".to_string(), "".to_string(), "gemini-2.0-flash".to_string()];

    assert_eq!(config.model_priorities(), vec!["gemini-2.5-flash", "gemini-2.0-flash"]);
}

/// Test that validation failures are reported as configuration errors
#[test]
fn test_validate_withSameLanguages_shouldReturnConfigError() {
    let mut config = Config::default();
    config.provider.api_key = "key".to_string();
    config.target_language = "eng".to_string();

    let error = config.validate(true).unwrap_err();

    assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::Config(_))));
    assert!(error.to_string().starts_with("Configuration error:"));
}
