use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;

/// Application configuration module
/// This module handles loading, validating and saving the translator settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Source paths and where their translations go
    #[serde(default = "default_mappings")]
    pub mappings: Vec<Mapping>,

    /// Model names in priority order; the first one is tried first
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Hosted API settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Retry and pacing settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// How stale translations are detected
    #[serde(default)]
    pub change_detection: ChangeDetectionMode,

    /// Prompt settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Text prepended to every translated file
    #[serde(default)]
    pub header: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One configured source path and its mirrored output location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Mapping {
    /// Markdown file or directory, relative to the project root
    pub source: String,
    /// Output file or directory, relative to the project root
    pub target: String,
}

impl Mapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Hosted generative-language API settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: API key, usually supplied through GEMINI_API_KEY instead
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sampling temperature, omitted from requests when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

/// Retry, backoff and pacing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt on rate-limit errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Pause between consecutive file translations in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Replies shorter than this (after trimming) are rejected
    #[serde(default = "default_min_response_chars")]
    pub min_response_chars: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            request_delay_ms: 0,
            min_response_chars: default_min_response_chars(),
        }
    }
}

/// Strategy for deciding whether a translation is out of date
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetectionMode {
    /// Compare a SHA-256 of the source with the sidecar `.hash` file
    #[default]
    Hash,
    /// Compare modification times of source and translation
    Mtime,
}

impl std::fmt::Display for ChangeDetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash => write!(f, "hash"),
            Self::Mtime => write!(f, "mtime"),
        }
    }
}

impl std::str::FromStr for ChangeDetectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "mtime" => Ok(Self::Mtime),
            _ => Err(anyhow!("Invalid change detection mode: {}", s)),
        }
    }
}

/// Project context fed into the translation prompt
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptConfig {
    /// Project name as it appears in the prompt
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// One-line description of the project
    #[serde(default = "default_project_description")]
    pub project_description: String,

    /// Terms that must stay untranslated
    #[serde(default = "default_glossary")]
    pub glossary: Vec<String>,

    /// Tone instruction
    #[serde(default = "default_tone")]
    pub tone: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_description: default_project_description(),
            glossary: default_glossary(),
            tone: default_tone(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_mappings() -> Vec<Mapping> {
    vec![
        Mapping::new("README.md", ".docs-i18n/ru/README.md"),
        Mapping::new("docs", ".docs-i18n/ru/docs"),
    ]
}

pub fn default_models() -> Vec<String> {
    [
        "gemini-3-flash-preview",
        "gemini-2.5-flash",
        "gemini-2.5-flash-lite",
        "gemini-2.5-pro",
        "gemini-2.0-flash",
        "gemini-2.0-flash-lite",
        "gemini-2.0-pro",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000 // doubled on each retry: 2s, 4s, 8s
}

fn default_min_response_chars() -> usize {
    10
}

fn default_project_name() -> String {
    "RuleDesk".to_string()
}

fn default_project_description() -> String {
    "A modern desktop client for Rule34 imageboard content built with Electron, React, TypeScript, and Drizzle ORM.".to_string()
}

fn default_glossary() -> Vec<String> {
    [
        "Rule34, Gelbooru, Booru",
        "IPC (Inter-Process Communication)",
        "Main Process, Renderer Process",
        "Drizzle ORM, SQLite",
        "Store, State",
        "Props, Components",
        "Tag, Blacklist",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

fn default_tone() -> String {
    "Professional, concise, suitable for GitHub technical docs (Хабр style).".to_string()
}

/// Upper bound on `retry.max_retries`; 2^10 times the base delay is already hours
const MAX_RETRIES_LIMIT: u32 = 10;

impl Config {
    /// Load the configuration from `path`, writing a default one there first
    /// when the file does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            log::warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values.
    ///
    /// `require_api_key` is false for runs that never reach the network.
    pub fn validate(&self, require_api_key: bool) -> Result<()> {
        self.check(require_api_key).map_err(anyhow::Error::from)
    }

    fn check(&self, require_api_key: bool) -> Result<(), AppError> {
        for code in [&self.source_language, &self.target_language] {
            crate::language_utils::get_language_name(code)
                .map_err(|e| AppError::Config(e.to_string()))?;
        }
        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            return Err(AppError::Config(format!(
                "Source and target language are the same: {} / {}",
                self.source_language, self.target_language
            )));
        }

        if self.mappings.is_empty() {
            return Err(AppError::Config("At least one source mapping is required".to_string()));
        }
        if let Some(mapping) = self.mappings.iter()
            .find(|m| m.source.trim().is_empty() || m.target.trim().is_empty()) {
            return Err(AppError::Config(format!("Mapping has an empty path: {:?}", mapping)));
        }

        if self.models.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::Config("Model priority list is empty".to_string()));
        }

        if self.retry.max_retries > MAX_RETRIES_LIMIT {
            return Err(AppError::Config(format!(
                "retry.max_retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT, self.retry.max_retries
            )));
        }

        url::Url::parse(&self.provider.endpoint).map_err(|e| AppError::Config(format!(
            "Invalid provider endpoint {}: {}", self.provider.endpoint, e
        )))?;

        if require_api_key && self.provider.api_key.trim().is_empty() {
            return Err(AppError::Config("GEMINI_API_KEY is missing".to_string()));
        }

        Ok(())
    }

    /// Model names with blanks removed, in priority order
    pub fn model_priorities(&self) -> Vec<String> {
        self.models.iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            mappings: default_mappings(),
            models: default_models(),
            provider: ProviderConfig::default(),
            retry: RetryConfig::default(),
            change_detection: ChangeDetectionMode::default(),
            prompt: PromptConfig::default(),
            header: String::new(),
            log_level: LogLevel::default(),
        }
    }
}
