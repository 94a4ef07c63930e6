/*!
 * # docs-i18n - documentation translator for CI
 *
 * Keeps a translated mirror of a project's markdown documentation up to date
 * using a hosted generative-language model.
 *
 * ## Features
 *
 * - Mirror single files or whole directory trees of `*.md` sources
 * - Skip documents that did not change since their last translation:
 *   - content hash stored in a `.hash` sidecar file (default)
 *   - modification time comparison
 * - Model priority list with automatic fallback on unavailable models
 * - Exponential backoff on rate-limit and quota errors
 * - Project glossary and tone rules baked into the prompt
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Runs the pipeline over all configured mappings
 * - `change_detection`: Staleness checks and markers
 * - `translation`: Prompt, retry and model fallback:
 *   - `translation::core`: Document translator
 *   - `translation::models`: Model priority list
 *   - `translation::retry`: Exponential backoff
 *   - `translation::prompt`: Prompt template
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod change_detection;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{ChangeDetectionMode, Config, Mapping};
pub use app_controller::{Controller, RunSummary};
pub use change_detection::ChangeDetector;
pub use errors::{AppError, ProviderError, TranslationError};
pub use translation::Translator;
