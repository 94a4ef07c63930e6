/*!
 * Error types for the docs-i18n application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The requested model does not exist, is not enabled for this key,
    /// or is temporarily unavailable
    #[error("Model {model} unavailable: {message}")]
    ModelUnavailable {
        /// Model name as sent to the API
        model: String,
        /// Error message from the API
        message: String,
    },

    /// The API answered without any text
    #[error("Empty response from API")]
    EmptyResponse,

    /// The API refused to answer the prompt
    #[error("Prompt blocked by API: {0}")]
    Blocked(String),
}

impl ProviderError {
    /// Whether this error means the current model should be abandoned
    /// in favour of the next one in the priority list.
    ///
    /// Checked before [`ProviderError::is_rate_limited`].
    pub fn is_model_unavailable(&self) -> bool {
        match self {
            Self::ModelUnavailable { .. } => true,
            Self::ApiError { status_code, message } => {
                matches!(status_code, 403 | 404 | 503) || mentions_unavailable(message)
            }
            Self::RequestFailed(message) => mentions_unavailable(message),
            _ => false,
        }
    }

    /// Whether this error is worth retrying on the same model after a delay
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, message } => {
                *status_code == 429 || mentions_rate_limit(message)
            }
            Self::RequestFailed(message) => mentions_rate_limit(message),
            _ => false,
        }
    }
}

fn mentions_unavailable(message: &str) -> bool {
    let message = message.to_lowercase();
    ["unavailable", "not found", "permission"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn mentions_rate_limit(message: &str) -> bool {
    let message = message.to_lowercase();
    ["quota", "rate limit", "429", "resource_exhausted"]
        .iter()
        .any(|needle| message.contains(needle))
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Rate limiting persisted through every retry
    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of calls made
        attempts: u32,
        /// Last error seen
        source: ProviderError,
    },

    /// Every model in the priority list reported itself unavailable
    #[error("All models exhausted while translating {file}")]
    ModelsExhausted {
        /// File being translated when the list ran out
        file: String,
    },

    /// The reply was too short to be a translation
    #[error("Response too short ({len} chars, expected at least {min})")]
    ResponseTooShort {
        /// Trimmed reply length in chars
        len: usize,
        /// Configured minimum
        min: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
