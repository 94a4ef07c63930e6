/*!
 * Document translation through a hosted model.
 *
 * - `core`: the translator driving retries and model fallback
 * - `models`: model priority list and startup selection
 * - `prompt`: prompt template
 * - `retry`: exponential backoff on rate limits
 * - `sanitize`: cleanup of model replies
 */

// Re-export main types for easier usage
pub use self::core::{Translation, Translator};
pub use self::models::ModelChain;
pub use self::prompt::PromptBuilder;
pub use self::retry::{RetryOutcome, RetryPolicy};

// Submodules
pub mod core;
pub mod models;
pub mod prompt;
pub mod retry;
pub mod sanitize;
