/*!
 * Provider implementations for hosted text-generation services.
 *
 * This module contains client implementations for LLM providers:
 * - Gemini: Google Generative Language API
 * - Mock: scripted provider used by the test suite
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// The model is passed per call so the translator can walk its priority
/// list without rebuilding the client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` with `model`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The generated text or an error
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;

    /// Check that `model` exists and is usable with the configured credentials
    async fn probe(&self, model: &str) -> Result<(), ProviderError>;
}

pub mod gemini;
pub mod mock;
