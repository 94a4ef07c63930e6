/*!
 * Document translation with retry and model fallback.
 */

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::translation::models::{self, ModelChain};
use crate::translation::prompt::PromptBuilder;
use crate::translation::retry::{RetryOutcome, RetryPolicy};
use crate::translation::sanitize::strip_code_fence;

/// A finished translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Translated markdown
    pub text: String,
    /// Model that produced it
    pub model: String,
}

/// Translates whole markdown documents through a provider.
///
/// Owns the model chain, so a fallback made while translating one document
/// carries over to the next.
#[derive(Debug)]
pub struct Translator {
    provider: Arc<dyn Provider>,
    chain: ModelChain,
    retry: RetryPolicy,
    prompt: PromptBuilder,
    min_response_chars: usize,
}

impl Translator {
    /// Create a translator from the configuration
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Result<Self> {
        Ok(Self {
            provider,
            chain: ModelChain::new(config.model_priorities())?,
            retry: RetryPolicy::from_config(&config.retry),
            prompt: PromptBuilder::from_config(config)?,
            min_response_chars: config.retry.min_response_chars,
        })
    }

    /// Model that the next request will use
    pub fn current_model(&self) -> &str {
        self.chain.current()
    }

    /// Probe the priority list and start from the first usable model
    pub async fn select_model(&mut self) -> Result<()> {
        models::select_available(self.provider.as_ref(), &mut self.chain).await
    }

    /// Translate one document.
    ///
    /// Rate limits are retried on the current model; an unavailable model is
    /// abandoned for the next one in the list. `file` is only used for logging.
    pub async fn translate(&mut self, text: &str, file: &str) -> Result<Translation, TranslationError> {
        info!("Translating {}...", file);
        let prompt = self.prompt.build(text);

        loop {
            let model = self.chain.current().to_string();
            let provider = Arc::clone(&self.provider);

            let outcome = self.retry
                .run(|| {
                    let provider = Arc::clone(&provider);
                    let model = model.clone();
                    let prompt = prompt.clone();
                    async move { provider.generate(&model, &prompt).await }
                })
                .await;

            match outcome {
                Ok(reply) => {
                    let text = strip_code_fence(&reply).to_string();
                    let len = text.trim().chars().count();
                    if len < self.min_response_chars {
                        return Err(TranslationError::ResponseTooShort {
                            len,
                            min: self.min_response_chars,
                        });
                    }
                    return Ok(Translation { text, model });
                }
                Err(RetryOutcome::Failed(e)) => return Err(e),
                Err(RetryOutcome::SwitchModel(e)) => {
                    warn!("Model {} unavailable: {}", model, e);
                    match self.chain.advance() {
                        Some(next) => info!("Switching to {} model: {}", self.provider.name(), next),
                        None => {
                            return Err(TranslationError::ModelsExhausted {
                                file: file.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
}
