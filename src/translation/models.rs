/*!
 * Model priority list with fallback.
 */

use anyhow::{anyhow, Result};
use log::{info, warn};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Static priority list of model names with a cursor on the one in use.
///
/// The cursor only moves forward. Once a model has been abandoned it is
/// not tried again for the rest of the run.
#[derive(Debug, Clone)]
pub struct ModelChain {
    models: Vec<String>,
    index: usize,
}

impl ModelChain {
    pub fn new(models: Vec<String>) -> Result<Self> {
        if models.is_empty() {
            return Err(anyhow!("Model priority list is empty"));
        }
        Ok(Self { models, index: 0 })
    }

    /// Model currently in use
    pub fn current(&self) -> &str {
        &self.models[self.index]
    }

    /// Position of the current model in the priority list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next model; `None` once the list is exhausted
    pub fn advance(&mut self) -> Option<&str> {
        if self.index + 1 >= self.models.len() {
            return None;
        }
        self.index += 1;
        Some(&self.models[self.index])
    }

    /// Whether a model later in the list is still available to fall back to
    pub fn has_fallback(&self) -> bool {
        self.index + 1 < self.models.len()
    }
}

/// Probe the priority list in order and point `chain` at the first usable model.
///
/// Unavailable, rate-limited, auth and parse failures move on to the next
/// model. Connection-level and unexpected failures keep the model: the
/// real translation call will decide.
pub async fn select_available(provider: &dyn Provider, chain: &mut ModelChain) -> Result<()> {
    loop {
        let model = chain.current().to_string();
        info!("Trying model: {}...", model);

        match provider.probe(&model).await {
            Ok(()) => {
                info!("Selected {} model: {}", provider.name(), model);
                return Ok(());
            }
            Err(e) if skips_model(&e) => {
                warn!("Model {} unavailable: {}", model, e);
            }
            Err(e) => {
                warn!("Model {} initialization warning: {}, will retry on actual translation", model, e);
                return Ok(());
            }
        }

        if chain.advance().is_none() {
            return Err(anyhow!("No available models from priority list"));
        }
    }
}

fn skips_model(error: &ProviderError) -> bool {
    error.is_model_unavailable()
        || error.is_rate_limited()
        || matches!(
            error,
            ProviderError::AuthenticationError(_) | ProviderError::ParseError(_) | ProviderError::ApiError { .. }
        )
}
