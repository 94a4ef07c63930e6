/*!
 * Exponential backoff for rate-limited provider calls.
 */

use log::{error, warn};
use std::future::Future;
use std::time::Duration;

use crate::app_config::RetryConfig;
use crate::errors::{ProviderError, TranslationError};

/// Retry settings for one provider call
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later one
    pub base_delay: Duration,
}

/// What went wrong after the policy stopped trying
#[derive(Debug)]
pub enum RetryOutcome {
    /// Model is unavailable; the caller should switch to the next one
    SwitchModel(ProviderError),
    /// The call failed for good on this model
    Failed(TranslationError),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Backoff before retry number `attempt + 1` (attempt is zero based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `call` until it succeeds, the model turns out to be unavailable,
    /// or rate limiting outlasts the retries.
    ///
    /// Only rate-limit errors are retried. Unavailability is reported
    /// immediately so the caller can fall back.
    pub async fn run<F, Fut, T>(&self, mut call: F) -> Result<T, RetryOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let attempts = self.max_retries + 1;
        let mut attempt = 0;

        loop {
            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if error.is_model_unavailable() {
                return Err(RetryOutcome::SwitchModel(error));
            }

            if !error.is_rate_limited() {
                error!("Unexpected error: {}", error);
                return Err(RetryOutcome::Failed(TranslationError::Provider(error)));
            }

            if attempt + 1 >= attempts {
                error!("API error after {} attempts: {}", attempt + 1, error);
                return Err(RetryOutcome::Failed(TranslationError::RetriesExhausted {
                    attempts: attempt + 1,
                    source: error,
                }));
            }

            let delay = self.delay_for(attempt);
            warn!(
                "Rate limit/quota hit, retrying in {:.1}s (attempt {}/{})",
                delay.as_secs_f64(), attempt + 1, attempts
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
