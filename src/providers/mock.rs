/*!
 * Mock provider implementation for testing.
 *
 * Each model name can be given its own scripted behavior, so fallback and
 * retry paths can be exercised without a network:
 * - `MockBehavior::Working` - always succeeds with a fake translation
 * - `MockBehavior::RateLimited { times }` - fails with 429 `times` times, then works
 * - `MockBehavior::Unavailable` - the model does not exist
 * - `MockBehavior::Empty` - answers with a blank reply
 * - `MockBehavior::Failing` - answers with a non-retryable server error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for one mocked model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Rate limited for the first `times` calls
    RateLimited { times: usize },
    /// Reports the model as unavailable
    Unavailable,
    /// Returns a blank reply
    Empty,
    /// Always fails with a 500
    Failing,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    probes: Vec<String>,
    rate_limit_hits: HashMap<String, usize>,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior for models without an explicit entry
    default_behavior: MockBehavior,
    /// Per-model overrides
    behaviors: HashMap<String, MockBehavior>,
    /// Whether `probe` mirrors `generate` availability
    probe_follows_behavior: bool,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified default behavior
    pub fn new(default_behavior: MockBehavior) -> Self {
        Self {
            default_behavior,
            behaviors: HashMap::new(),
            probe_follows_behavior: true,
            custom_response: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Override the behavior of one model
    pub fn with_model(mut self, model: impl Into<String>, behavior: MockBehavior) -> Self {
        self.behaviors.insert(model.into(), behavior);
        self
    }

    /// Let every probe succeed regardless of the scripted behavior
    pub fn with_permissive_probe(mut self) -> Self {
        self.probe_follows_behavior = false;
        self
    }

    /// Set a custom response generator; it receives the full prompt
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// All generate calls made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Models passed to `probe` so far
    pub fn probes(&self) -> Vec<String> {
        self.state.lock().probes.clone()
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    fn behavior_for(&self, model: &str) -> MockBehavior {
        self.behaviors.get(model).copied().unwrap_or(self.default_behavior)
    }

    /// Pull the document body back out of a translation prompt
    fn document_of(prompt: &str) -> &str {
        prompt.rsplit_once("File Content:\n")
            .map(|(_, body)| body)
            .unwrap_or(prompt)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        match self.behavior_for(model) {
            MockBehavior::Working => {}
            MockBehavior::RateLimited { times } => {
                let hits = state.rate_limit_hits.entry(model.to_string()).or_insert(0);
                if *hits < times {
                    *hits += 1;
                    return Err(ProviderError::RateLimitExceeded(
                        "Resource has been exhausted (e.g. check quota).".to_string(),
                    ));
                }
            }
            MockBehavior::Unavailable => {
                return Err(ProviderError::ModelUnavailable {
                    model: model.to_string(),
                    message: format!("models/{} is not found for API version v1beta", model),
                });
            }
            MockBehavior::Empty => return Ok("   ".to_string()),
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "Internal error encountered.".to_string(),
                });
            }
        }

        let text = match self.custom_response {
            Some(generator) => generator(prompt),
            None => format!("[RU] {}", Self::document_of(prompt)),
        };
        Ok(text)
    }

    async fn probe(&self, model: &str) -> Result<(), ProviderError> {
        self.state.lock().probes.push(model.to_string());

        if self.probe_follows_behavior && self.behavior_for(model) == MockBehavior::Unavailable {
            return Err(ProviderError::ModelUnavailable {
                model: model.to_string(),
                message: "not found".to_string(),
            });
        }
        Ok(())
    }
}
