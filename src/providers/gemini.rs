use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::{Client, StatusCode};
use log::{debug, error};
use url::Url;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Gemini client for the Generative Language REST API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. https://generativelanguage.googleapis.com
    endpoint: String,
    /// Sampling temperature sent with every request
    temperature: Option<f32>,
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns; a single user turn for translation
    pub contents: Vec<GeminiContent>,

    /// Sampling parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One conversation turn
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role of the sender (user, model)
    #[serde(default)]
    pub role: Option<String>,

    /// Content parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A content part; only text parts are used
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling parameters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,

    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,

    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiRequest {
    /// Create a single-turn request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(prompt.into()) }],
            }],
            generation_config: None,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.generation_config = temperature.map(|t| GenerationConfig { temperature: Some(t) });
        self
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            temperature: None,
        }
    }

    /// Set the sampling temperature used for every request
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn model_url(&self, model: &str, action: Option<&str>) -> Result<Url, ProviderError> {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        let path = match action {
            Some(action) => format!("{}/v1beta/models/{}:{}", base, model, action),
            None => format!("{}/v1beta/models/{}", base, model),
        };
        Url::parse(&path)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint URL {}: {}", path, e)))
    }

    /// Send a generateContent request
    pub async fn complete(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let url = self.model_url(model, Some("generateContent"))?;

        let response = self.client.post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}) for {}: {}", status, model, body);
            return Err(classify_status(model, status, &body));
        }

        response.json::<GeminiResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    /// Extract text from a Gemini response
    pub fn extract_text(response: &GeminiResponse) -> Result<String, ProviderError> {
        if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
            return Err(ProviderError::Blocked(reason));
        }

        let text: String = response.candidates.first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter()
                .filter_map(|p| p.text.as_deref())
                .collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = GeminiRequest::new(prompt).temperature(self.temperature);
        let response = self.complete(model, &request).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "{}: {} prompt tokens, {} completion tokens",
                model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Self::extract_text(&response)
    }

    async fn probe(&self, model: &str) -> Result<(), ProviderError> {
        let url = self.model_url(model, None)?;

        let response = self.client.get(url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(model, status, &body))
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_connect() || e.is_timeout() {
        ProviderError::ConnectionError(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Map a non-success HTTP status and body to a provider error
pub fn classify_status(model: &str, status: StatusCode, body: &str) -> ProviderError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.to_string(), String::new()),
    };

    match status.as_u16() {
        429 => ProviderError::RateLimitExceeded(message),
        404 | 403 | 503 => ProviderError::ModelUnavailable {
            model: model.to_string(),
            message,
        },
        401 => ProviderError::AuthenticationError(message),
        400 if api_status == "INVALID_ARGUMENT" && message.contains("API key") => {
            ProviderError::AuthenticationError(message)
        }
        code => ProviderError::ApiError {
            status_code: code,
            message: if api_status.is_empty() {
                message
            } else {
                format!("{}: {}", api_status, message)
            },
        },
    }
}
