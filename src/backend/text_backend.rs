//! Text generation backends for the upstream LLM API
//! Supports the Gemini `generateContent` API and OpenAI compatible endpoints
//!
//! Upstream credentials travel in headers only. Transport errors have their
//! URL stripped before they can reach a response body.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

const GEMINI_KEY_HEADER: &str = "x-goog-api-key";

use crate::config::{BackendConfig, ProtocolType};
use crate::error::{AppError, Result};

/// Trait for text generation backends
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Get the backend protocol
    fn protocol(&self) -> &str;

    /// Model every prompt is sent to
    fn model(&self) -> &str;

    /// Send one prompt, return the model's text reply
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Probe the upstream API; `true` when it answers
    async fn health_check(&self) -> bool;
}

fn build_client(config: &BackendConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Wrap a transport error without the request URL
fn transport_error(e: reqwest::Error) -> AppError {
    AppError::HttpClient(e.without_url())
}

async fn error_from_status(backend: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(backend = %backend, status = %status, "Backend returned an error status");
    AppError::BackendError(format!("Backend returned {}: {}", status, body))
}

// --- Gemini ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

/// Google Gemini backend (`models/{model}:generateContent`)
pub struct GeminiBackend {
    name: String,
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!(
                backend = %config.name,
                env = %config.api_key_env,
                "No API key configured for Gemini backend"
            );
        }

        Ok(Self {
            name: config.name.clone(),
            client: build_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.endpoint, self.model)
    }

    /// Get headers with authentication
    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.api_key {
            if let Ok(value) = HeaderValue::from_str(key) {
                headers.insert(HeaderName::from_static(GEMINI_KEY_HEADER), value);
            }
        }

        headers
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn protocol(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(backend = %self.name, model = %self.model, prompt_len = prompt.len(), "Sending generateContent request");

        let generation_config = if self.temperature.is_some() || self.max_output_tokens.is_some() {
            Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            })
        } else {
            None
        };

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        };

        let response = self
            .client
            .post(self.url())
            .headers(self.get_headers())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_status(&self.name, response).await);
        }

        let result = response.json::<GeminiResponse>().await.map_err(|e| {
            let e = e.without_url();
            error!(backend = %self.name, error = %e, "Failed to parse generateContent response");
            AppError::BackendError(format!("Failed to parse response: {}", e))
        })?;

        let content = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| {
                let feedback = result
                    .prompt_feedback
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "no candidates returned".to_string());
                AppError::BackendError(format!("Empty response from model: {}", feedback))
            })?;

        Ok(content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .concat())
    }

    async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(self.model_url())
            .headers(self.get_headers())
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(backend = %self.name, "Health check passed");
                true
            }
            Ok(response) => {
                warn!(backend = %self.name, status = %response.status(), "Health check failed");
                false
            }
            Err(e) => {
                let e = e.without_url();
                warn!(backend = %self.name, error = %e, "Health check request failed");
                false
            }
        }
    }
}

// --- OpenAI compatible ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI API compatible text backend (OpenAI, Ollama, vLLM, etc.)
pub struct OpenAICompatibleBackend {
    name: String,
    client: Client,
    endpoint: String,
    model: String,
    auth_token: Option<String>,
    auth_header_name: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAICompatibleBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            name: config.name.clone(),
            client: build_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            auth_token: config.resolve_api_key(),
            auth_header_name: config.auth_header_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
        })
    }

    /// Get headers with authentication
    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            match &self.auth_header_name {
                Some(header_name) => {
                    if let (Ok(name), Ok(value)) = (
                        HeaderName::from_bytes(header_name.as_bytes()),
                        HeaderValue::from_str(token),
                    ) {
                        headers.insert(name, value);
                    }
                }
                None => {
                    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                        headers.insert(AUTHORIZATION, value);
                    }
                }
            }
        }

        headers
    }
}

#[async_trait]
impl TextBackend for OpenAICompatibleBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn protocol(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(backend = %self.name, model = %self.model, prompt_len = prompt.len(), "Sending chat completion request");

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .headers(self.get_headers())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_status(&self.name, response).await);
        }

        let result = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            let e = e.without_url();
            error!(backend = %self.name, error = %e, "Failed to parse chat completion response");
            AppError::BackendError(format!("Failed to parse response: {}", e))
        })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::BackendError("Empty response from model: no choices returned".to_string()))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.endpoint);
        let result = self.client.get(&url).headers(self.get_headers()).send().await;

        match result {
            // 401 means the server is up but rejects the token
            Ok(response) if response.status().is_success() || response.status().as_u16() == 401 => {
                debug!(backend = %self.name, "Health check passed");
                true
            }
            Ok(response) => {
                warn!(backend = %self.name, status = %response.status(), "Health check failed");
                false
            }
            Err(e) => {
                let e = e.without_url();
                warn!(backend = %self.name, error = %e, "Health check request failed");
                false
            }
        }
    }
}

/// Create appropriate text backend based on configuration
pub fn create_text_backend(config: &BackendConfig) -> Result<Arc<dyn TextBackend>> {
    match config.protocol {
        ProtocolType::Gemini => Ok(Arc::new(GeminiBackend::new(config)?)),
        ProtocolType::OpenAI => Ok(Arc::new(OpenAICompatibleBackend::new(config)?)),
    }
}
