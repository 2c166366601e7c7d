use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::utils::ServiceError;
use super::CaptionService;

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llava".to_string()
}

fn default_prompt() -> String {
    "Describe this image in detail.".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Connection settings for the local captioning model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Base URL of the model server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Vision model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Instruction sent with every image
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            prompt: default_prompt(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Client for an Ollama-style `/api/generate` endpoint.
pub struct OllamaClient {
    http: reqwest::Client,
    config: CaptionConfig,
    url: String,
}

impl OllamaClient {
    pub fn new(config: CaptionConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(format!("Failed to create HTTP client: {}", e)))?;
        let url = format!("{}/api/generate", config.endpoint.trim_end_matches('/'));

        Ok(Self { http, config, url })
    }

    pub fn config(&self) -> &CaptionConfig {
        &self.config
    }

    fn map_send_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.config.timeout_secs)
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl CaptionService for OllamaClient {
    async fn describe(&self, image: &Path) -> Result<String, ServiceError> {
        let bytes = tokio::fs::read(image).await.map_err(|e| ServiceError::ImageRead {
            path: image.to_path_buf(),
            reason: e.to_string(),
        })?;

        let request = GenerateRequest {
            model: &self.config.model,
            prompt: &self.config.prompt,
            images: vec![STANDARD.encode(&bytes)],
            stream: false,
        };

        debug!("Sending {} ({} bytes) to {}", image.display(), bytes.len(), self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status: status.as_u16(), body });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        match payload.response.map(|text| text.trim().to_string()) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ServiceError::InvalidResponse("No description in response".to_string())),
        }
    }
}
