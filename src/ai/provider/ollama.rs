//! Ollama Local Model Provider
//!
//! Text provider for locally running Ollama models (`/api/generate`,
//! non-streaming).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{GenerationOptions, ProviderConfig, TextProvider};
use crate::constants::network;
use crate::types::{ErrorClassifier, PlanError, ProviderError, ProviderResult, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";

/// Ollama Local Model Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_base = Self::validate_endpoint(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
        )?;

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlanError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model,
            client,
        })
    }

    /// Validate endpoint URL (SSRF prevention)
    ///
    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            PlanError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PlanError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    fn build_request(&self, prompt: &str, options: &GenerationOptions) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        }
    }

    fn model_matches(&self, name: &str) -> bool {
        name == self.model || name.starts_with(self.model.trim_end_matches(":latest"))
    }
}

#[async_trait]
impl TextProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> ProviderResult<String> {
        debug!(model = %self.model, temperature = options.temperature, "Sending request to Ollama API");

        let request = self.build_request(prompt, options);
        let url = format!("{}/api/generate", self.api_base);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::timeout(format!("Ollama request timed out: {}", e))
                } else if e.is_connect() {
                    ProviderError::unavailable(format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    ))
                } else {
                    ProviderError::unavailable(format!("Ollama request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                "ollama",
            ));
        }

        let body: OllamaResponse = response.json().await.map_err(|e| {
            ProviderError::invalid_response(format!("Failed to decode Ollama response: {}", e))
        })?;

        Ok(body.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.api_base);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<OllamaTagsResponse>().await {
                Ok(tags) => {
                    let available = tags.models.iter().any(|m| self.model_matches(&m.name));
                    if !available {
                        warn!(
                            "Ollama is running but model '{}' not found. Pull with: ollama pull {}",
                            self.model, self.model
                        );
                    }
                    available
                }
                Err(_) => true,
            },
            Ok(resp) => {
                warn!("Ollama API check failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("Ollama not available: {}. Start with: ollama serve", e);
                false
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
