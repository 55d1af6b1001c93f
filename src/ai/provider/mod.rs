//! Text Provider Abstraction
//!
//! Defines the `TextProvider` trait: a single "generate(prompt, options) → text"
//! capability per AI backend. Providers perform one outbound call and keep no
//! state between calls; timeouts, empty-answer detection and retries live in
//! the adapter and chain layers.
//!
//! ## Modules
//!
//! - `adapter`: Per-provider timeout enforcement and error normalization
//! - `chain`: Ordered fallback chain with retry/backoff

mod adapter;
mod chain;
mod claude_code;
mod ollama;
mod openai;

pub use adapter::ProviderAdapter;
pub use chain::{
    ChainAttempt, ChainConfig, ChainOutcome, ChainStats, ChainStep, ProviderChain,
    ProviderHealth, Sleeper, TokioSleeper,
};
#[cfg(test)]
pub(crate) use chain::testing;
pub use claude_code::ClaudeCodeProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::{chain as chain_constants, generation as gen_constants};
use crate::types::{PlanError, ProviderResult, Result};

// =============================================================================
// Generation Options
// =============================================================================

/// Per-call generation options
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
    /// Deadline for the whole call
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: gen_constants::DEFAULT_MAX_TOKENS,
            temperature: gen_constants::DEFAULT_TEMPERATURE,
            timeout: Duration::from_millis(gen_constants::DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Shared provider type for concurrent access across requests.
pub type SharedProvider = Arc<dyn TextProvider>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for one provider in the chain
///
/// Note: API keys are never serialized and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider type: "openai", "ollama", "claude-code"
    pub provider: String,
    /// Name used in logs and failure reports (defaults to the provider type)
    pub name: Option<String>,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Priority (lower = try first); list order breaks ties
    pub priority: u8,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries on the same provider after the first attempt
    pub max_retries: u8,
    /// Temperature override for this provider
    pub temperature: Option<f32>,
    /// Token limit override for this provider
    pub max_tokens: Option<u32>,
    /// API key (for OpenAI-compatible endpoints)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("name", &self.name)
            .field("model", &self.model)
            .field("priority", &self.priority)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            name: None,
            model: None,
            priority: 100,
            timeout_ms: gen_constants::DEFAULT_TIMEOUT_MS,
            max_retries: chain_constants::DEFAULT_MAX_RETRIES,
            temperature: None,
            max_tokens: None,
            api_key: None,
            api_base: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Name reported in logs and failure reports
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.provider)
    }
}

// =============================================================================
// Text Provider Trait
// =============================================================================

/// A single AI text-generation backend
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Perform one generation call and return the raw answer text
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> ProviderResult<String>;

    /// Provider name for logging and failure reports
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "claude-code" => Ok(Arc::new(ClaudeCodeProvider::new(config))),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        _ => Err(PlanError::Config(format!(
            "Unknown provider: {}. Supported: claude-code, openai, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::new("openai")
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_provider_config_never_serializes_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::new("openai")
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_display_name_defaults_to_type() {
        let mut config = ProviderConfig::new("ollama");
        assert_eq!(config.display_name(), "ollama");
        config.name = Some("local-llama".to_string());
        assert_eq!(config.display_name(), "local-llama");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&ProviderConfig::new("telepathy"));
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn test_create_claude_code_provider() {
        let provider = create_provider(&ProviderConfig::new("claude-code")).unwrap();
        assert_eq!(provider.name(), "claude-code");
    }
}
