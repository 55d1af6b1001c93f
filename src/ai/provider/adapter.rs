//! Provider Adapter
//!
//! Wraps one provider with the call options it runs under, its retry budget,
//! and its chain priority. Every call is bounded by the configured timeout
//! and every failure comes back tagged with the provider's name.

use std::time::Duration;

use tracing::debug;

use super::{GenerationOptions, ProviderConfig, SharedProvider, create_provider};
use crate::ai::timeout::with_timeout;
use crate::constants::chain as chain_constants;
use crate::types::{ProviderError, ProviderResult, Result};

/// Provider with the options and retry budget it is called with
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: SharedProvider,
    name: String,
    options: GenerationOptions,
    max_retries: u8,
    priority: u8,
}

impl ProviderAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        let name = provider.name().to_string();
        Self {
            provider,
            name,
            options: GenerationOptions::default(),
            max_retries: chain_constants::DEFAULT_MAX_RETRIES,
            priority: 100,
        }
    }

    /// Build the provider and its call options from configuration
    ///
    /// Per-provider overrides win over `defaults`; the timeout always comes
    /// from the provider entry.
    pub fn from_config(config: &ProviderConfig, defaults: &GenerationOptions) -> Result<Self> {
        let provider = create_provider(config)?;
        let options = GenerationOptions {
            max_tokens: config.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: config.temperature.unwrap_or(defaults.temperature),
            timeout: Duration::from_millis(config.timeout_ms),
        };

        Ok(Self::new(provider)
            .with_name(config.display_name())
            .with_options(options)
            .with_max_retries(config.max_retries)
            .with_priority(config.priority))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// One bounded provider call
    ///
    /// Expiry yields `Timeout`; a blank answer yields `InvalidResponse`.
    /// No retry happens here.
    pub async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        debug!(
            provider = %self.name,
            model = %self.provider.model(),
            timeout_ms = self.options.timeout.as_millis() as u64,
            "Calling provider"
        );

        let result = with_timeout(
            self.options.timeout,
            self.provider.generate(prompt, &self.options),
            &format!("{} generate", self.name),
        )
        .await;

        match result {
            Ok(text) if text.trim().is_empty() => Err(ProviderError::invalid_response(
                "empty response",
            )
            .provider(self.name.as_str())),
            Ok(text) => Ok(text),
            Err(mut err) => {
                err.provider = Some(self.name.clone());
                Err(err)
            }
        }
    }

    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::TextProvider;
    use crate::types::ProviderErrorKind;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedProvider {
        answer: ProviderResult<String>,
        delay: Duration,
    }

    #[async_trait]
    impl TextProvider for FixedProvider {
        async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> ProviderResult<String> {
            tokio::time::sleep(self.delay).await;
            self.answer.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-model"
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn adapter(answer: ProviderResult<String>, delay: Duration) -> ProviderAdapter {
        ProviderAdapter::new(Arc::new(FixedProvider { answer, delay }))
    }

    #[tokio::test]
    async fn test_passes_text_through() {
        let text = adapter(Ok("plan".to_string()), Duration::ZERO)
            .generate("p")
            .await
            .unwrap();
        assert_eq!(text, "plan");
    }

    #[tokio::test]
    async fn test_blank_answer_is_invalid_response() {
        let err = adapter(Ok(" \n ".to_string()), Duration::ZERO)
            .generate("p")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidResponse);
        assert_eq!(err.provider.as_deref(), Some("fixed"));
    }

    #[tokio::test]
    async fn test_enforces_timeout() {
        let err = adapter(Ok("late".to_string()), Duration::from_secs(5))
            .with_timeout(Duration::from_millis(10))
            .generate("p")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_tags_errors_with_adapter_name() {
        let err = adapter(Err(ProviderError::rate_limited("slow down")), Duration::ZERO)
            .with_name("primary")
            .generate("p")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert_eq!(err.provider.as_deref(), Some("primary"));
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let config = ProviderConfig {
            name: Some("cli".to_string()),
            timeout_ms: 1500,
            max_retries: 4,
            priority: 2,
            temperature: Some(0.1),
            ..ProviderConfig::new("claude-code")
        };
        let defaults = GenerationOptions {
            max_tokens: 999,
            temperature: 0.9,
            timeout: Duration::from_secs(60),
        };
        let adapter = ProviderAdapter::from_config(&config, &defaults).unwrap();
        assert_eq!(adapter.name(), "cli");
        assert_eq!(adapter.max_retries(), 4);
        assert_eq!(adapter.priority(), 2);
        assert_eq!(adapter.options().max_tokens, 999);
        assert_eq!(adapter.options().temperature, 0.1);
        assert_eq!(adapter.options().timeout, Duration::from_millis(1500));
    }
}
