//! Fallback Provider Chain
//!
//! Tries providers in priority order until one produces a usable answer.
//!
//! ## Strategy
//!
//! 1. Call the current provider through its adapter (timeout enforced there)
//! 2. Sanity-check the answer (non-blank, bounded length)
//! 3. On `Timeout`/`RateLimited`, retry the same provider after a backoff
//!    delay, honoring a provider-supplied retry hint when it is larger
//! 4. On `Unavailable`/`InvalidResponse`, or once retries run out, advance
//! 5. Continue until success or all providers exhausted
//!
//! Providers are attempted strictly sequentially; a request never has two
//! provider calls in flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use futures::future::join_all;
use serde::Serialize;
use tracing::{Instrument, debug, info, instrument, warn};

use super::{GenerationOptions, ProviderAdapter, ProviderConfig};
use crate::constants::chain as chain_constants;
use crate::types::{
    OrchestrationFailure, ProviderError, ProviderErrorKind, ProviderResult, RequestContext, Result,
};

// =============================================================================
// Sleeper
// =============================================================================

/// Waits out backoff delays between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =============================================================================
// Configuration and Statistics
// =============================================================================

/// Configuration for the provider chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    /// First backoff delay; each further retry doubles it
    pub base_delay: Duration,
    /// Upper bound for any single delay, including provider hints
    pub max_delay: Duration,
    /// Longest answer accepted from a provider (characters)
    pub max_response_chars: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(chain_constants::BASE_DELAY_MS),
            max_delay: Duration::from_millis(chain_constants::MAX_DELAY_MS),
            max_response_chars: chain_constants::MAX_RESPONSE_CHARS,
        }
    }
}

/// One provider call made by the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAttempt {
    pub provider: String,
    /// 1-based attempt number on this provider
    pub attempt: u8,
    /// `None` when the attempt succeeded
    pub error_kind: Option<ProviderErrorKind>,
    pub elapsed_ms: u64,
}

/// Execution statistics for one chain run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainStats {
    pub attempts: Vec<ChainAttempt>,
    pub total_duration_ms: u64,
}

impl ChainStats {
    fn record(
        &mut self,
        provider: &str,
        attempt: u8,
        error_kind: Option<ProviderErrorKind>,
        elapsed_ms: u64,
    ) {
        self.attempts.push(ChainAttempt {
            provider: provider.to_string(),
            attempt,
            error_kind,
            elapsed_ms,
        });
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.len()
    }

    /// One entry per provider tried, in order
    ///
    /// Every provider's first call is attempt 1, so providers sharing a name
    /// are still listed separately.
    pub fn attempted_providers(&self) -> Vec<String> {
        self.attempts
            .iter()
            .filter(|attempt| attempt.attempt == 1)
            .map(|attempt| attempt.provider.clone())
            .collect()
    }
}

/// Successful chain run
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub text: String,
    /// Name of the provider that produced `text`
    pub provider: String,
    pub stats: ChainStats,
}

/// Reachability of one configured provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderHealth {
    pub name: String,
    pub model: String,
    pub available: bool,
}

// =============================================================================
// Step Decision
// =============================================================================

/// What the chain does after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    /// Call the same provider again after `delay`
    Retry { delay: Duration },
    /// Give up on this provider and move to the next one
    Advance,
}

impl ChainStep {
    /// Decide the next step after `error`
    ///
    /// `retries_used` counts retries already spent on this provider. The
    /// schedule yields the computed exponential delays; a larger
    /// `retry_after` hint replaces the computed delay, bounded by `max_delay`.
    pub fn after_failure(
        error: &ProviderError,
        retries_used: u8,
        max_retries: u8,
        schedule: &mut impl Iterator<Item = Duration>,
        max_delay: Duration,
    ) -> Self {
        if !error.is_retryable() || retries_used >= max_retries {
            return Self::Advance;
        }

        let Some(computed) = schedule.next() else {
            return Self::Advance;
        };

        let delay = match error.retry_after {
            Some(hint) if hint > computed => hint.min(max_delay),
            _ => computed,
        };
        Self::Retry { delay }
    }
}

// =============================================================================
// Provider Chain
// =============================================================================

/// Ordered fallback chain over provider adapters
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<ProviderAdapter>,
    config: ChainConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl ProviderChain {
    /// Create an empty chain
    pub fn new(config: ChainConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Add a provider to the end of the chain
    pub fn add_provider(mut self, provider: ProviderAdapter) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Build chain from provider configs, ordered by priority
    ///
    /// Entries with equal priority keep their configured order.
    pub fn from_configs(
        configs: &[ProviderConfig],
        chain_config: ChainConfig,
        defaults: &GenerationOptions,
    ) -> Result<Self> {
        let mut chain = Self::new(chain_config);
        for config in configs {
            chain
                .providers
                .push(ProviderAdapter::from_config(config, defaults)?);
        }
        chain.providers.sort_by_key(|p| p.priority());
        Ok(chain)
    }

    pub fn providers(&self) -> &[ProviderAdapter] {
        &self.providers
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Backoff delays for one provider: base, 2×base, 4×base, ... capped
    fn backoff_schedule(&self, max_retries: u8) -> ExponentialBackoff {
        ExponentialBuilder::default()
            .with_min_delay(self.config.base_delay)
            .with_max_delay(self.config.max_delay)
            .with_factor(chain_constants::BACKOFF_FACTOR)
            .with_max_times(max_retries as usize)
            .build()
    }

    /// Reject answers nobody downstream could use
    fn check_response(&self, text: String) -> ProviderResult<String> {
        if text.trim().is_empty() {
            return Err(ProviderError::invalid_response("empty response"));
        }
        let chars = text.chars().count();
        if chars > self.config.max_response_chars {
            return Err(ProviderError::invalid_response(format!(
                "response of {} characters exceeds limit of {}",
                chars, self.config.max_response_chars
            )));
        }
        Ok(text)
    }

    /// Produce raw text for `prompt` from the first provider that succeeds
    ///
    /// All logging happens inside the request's span.
    pub async fn generate_with_fallback(
        &self,
        prompt: &str,
        ctx: &RequestContext,
    ) -> std::result::Result<ChainOutcome, OrchestrationFailure> {
        self.execute(prompt).instrument(ctx.span().clone()).await
    }

    #[instrument(skip(self, prompt), fields(providers = self.providers.len()))]
    async fn execute(
        &self,
        prompt: &str,
    ) -> std::result::Result<ChainOutcome, OrchestrationFailure> {
        let start_time = Instant::now();
        let mut stats = ChainStats::default();
        let mut last_error: Option<ProviderError> = None;

        if self.providers.is_empty() {
            warn!("No providers configured in chain");
            return Err(OrchestrationFailure {
                attempted_providers: Vec::new(),
                last_error: None,
            });
        }

        for adapter in &self.providers {
            let provider_name = adapter.name();
            let mut schedule = self.backoff_schedule(adapter.max_retries());
            let mut retries_used: u8 = 0;

            loop {
                let attempt = retries_used.saturating_add(1);
                let attempt_start = Instant::now();

                debug!(
                    provider = %provider_name,
                    attempt,
                    max_attempts = adapter.max_retries() as u16 + 1,
                    "Chain attempt"
                );

                let result = match adapter.generate(prompt).await {
                    Ok(text) => self
                        .check_response(text)
                        .map_err(|e| e.provider(provider_name)),
                    Err(err) => Err(err),
                };
                let elapsed_ms = attempt_start.elapsed().as_millis() as u64;

                match result {
                    Ok(text) => {
                        stats.record(provider_name, attempt, None, elapsed_ms);
                        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

                        info!(
                            provider = %provider_name,
                            attempts = stats.total_attempts(),
                            duration_ms = stats.total_duration_ms,
                            "Chain succeeded"
                        );

                        return Ok(ChainOutcome {
                            text,
                            provider: provider_name.to_string(),
                            stats,
                        });
                    }
                    Err(err) => {
                        stats.record(provider_name, attempt, Some(err.kind), elapsed_ms);

                        warn!(
                            provider = %provider_name,
                            attempt,
                            kind = %err.kind,
                            error = %err,
                            "Provider failed"
                        );

                        let step = ChainStep::after_failure(
                            &err,
                            retries_used,
                            adapter.max_retries(),
                            &mut schedule,
                            self.config.max_delay,
                        );
                        last_error = Some(err);

                        match step {
                            ChainStep::Retry { delay } => {
                                debug!(
                                    provider = %provider_name,
                                    delay_ms = delay.as_millis() as u64,
                                    "Retrying after backoff"
                                );
                                self.sleeper.sleep(delay).await;
                                retries_used += 1;
                            }
                            ChainStep::Advance => {
                                info!(provider = %provider_name, "Moving to next provider");
                                break;
                            }
                        }
                    }
                }
            }
        }

        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;
        let attempted_providers = stats.attempted_providers();

        warn!(
            attempted = ?attempted_providers,
            attempts = stats.total_attempts(),
            "All providers in chain failed"
        );

        Err(OrchestrationFailure {
            attempted_providers,
            last_error,
        })
    }

    /// Probe every provider concurrently
    pub async fn health_check(&self) -> Vec<ProviderHealth> {
        join_all(self.providers.iter().map(|adapter| async move {
            ProviderHealth {
                name: adapter.name().to_string(),
                model: adapter.model().to_string(),
                available: adapter.health_check().await,
            }
        }))
        .await
    }
}
