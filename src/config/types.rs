//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (platform config dir) and project (.bizplan/) level configuration.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::{ChainConfig, GenerationOptions, ProviderConfig};
use crate::constants::{chain, classification, generation, parser};
use crate::plan::{ParseMode, RiskThreshold};
use crate::types::{PlanError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Providers tried by the chain, ordered by priority
    pub providers: Vec<ProviderConfig>,

    /// Retry and backoff settings
    pub chain: ChainSettings,

    /// Generation defaults for providers without overrides
    pub generation: GenerationSettings,

    /// Response parser settings
    pub parser: ParserConfig,

    /// Category, risk, and budget rules
    pub classification: ClassificationConfig,

    /// Where generated ideas are kept
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            providers: vec![ProviderConfig {
                priority: 10,
                ..ProviderConfig::new("claude-code")
            }],
            chain: ChainSettings::default(),
            generation: GenerationSettings::default(),
            parser: ParserConfig::default(),
            classification: ClassificationConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PlanError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(PlanError::Config(
                "At least one provider must be configured".to_string(),
            ));
        }

        for provider in &self.providers {
            let name = provider.display_name();
            if provider.timeout_ms == 0 {
                return Err(PlanError::Config(format!(
                    "Provider '{}': timeout_ms must be greater than 0",
                    name
                )));
            }
            if let Some(temperature) = provider.temperature {
                validate_temperature(temperature, &format!("Provider '{}'", name))?;
            }
            if provider.max_tokens == Some(0) {
                return Err(PlanError::Config(format!(
                    "Provider '{}': max_tokens must be greater than 0",
                    name
                )));
            }
        }

        validate_temperature(self.generation.temperature, "Generation")?;
        if self.generation.max_tokens == 0 {
            return Err(PlanError::Config(
                "Generation max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.chain.base_delay_ms > self.chain.max_delay_ms {
            return Err(PlanError::Config(format!(
                "Chain base_delay_ms ({}) exceeds max_delay_ms ({})",
                self.chain.base_delay_ms, self.chain.max_delay_ms
            )));
        }
        if self.chain.max_response_chars == 0 {
            return Err(PlanError::Config(
                "Chain max_response_chars must be greater than 0".to_string(),
            ));
        }

        if self.parser.placeholder.trim().is_empty() {
            return Err(PlanError::Config(
                "Parser placeholder must not be empty".to_string(),
            ));
        }

        self.classification.validate()
    }

    /// Chain settings as the orchestrator consumes them
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            base_delay: Duration::from_millis(self.chain.base_delay_ms),
            max_delay: Duration::from_millis(self.chain.max_delay_ms),
            max_response_chars: self.chain.max_response_chars,
        }
    }

    /// Generation options applied to providers without overrides
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
            timeout: Duration::from_millis(generation::DEFAULT_TIMEOUT_MS),
        }
    }
}

fn validate_temperature(temperature: f32, owner: &str) -> Result<()> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(PlanError::Config(format!(
            "{} temperature must be between 0.0 and 2.0, got {}",
            owner, temperature
        )));
    }
    Ok(())
}

// =============================================================================
// Chain Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// First backoff delay in milliseconds
    pub base_delay_ms: u64,

    /// Cap for any single backoff delay in milliseconds
    pub max_delay_ms: u64,

    /// Longest provider answer accepted (characters)
    pub max_response_chars: usize,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            base_delay_ms: chain::BASE_DELAY_MS,
            max_delay_ms: chain::MAX_DELAY_MS,
            max_response_chars: chain::MAX_RESPONSE_CHARS,
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 = deterministic, 2.0 = most varied)
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: generation::DEFAULT_MAX_TOKENS,
            temperature: generation::DEFAULT_TEMPERATURE,
        }
    }
}

// =============================================================================
// Parser Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// `strict` fails on missing sections, `lenient` fills them in
    pub mode: ParseMode,

    /// Content used for sections filled in lenient mode
    pub placeholder: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            placeholder: parser::PLACEHOLDER.to_string(),
        }
    }
}

// =============================================================================
// Classification Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Ratio used to derive a missing budget bound from the known one
    pub budget_multiplier: f64,

    /// Risk table; the row without a category is the default
    pub risk_thresholds: Vec<RiskThreshold>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            budget_multiplier: classification::BUDGET_MULTIPLIER,
            risk_thresholds: RiskThreshold::default_rows(),
        }
    }
}

impl ClassificationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.budget_multiplier.is_finite() || self.budget_multiplier < 1.0 {
            return Err(PlanError::Config(format!(
                "Classification budget_multiplier must be at least 1.0, got {}",
                self.budget_multiplier
            )));
        }

        let mut seen = HashSet::new();
        for row in &self.risk_thresholds {
            let label = row
                .category
                .map(|c| c.to_string())
                .unwrap_or_else(|| "default".to_string());
            if row.low_below > row.high_from {
                return Err(PlanError::Config(format!(
                    "Risk threshold '{}': low_below ({}) exceeds high_from ({})",
                    label, row.low_below, row.high_from
                )));
            }
            if !seen.insert(row.category) {
                return Err(PlanError::Config(format!(
                    "Risk threshold '{}' is defined more than once",
                    label
                )));
            }
        }

        if !seen.contains(&None) {
            return Err(PlanError::Config(
                "Risk thresholds need a default row without a category".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on exit
    Memory,
    /// SQLite database file
    #[default]
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            _ => Err(format!(
                "Unknown storage backend: {}. Valid values: memory, sqlite",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Database file; defaults to the platform data directory
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].provider, "claude-code");
        assert_eq!(config.parser.mode, ParseMode::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_providers() {
        let config = Config {
            providers: Vec::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        config.generation.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.providers[0].temperature = Some(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.providers[0].timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_classification_validation() {
        let mut config = ClassificationConfig::default();
        assert!(config.validate().is_ok());

        config.budget_multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = ClassificationConfig::default();
        config.risk_thresholds.push(RiskThreshold {
            category: Some(Category::Tech),
            low_below: 1,
            high_from: 2,
        });
        assert!(config.validate().is_err());

        let mut config = ClassificationConfig::default();
        config.risk_thresholds.retain(|row| row.category.is_some());
        assert!(config.validate().is_err());

        let mut config = ClassificationConfig::default();
        config.risk_thresholds[0].low_below = config.risk_thresholds[0].high_from + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chain_config_conversion() {
        let config = Config::default();
        let chain = config.chain_config();
        assert_eq!(chain.base_delay, Duration::from_millis(chain::BASE_DELAY_MS));
        assert_eq!(chain.max_delay, Duration::from_millis(chain::MAX_DELAY_MS));
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_thresholds() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[[classification.risk_thresholds]]"));
        assert!(text.contains("category = \"Tech\""));
    }
}
