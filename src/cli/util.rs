//! CLI Common Utilities
//!
//! Shared configuration loading, store access and serialized output for
//! CLI commands.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::config::{Config, ConfigLoader};
use crate::storage::{SharedStore, open_store};
use crate::types::{PlanError, Result};

/// Command execution context
///
/// Created via `CommandContext::load()` for commands that need the store,
/// or `CommandContext::load_config()` for commands that only need config.
#[derive(Clone)]
pub struct CommandContext {
    /// Effective configuration
    pub config: Config,
    /// Idea store selected by `storage.backend`
    pub store: SharedStore,
}

impl CommandContext {
    /// Load configuration and open the configured store
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let store = open_store(&config.storage)?;
        Ok(Self { config, store })
    }

    /// Load configuration only
    ///
    /// An explicit path replaces the global/project layering.
    pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
        match config_path {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    }
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
    Toml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Toml => write!(f, "toml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: text, json, yaml, toml",
                s
            )),
        }
    }
}

/// Serialize a command result in a machine-readable format
///
/// Returns `None` for `Text`; the caller renders text itself.
pub fn serialize_as<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    let rendered = match format {
        OutputFormat::Text => return Ok(None),
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Toml => {
            toml::to_string_pretty(value).map_err(|e| PlanError::Config(e.to_string()))?
        }
    };
    Ok(Some(rendered))
}
