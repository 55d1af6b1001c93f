//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, e.g. ~/.config/bizplan/config.toml)
//! 3. Project config (.bizplan/config.toml)
//! 4. Environment variables (BIZPLAN_* prefix, `__` between nested keys)

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::{debug, info};

use super::types::Config;
use crate::types::{PlanError, Result};

const APP_NAME: &str = "bizplan";
const ENV_PREFIX: &str = "BIZPLAN_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    fn load_layered(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // BIZPLAN_PARSER__MODE -> parser.mode
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| PlanError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| PlanError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// Platform config directory (e.g. ~/.config/bizplan/)
    pub fn global_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Default location of the idea database
    pub fn default_database_path() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("ideas.db"))
            .unwrap_or_else(|| Self::project_dir().join("ideas.db"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".bizplan")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:   {} {}", exists, global.display());
        } else {
            println!("  Global:   (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project:  {} {}", exists, project.display());

        let database = Self::default_database_path();
        let exists = if database.exists() { "✓" } else { "✗" };
        println!("  Database: {} {}", exists, database.display());
    }

    /// Render the effective configuration
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| PlanError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented default config file
    ///
    /// Returns the path written. An existing file is kept unless `force`.
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                PlanError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };
        Self::init_at(&path, force)?;
        Ok(path)
    }

    fn init_at(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(PlanError::Config(format!(
                "Config already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default_config_template())?;
        info!("Created config: {}", path.display());
        Ok(())
    }

    /// Default config content (TOML)
    fn default_config_template() -> &'static str {
        r#"# bizplan configuration
# Project settings in .bizplan/config.toml override the global file.
# Environment variables override both, e.g. BIZPLAN_PARSER__MODE=strict

version = "1.0"

# Providers are tried in priority order (lower first)
[[providers]]
provider = "claude-code"
priority = 10
timeout_ms = 120000
max_retries = 2

# [[providers]]
# provider = "openai"
# model = "gpt-4o-mini"
# priority = 20

# [[providers]]
# provider = "ollama"
# model = "llama3.1"
# api_base = "http://localhost:11434"
# priority = 30

[chain]
base_delay_ms = 500
max_delay_ms = 30000
max_response_chars = 200000

[generation]
max_tokens = 4096
temperature = 0.7

[parser]
mode = "lenient"
placeholder = "Not specified"

[classification]
budget_multiplier = 3.0

[[classification.risk_thresholds]]
low_below = 10000
high_from = 50000

[[classification.risk_thresholds]]
category = "Tech"
low_below = 5000
high_from = 25000

[[classification.risk_thresholds]]
category = "Food"
low_below = 10000
high_from = 40000

[[classification.risk_thresholds]]
category = "Consulting"
low_below = 15000
high_from = 75000

[storage]
backend = "sqlite"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use crate::plan::ParseMode;
    use tempfile::TempDir;

    #[test]
    fn test_template_matches_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        ConfigLoader::init_at(&path, false).unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        let defaults = Config::default();
        assert_eq!(loaded.providers.len(), 1);
        assert_eq!(loaded.providers[0].priority, 10);
        assert_eq!(
            loaded.classification.risk_thresholds,
            defaults.classification.risk_thresholds
        );
        assert_eq!(loaded.parser.mode, ParseMode::Lenient);
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        ConfigLoader::init_at(&path, false).unwrap();
        assert!(ConfigLoader::init_at(&path, false).is_err());
        assert!(ConfigLoader::init_at(&path, true).is_ok());
    }

    #[test]
    fn test_project_layer_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[parser]\nmode = \"strict\"\n[storage]\nbackend = \"memory\"\n").unwrap();
        fs::write(&project, "[parser]\nmode = \"lenient\"\n").unwrap();

        let config = ConfigLoader::load_layered(Some(&global), &project).unwrap();
        assert_eq!(config.parser.mode, ParseMode::Lenient);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[classification]\nbudget_multiplier = 0.5\n").unwrap();
        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let toml_text = ConfigLoader::render(&config, false).unwrap();
        assert!(toml_text.contains("[parser]"));
        let json_text = ConfigLoader::render(&config, true).unwrap();
        assert!(json_text.contains("\"budget_multiplier\""));
    }
}
