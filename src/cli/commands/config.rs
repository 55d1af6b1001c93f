//! Config Command
//!
//! Manage bizplan configuration.
//!
//! Usage:
//!   bizplan config show [-f json]
//!   bizplan config path
//!   bizplan config init [-g] [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::config::ConfigLoader;
use crate::types::{PlanError, Result};

/// Show the effective (merged) configuration
pub fn show(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let as_json = match format {
        OutputFormat::Toml | OutputFormat::Text => false,
        OutputFormat::Json => true,
        OutputFormat::Yaml => {
            return Err(PlanError::Config(
                "config show supports toml or json output".to_string(),
            ));
        }
    };

    let config = CommandContext::load_config(config_path)?;
    println!("{}", ConfigLoader::render(&config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = ConfigLoader::init(global, force)?;
    let scope = if global { "global" } else { "project" };
    Output::new().success(&format!("Initialized {} configuration", scope));
    println!("  Config: {}", path.display());
    Ok(())
}
