//! Generate Command
//!
//! Usage:
//!   bizplan generate --skill baking --budget-min 500 --budget-max 2000
//!                    [--risk low] [--interest food]... [--strict] [--save]
//!                    [--format text|json|yaml]

use std::path::PathBuf;

use tracing::info;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, serialize_as};
use crate::plan::{GenerationPipeline, ParseMode};
use crate::storage::open_store;
use crate::types::{BudgetRange, PlanError, Preferences, Result, RiskTolerance};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub skills: Vec<String>,
    pub budget_min: u64,
    pub budget_max: u64,
    pub risk: RiskTolerance,
    pub interests: Vec<String>,
    /// Force strict parsing regardless of configuration
    pub strict: bool,
    /// Persist the idea to the configured store
    pub save: bool,
    pub format: OutputFormat,
    pub config_path: Option<PathBuf>,
}

impl GenerateOptions {
    pub fn preferences(&self) -> Result<Preferences> {
        let budget = BudgetRange::new(self.budget_min, self.budget_max)
            .map_err(|e| PlanError::Config(format!("Invalid budget range: {}", e)))?;

        let skills = self
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let interests = self
            .interests
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Preferences::new(skills, budget)
            .with_risk_tolerance(self.risk)
            .with_interests(interests))
    }
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    if options.format == OutputFormat::Toml {
        return Err(PlanError::Config(
            "generate supports text, json or yaml output".to_string(),
        ));
    }

    let prefs = options.preferences()?;
    let mut config = CommandContext::load_config(options.config_path.as_deref())?;
    if options.strict {
        config.parser.mode = ParseMode::Strict;
    }

    let pipeline = GenerationPipeline::from_config(&config)?;
    info!(
        "Generating business idea ({} providers, {} parsing)",
        pipeline.chain().providers().len(),
        pipeline.parser().mode()
    );

    let idea = pipeline.generate_business_idea(&prefs).await?;

    let output = Output::new();
    match serialize_as(&idea, options.format)? {
        Some(rendered) => println!("{}", rendered),
        None => output.idea(&idea),
    }

    if options.save {
        let store = open_store(&config.storage)?;
        let stored = store.save(&idea).await?;
        let message = format!("Saved idea {} ({})", stored.idea.id(), store.backend());
        if options.format == OutputFormat::Text {
            output.success(&message);
        } else {
            info!("{}", message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> GenerateOptions {
        GenerateOptions {
            skills: vec![" baking ".to_string(), "".to_string()],
            budget_min: 500,
            budget_max: 2000,
            risk: RiskTolerance::Low,
            interests: vec!["food".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_preferences_from_options() {
        let prefs = options().preferences().unwrap();
        assert_eq!(prefs.skills.len(), 1);
        assert!(prefs.skills.contains("baking"));
        assert_eq!(prefs.budget_range.min(), 500);
        assert_eq!(prefs.risk_tolerance, RiskTolerance::Low);
        assert_eq!(prefs.interests, vec!["food".to_string()]);
    }

    #[test]
    fn test_inverted_budget_rejected() {
        let opts = GenerateOptions {
            budget_min: 5000,
            budget_max: 100,
            ..options()
        };
        let err = opts.preferences().unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }

    #[tokio::test]
    async fn test_toml_output_rejected() {
        let opts = GenerateOptions {
            format: OutputFormat::Toml,
            ..options()
        };
        assert!(run(opts).await.is_err());
    }
}
