//! Generation Pipeline
//!
//! Public entry point: preferences in, validated [`BusinessIdea`] out.
//!
//! ```text
//! BuildingPrompt → AwaitingProvider → Parsing → Classifying → Validating → Done
//!        └──────────────┴──────────────┴────────────┴────────────┴──→ Failed
//! ```
//!
//! Stages only move forward. The pipeline never persists what it produces.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::classify::{Classification, Classifier};
use super::parser::{PlanDraft, ResponseParser};
use super::prompt::business_plan_prompt;
use crate::ai::ProviderChain;
use crate::config::Config;
use crate::types::{
    BusinessIdea, Category, GenerationFailure, IdeaId, IdeaParts, Preferences, RequestContext,
    Result,
};

// =============================================================================
// Stages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    BuildingPrompt,
    AwaitingProvider,
    Parsing,
    Classifying,
    Validating,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuildingPrompt => "building_prompt",
            Self::AwaitingProvider => "awaiting_provider",
            Self::Parsing => "parsing",
            Self::Classifying => "classifying",
            Self::Validating => "validating",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Forward-only stage record for one request
#[derive(Debug)]
pub struct StageTracker {
    current: PipelineStage,
    history: Vec<PipelineStage>,
    started: Instant,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: PipelineStage::BuildingPrompt,
            history: vec![PipelineStage::BuildingPrompt],
            started: Instant::now(),
        }
    }

    pub fn current(&self) -> PipelineStage {
        self.current
    }

    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Move to `next`; backward or post-terminal moves are ignored
    pub fn advance(&mut self, next: PipelineStage) -> bool {
        if self.current.is_terminal() || next <= self.current {
            warn!(from = %self.current, to = %next, "Ignoring stage transition");
            return false;
        }
        debug!(
            from = %self.current,
            to = %next,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Pipeline stage"
        );
        self.current = next;
        self.history.push(next);
        true
    }

    /// Move straight to `Failed`, recording the stage the error came from
    pub fn fail(&mut self, failure: &GenerationFailure) {
        warn!(
            at = %failure.stage(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            error = %failure,
            "Generation failed"
        );
        if !self.current.is_terminal() {
            self.current = PipelineStage::Failed;
            self.history.push(PipelineStage::Failed);
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Drives orchestration, parsing, classification, and validation
#[derive(Clone)]
pub struct GenerationPipeline {
    chain: ProviderChain,
    parser: ResponseParser,
    classifier: Classifier,
}

impl GenerationPipeline {
    pub fn new(chain: ProviderChain, parser: ResponseParser, classifier: Classifier) -> Self {
        Self {
            chain,
            parser,
            classifier,
        }
    }

    /// Build the pipeline described by a configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let chain = ProviderChain::from_configs(
            &config.providers,
            config.chain_config(),
            &config.generation_options(),
        )?;
        let parser =
            ResponseParser::new(config.parser.mode).with_placeholder(&config.parser.placeholder);
        let classifier = Classifier::new(
            config.classification.budget_multiplier,
            config.classification.risk_thresholds.clone(),
        );
        Ok(Self::new(chain, parser, classifier))
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn parser(&self) -> &ResponseParser {
        &self.parser
    }

    /// Generate one business idea from preferences
    pub async fn generate_business_idea(
        &self,
        prefs: &Preferences,
    ) -> std::result::Result<BusinessIdea, GenerationFailure> {
        let ctx = RequestContext::for_preferences(prefs);
        self.generate_with_context(prefs, &ctx).await
    }

    /// Generate with a caller-supplied logging context
    pub async fn generate_with_context(
        &self,
        prefs: &Preferences,
        ctx: &RequestContext,
    ) -> std::result::Result<BusinessIdea, GenerationFailure> {
        let mut tracker = StageTracker::new();
        let result = self.run(prefs, ctx, &mut tracker).await;

        if let Err(failure) = &result {
            let _entered = ctx.span().enter();
            tracker.fail(failure);
        }
        result
    }

    async fn run(
        &self,
        prefs: &Preferences,
        ctx: &RequestContext,
        tracker: &mut StageTracker,
    ) -> std::result::Result<BusinessIdea, GenerationFailure> {
        let prompt = business_plan_prompt(prefs);

        {
            let _entered = ctx.span().enter();
            tracker.advance(PipelineStage::AwaitingProvider);
        }
        let outcome = self.chain.generate_with_fallback(&prompt, ctx).await?;

        let _entered = ctx.span().enter();
        info!(
            provider = %outcome.provider,
            attempts = outcome.stats.total_attempts(),
            chars = outcome.text.len(),
            "Provider answered"
        );

        tracker.advance(PipelineStage::Parsing);
        let draft = self.parser.parse(&outcome.text, ctx)?;

        tracker.advance(PipelineStage::Classifying);
        let classification = self.classifier.classify(&draft, prefs, ctx);

        tracker.advance(PipelineStage::Validating);
        let idea = BusinessIdea::new(IdeaId::generate(), assemble(draft, classification, prefs))?;

        tracker.advance(PipelineStage::Done);
        info!(
            id = %idea.id(),
            title = idea.title(),
            category = %idea.category(),
            market_risk = %idea.market_risk(),
            "Generated business idea"
        );
        Ok(idea)
    }
}

/// Merge draft text with classified values, filling absent prose
fn assemble(draft: PlanDraft, classification: Classification, prefs: &Preferences) -> IdeaParts {
    let Classification {
        category,
        market_risk,
        initial_budget,
        timeframe,
    } = classification;

    let title = draft
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| fallback_title(category, prefs));
    let description = draft
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| fallback_description(category, prefs));
    let skills: BTreeSet<String> = if draft.skills.is_empty() {
        prefs.skills.clone()
    } else {
        draft.skills
    };

    IdeaParts {
        title,
        category,
        description,
        skills,
        initial_budget,
        market_risk,
        timeframe,
        plan: draft.plan,
    }
}

fn fallback_title(category: Category, prefs: &Preferences) -> String {
    let focus = prefs
        .interests
        .first()
        .or_else(|| prefs.skills.first())
        .map(|focus| focus.trim())
        .filter(|focus| !focus.is_empty() && !focus.eq_ignore_ascii_case(category.as_str()));
    match focus {
        Some(focus) => format!("{} {} Venture", capitalize(focus), category),
        None => format!("{} Venture", category),
    }
}

fn fallback_description(category: Category, prefs: &Preferences) -> String {
    let skills = prefs
        .skills
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if skills.is_empty() {
        format!("A {} business.", category.as_str().to_lowercase())
    } else {
        format!(
            "A {} business built on {}.",
            category.as_str().to_lowercase(),
            skills
        )
    }
}

fn capitalize(text: &str) -> String {
    let text = text.trim();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::ai::ChainConfig;
    use crate::ai::provider::testing::{RecordingSleeper, ScriptedProvider, chain_of};
    use crate::plan::parser::ParseMode;
    use crate::types::{
        BudgetRange, MarketRisk, ProviderError, ProviderResult, RiskTolerance, SectionKey,
    };

    const BAKERY_PLAN: &str = "\
# Sweet Crumbs Home Bakery

A home bakery selling sourdough and pastries at weekend markets.

Category: Food
Initial Budget: $800 - $1,800
Skills: baking, food safety

## Executive Summary
Sweet Crumbs bakes small-batch bread for the neighborhood.

## Company Description
A sole proprietorship operating under cottage food laws.

## Market Analysis
Local families want fresh bread without supermarket markups.

## Organization and Management
Owner-operated.

## Service or Product Line
Sourdough, cinnamon rolls, and seasonal pies.

## Marketing and Sales
Farmers market stall and pre-orders through social media.

## Funding Request
Self-funded from savings.

## Financial Projections
Break-even in month four at sixty loaves a week.

## Appendix
Cottage food permit.

## Timeframe
- Short term: permits and recipe testing
- Medium term: two weekly market stalls
- Long term: small storefront
";

    fn bakery_prefs() -> Preferences {
        Preferences::new(["baking"], BudgetRange::new(500, 2000).unwrap())
            .with_risk_tolerance(RiskTolerance::Low)
            .with_interests(["food"])
    }

    fn config() -> ChainConfig {
        ChainConfig {
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            max_response_chars: 20_000,
        }
    }

    fn pipeline(script: Vec<ProviderResult<String>>, mode: ParseMode) -> GenerationPipeline {
        let provider = ScriptedProvider::new("stub", script);
        let chain = chain_of(&[(provider, 1)], config(), Arc::new(RecordingSleeper::default()));
        GenerationPipeline::new(chain, ResponseParser::new(mode), Classifier::default())
    }

    #[tokio::test]
    async fn test_end_to_end_bakery() {
        let pipeline = pipeline(vec![Ok(BAKERY_PLAN.to_string())], ParseMode::Lenient);
        let prefs = bakery_prefs();

        let idea = pipeline.generate_business_idea(&prefs).await.unwrap();

        assert_eq!(idea.category(), Category::Food);
        assert_eq!(idea.market_risk(), MarketRisk::Low);
        let budget = idea.initial_budget();
        assert!(prefs.budget_range.contains(budget.min()));
        assert!(prefs.budget_range.contains(budget.max()));
        assert_eq!(idea.title(), "Sweet Crumbs Home Bakery");
        assert_eq!(idea.plan().sections().count(), 9);
        assert!(idea.plan().sections().all(|(_, s)| !s.is_blank()));
        assert_eq!(idea.timeframe().long_term, "small storefront");
    }

    #[tokio::test]
    async fn test_ids_are_unique_per_call() {
        let pipeline = pipeline(
            vec![Ok(BAKERY_PLAN.to_string()), Ok(BAKERY_PLAN.to_string())],
            ParseMode::Lenient,
        );
        let prefs = bakery_prefs();
        let first = pipeline.generate_business_idea(&prefs).await.unwrap();
        let second = pipeline.generate_business_idea(&prefs).await.unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_strict_mode_surfaces_parse_failure() {
        let raw = BAKERY_PLAN.replace("## Funding Request\nSelf-funded from savings.\n", "");
        let pipeline = pipeline(vec![Ok(raw)], ParseMode::Strict);

        let failure = pipeline
            .generate_business_idea(&bakery_prefs())
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), PipelineStage::Parsing);
        match failure {
            GenerationFailure::Parse(parse) => {
                assert_eq!(parse.missing_fields, vec![SectionKey::FundingRequest.field_name()])
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_providers_surface_orchestration_failure() {
        let pipeline = pipeline(
            vec![Err(ProviderError::unavailable("down"))],
            ParseMode::Lenient,
        );

        let failure = pipeline
            .generate_business_idea(&bakery_prefs())
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), PipelineStage::AwaitingProvider);
        match failure {
            GenerationFailure::Orchestration(orchestration) => {
                assert_eq!(orchestration.attempted_providers, vec!["stub"]);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sparse_answer_uses_fallbacks() {
        let pipeline = pipeline(
            vec![Ok("## Executive Summary\nWe bake bread.".to_string())],
            ParseMode::Lenient,
        );
        let prefs = bakery_prefs();

        let idea = pipeline.generate_business_idea(&prefs).await.unwrap();

        assert_eq!(idea.category(), Category::Food);
        assert_eq!(idea.initial_budget(), prefs.budget_range);
        assert_eq!(idea.title(), "Food Venture");
        assert_eq!(idea.description(), "We bake bread.");
        assert_eq!(idea.skills(), &prefs.skills);
        assert_eq!(idea.plan().appendix.content, "Not specified");
        assert!(idea.timeframe().validate().is_ok());
    }

    #[test]
    fn test_stage_tracker_is_forward_only() {
        let mut tracker = StageTracker::new();
        assert!(tracker.advance(PipelineStage::AwaitingProvider));
        assert!(tracker.advance(PipelineStage::Parsing));
        assert!(!tracker.advance(PipelineStage::AwaitingProvider));
        assert!(tracker.advance(PipelineStage::Done));
        assert!(!tracker.advance(PipelineStage::Failed));
        assert_eq!(
            tracker.history(),
            &[
                PipelineStage::BuildingPrompt,
                PipelineStage::AwaitingProvider,
                PipelineStage::Parsing,
                PipelineStage::Done,
            ]
        );
    }

    #[test]
    fn test_fallback_title_and_description() {
        let prefs = Preferences::new(["graphic design"], BudgetRange::new(0, 100).unwrap());
        assert_eq!(
            fallback_title(Category::Creative, &prefs),
            "Graphic design Creative Venture"
        );

        let prefs = Preferences::new(["baking"], BudgetRange::new(0, 100).unwrap())
            .with_interests(["FOOD"]);
        assert_eq!(fallback_title(Category::Food, &prefs), "Food Venture");
        assert_eq!(
            fallback_description(Category::Creative, &prefs),
            "A creative business built on graphic design."
        );
    }
}
