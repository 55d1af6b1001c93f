//! Business Plan Generation
//!
//! From user preferences to a validated [`BusinessIdea`](crate::types::BusinessIdea):
//!
//! - `prompt`: Fixed prompt template requesting the nine SBA sections
//! - `json` / `parser`: Raw provider text → [`PlanDraft`]
//! - `rules` / `classify`: Category, risk, budget, and timeframe rules
//! - `pipeline`: Stage-tracked orchestration of all of the above

mod classify;
mod json;
mod parser;
mod pipeline;
mod prompt;
mod rules;

pub use classify::{Classification, Classifier, RiskThreshold, risk_from_text, timeframe};
pub use json::extract_object;
pub use parser::{BudgetHint, ParseMode, PlanDraft, ResponseParser, parse_budget};
pub use pipeline::{GenerationPipeline, PipelineStage, StageTracker};
pub use prompt::business_plan_prompt;
pub use rules::{LabelTarget, category_from_keywords, match_label, normalize_label, timeframe_template};
