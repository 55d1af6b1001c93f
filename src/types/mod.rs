pub mod context;
pub mod error;
pub mod idea;
pub mod preferences;

pub use context::RequestContext;
pub use error::{
    ErrorClassifier, GenerationFailure, OrchestrationFailure, ParseFailure, PlanError,
    ProviderError, ProviderErrorKind, ProviderResult, Result, ResultExt, SchemaViolation,
};
pub use idea::{
    BudgetRange, BusinessIdea, BusinessPlan, Category, Horizon, IdeaId, IdeaParts, MarketRisk,
    SbaSection, SectionKey, Timeframe,
};
pub use preferences::{Preferences, RiskTolerance};
