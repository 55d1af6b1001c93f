//! Classification Rules
//!
//! Deterministic rules that settle category, market risk, initial budget, and
//! timeframe when the provider under-specifies them. Every rule is a pure
//! function of the draft, the preferences, and the configured tables.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parser::{BudgetHint, PlanDraft};
use super::rules::{
    HIGH_RISK_WORDS, LOW_RISK_WORDS, MEDIUM_RISK_WORDS, category_from_keywords, normalize_label,
    timeframe_template,
};
use crate::constants::classification;
use crate::types::{
    BudgetRange, Category, Horizon, MarketRisk, Preferences, RequestContext, Timeframe,
};

// =============================================================================
// Risk Thresholds
// =============================================================================

/// One row of the risk table
///
/// A row without a category is the default row. Budget magnitude is the
/// upper budget bound: below `low_below` is Low, at or above `high_from` is
/// High, anything between is Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThreshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub low_below: u64,
    pub high_from: u64,
}

impl RiskThreshold {
    pub fn band(&self, budget_max: u64) -> MarketRisk {
        if budget_max < self.low_below {
            MarketRisk::Low
        } else if budget_max >= self.high_from {
            MarketRisk::High
        } else {
            MarketRisk::Medium
        }
    }

    pub fn default_rows() -> Vec<Self> {
        vec![
            Self {
                category: None,
                low_below: classification::DEFAULT_LOW_BELOW,
                high_from: classification::DEFAULT_HIGH_FROM,
            },
            Self {
                category: Some(Category::Tech),
                low_below: 5_000,
                high_from: 25_000,
            },
            Self {
                category: Some(Category::Food),
                low_below: 10_000,
                high_from: 40_000,
            },
            Self {
                category: Some(Category::Consulting),
                low_below: 15_000,
                high_from: 75_000,
            },
        ]
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Settled values for the enumerated and numeric idea fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub market_risk: MarketRisk,
    pub initial_budget: BudgetRange,
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    budget_multiplier: f64,
    risk_thresholds: Vec<RiskThreshold>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            classification::BUDGET_MULTIPLIER,
            RiskThreshold::default_rows(),
        )
    }
}

impl Classifier {
    /// A multiplier below 1 would invert derived bounds and is raised to 1
    pub fn new(budget_multiplier: f64, risk_thresholds: Vec<RiskThreshold>) -> Self {
        Self {
            budget_multiplier: if budget_multiplier.is_finite() {
                budget_multiplier.max(1.0)
            } else {
                classification::BUDGET_MULTIPLIER
            },
            risk_thresholds,
        }
    }

    pub fn budget_multiplier(&self) -> f64 {
        self.budget_multiplier
    }

    pub fn risk_thresholds(&self) -> &[RiskThreshold] {
        &self.risk_thresholds
    }

    pub fn classify(
        &self,
        draft: &PlanDraft,
        prefs: &Preferences,
        ctx: &RequestContext,
    ) -> Classification {
        let _entered = ctx.span().enter();

        let category = self.category(draft.category.as_deref(), prefs);
        let initial_budget = self.initial_budget(draft.budget, prefs);
        let market_risk = self.market_risk(draft.market_risk.as_deref(), category, initial_budget);
        let timeframe = timeframe(draft, category);

        debug!(
            category = %category,
            market_risk = %market_risk,
            budget = %initial_budget,
            stated_category = ?draft.category,
            stated_risk = ?draft.market_risk,
            "Classified draft"
        );

        Classification {
            category,
            market_risk,
            initial_budget,
            timeframe,
        }
    }

    /// Stated category, else keywords in the statement, else the user's
    /// skills and interests, else Consulting
    pub fn category(&self, stated: Option<&str>, prefs: &Preferences) -> Category {
        if let Some(text) = stated {
            if let Ok(category) = text.parse::<Category>() {
                return category;
            }
            if let Some(category) = category_from_keywords(text) {
                return category;
            }
        }

        let skills = prefs
            .skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        category_from_keywords(&skills)
            .or_else(|| category_from_keywords(&prefs.interests.join(", ")))
            .unwrap_or(Category::Consulting)
    }

    /// Reconcile stated bounds into an ordered range
    pub fn initial_budget(&self, hint: BudgetHint, prefs: &Preferences) -> BudgetRange {
        match (hint.min, hint.max) {
            (Some(a), Some(b)) => BudgetRange::spanning(a, b),
            (Some(min), None) => BudgetRange::spanning(min, scale(min, self.budget_multiplier)),
            (None, Some(max)) => {
                BudgetRange::spanning(scale(max, 1.0 / self.budget_multiplier), max)
            }
            (None, None) => prefs.budget_range,
        }
    }

    /// Stated risk when recognizable, else the threshold band for the budget
    pub fn market_risk(
        &self,
        stated: Option<&str>,
        category: Category,
        budget: BudgetRange,
    ) -> MarketRisk {
        stated
            .and_then(risk_from_text)
            .unwrap_or_else(|| self.threshold_for(category).band(budget.max()))
    }

    fn threshold_for(&self, category: Category) -> RiskThreshold {
        self.risk_thresholds
            .iter()
            .find(|row| row.category == Some(category))
            .or_else(|| self.risk_thresholds.iter().find(|row| row.category.is_none()))
            .copied()
            .unwrap_or(RiskThreshold {
                category: None,
                low_below: classification::DEFAULT_LOW_BELOW,
                high_from: classification::DEFAULT_HIGH_FROM,
            })
    }
}

fn scale(value: u64, factor: f64) -> u64 {
    // `as` saturates on overflow
    (value as f64 * factor).round() as u64
}

/// Match risk wording: exact band names first, then the first band keyword
pub fn risk_from_text(text: &str) -> Option<MarketRisk> {
    let trimmed = text.trim();
    if let Ok(risk) = trimmed.parse::<MarketRisk>() {
        return Some(risk);
    }
    if trimmed.eq_ignore_ascii_case("moderate") {
        return Some(MarketRisk::Medium);
    }

    normalize_label(trimmed).split(' ').find_map(|word| {
        if LOW_RISK_WORDS.contains(&word) {
            Some(MarketRisk::Low)
        } else if MEDIUM_RISK_WORDS.contains(&word) {
            Some(MarketRisk::Medium)
        } else if HIGH_RISK_WORDS.contains(&word) {
            Some(MarketRisk::High)
        } else {
            None
        }
    })
}

/// Parsed horizons, with category templates for the empty ones
pub fn timeframe(draft: &PlanDraft, category: Category) -> Timeframe {
    let horizon = |h: Horizon| {
        draft
            .horizon(h)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| timeframe_template(category, h))
    };

    Timeframe {
        short_term: horizon(Horizon::ShortTerm),
        medium_term: horizon(Horizon::MediumTerm),
        long_term: horizon(Horizon::LongTerm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::parser::{ParseMode, ResponseParser};
    use crate::types::RiskTolerance;
    use proptest::prelude::*;

    fn prefs(skills: &[&str], min: u64, max: u64) -> Preferences {
        Preferences::new(
            skills.iter().copied(),
            BudgetRange::new(min, max).unwrap(),
        )
        .with_risk_tolerance(RiskTolerance::Low)
    }

    fn empty_draft() -> PlanDraft {
        ResponseParser::new(ParseMode::Lenient)
            .parse("", &RequestContext::new())
            .unwrap()
    }

    #[test]
    fn test_category_exact_then_keywords() {
        let classifier = Classifier::default();
        let p = prefs(&["baking"], 500, 2000);

        assert_eq!(classifier.category(Some("food"), &p), Category::Food);
        assert_eq!(classifier.category(Some("Software as a Service"), &p), Category::Tech);
        assert_eq!(classifier.category(Some("Hospitality"), &p), Category::Food);
        assert_eq!(classifier.category(None, &p), Category::Food);
    }

    #[test]
    fn test_category_falls_back_to_consulting() {
        let classifier = Classifier::default();
        let p = prefs(&["juggling"], 0, 100);
        assert_eq!(classifier.category(Some("Miscellaneous"), &p), Category::Consulting);
        assert_eq!(classifier.category(None, &p), Category::Consulting);
    }

    #[test]
    fn test_category_uses_interests_after_skills() {
        let classifier = Classifier::default();
        let p = prefs(&["juggling"], 0, 100).with_interests(["online tutoring"]);
        assert_eq!(classifier.category(None, &p), Category::Education);
    }

    #[test]
    fn test_budget_reconciliation() {
        let classifier = Classifier::default();
        let p = prefs(&[], 500, 2000);

        let both = classifier.initial_budget(
            BudgetHint {
                min: Some(1_000),
                max: Some(4_000),
            },
            &p,
        );
        assert_eq!((both.min(), both.max()), (1_000, 4_000));

        let inverted = classifier.initial_budget(
            BudgetHint {
                min: Some(9_000),
                max: Some(3_000),
            },
            &p,
        );
        assert_eq!((inverted.min(), inverted.max()), (3_000, 9_000));

        let lone_min = classifier.initial_budget(
            BudgetHint {
                min: Some(1_000),
                max: None,
            },
            &p,
        );
        assert_eq!((lone_min.min(), lone_min.max()), (1_000, 3_000));

        let lone_max = classifier.initial_budget(
            BudgetHint {
                min: None,
                max: Some(10_000),
            },
            &p,
        );
        assert_eq!((lone_max.min(), lone_max.max()), (3_333, 10_000));

        let neither = classifier.initial_budget(BudgetHint::default(), &p);
        assert_eq!(neither, p.budget_range);
    }

    #[test]
    fn test_multiplier_below_one_is_raised() {
        let classifier = Classifier::new(0.5, RiskThreshold::default_rows());
        assert_eq!(classifier.budget_multiplier(), 1.0);
    }

    #[test]
    fn test_risk_from_text() {
        assert_eq!(risk_from_text("HIGH"), Some(MarketRisk::High));
        assert_eq!(risk_from_text("moderate"), Some(MarketRisk::Medium));
        assert_eq!(risk_from_text("Minimal, given low overhead"), Some(MarketRisk::Low));
        assert_eq!(risk_from_text("Considerable competition"), Some(MarketRisk::High));
        assert_eq!(risk_from_text("depends on the season"), None);
    }

    #[test]
    fn test_risk_threshold_table() {
        let classifier = Classifier::default();
        let budget = |max| BudgetRange::new(0, max).unwrap();

        assert_eq!(
            classifier.market_risk(None, Category::Food, budget(2_000)),
            MarketRisk::Low
        );
        assert_eq!(
            classifier.market_risk(None, Category::Tech, budget(30_000)),
            MarketRisk::High
        );
        // Retail has no row of its own and uses the default row
        assert_eq!(
            classifier.market_risk(None, Category::Retail, budget(30_000)),
            MarketRisk::Medium
        );
        assert_eq!(
            classifier.market_risk(None, Category::Retail, budget(50_000)),
            MarketRisk::High
        );
        // A stated risk wins over the table
        assert_eq!(
            classifier.market_risk(Some("Low"), Category::Tech, budget(90_000)),
            MarketRisk::Low
        );
    }

    #[test]
    fn test_missing_default_row_uses_constants() {
        let classifier = Classifier::new(3.0, Vec::new());
        assert_eq!(
            classifier.market_risk(None, Category::Retail, BudgetRange::new(0, 9_999).unwrap()),
            MarketRisk::Low
        );
    }

    #[test]
    fn test_timeframe_templates_fill_gaps() {
        let mut draft = empty_draft();
        draft.horizons[0] = Some("Secure permits".to_string());
        draft.horizons[2] = Some("   ".to_string());

        let tf = timeframe(&draft, Category::Food);
        assert_eq!(tf.short_term, "Secure permits");
        assert_eq!(tf.medium_term, timeframe_template(Category::Food, Horizon::MediumTerm));
        assert_eq!(tf.long_term, timeframe_template(Category::Food, Horizon::LongTerm));
        assert!(tf.validate().is_ok());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = Classifier::default();
        let p = prefs(&["baking"], 500, 2000);
        let mut draft = empty_draft();
        draft.category = Some("Food".to_string());

        let ctx = RequestContext::new();
        let first = classifier.classify(&draft, &p, &ctx);
        let second = classifier.classify(&draft, &p, &ctx);
        assert_eq!(first, second);
        assert_eq!(first.category, Category::Food);
        assert_eq!(first.market_risk, MarketRisk::Low);
        assert_eq!(first.initial_budget, p.budget_range);
    }

    proptest! {
        #[test]
        fn prop_budget_is_ordered(
            min in proptest::option::of(0u64..10_000_000_000),
            max in proptest::option::of(0u64..10_000_000_000),
            multiplier in 0.0f64..10.0,
        ) {
            let classifier = Classifier::new(multiplier, RiskThreshold::default_rows());
            let p = prefs(&[], 100, 200);
            let budget = classifier.initial_budget(BudgetHint { min, max }, &p);
            prop_assert!(budget.min() <= budget.max());
            if let (Some(a), Some(b)) = (min, max) {
                prop_assert_eq!(budget.min(), a.min(b));
                prop_assert_eq!(budget.max(), a.max(b));
            }
        }

        #[test]
        fn prop_enums_are_closed(category in ".{0,40}", risk in ".{0,40}", max in 0u64..1_000_000) {
            let classifier = Classifier::default();
            let p = prefs(&["baking"], 0, 100);
            let c = classifier.category(Some(category.as_str()), &p);
            prop_assert!(Category::ALL.contains(&c));
            let r = classifier.market_risk(Some(risk.as_str()), c, BudgetRange::new(0, max).unwrap());
            prop_assert!(MarketRisk::ALL.contains(&r));
        }
    }
}
