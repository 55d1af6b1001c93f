//! Business Idea Schema
//!
//! Closed, fixed-arity shapes produced by the generation pipeline:
//! - `BusinessPlan` always carries exactly the nine SBA sections
//! - `Category` and `MarketRisk` are closed enumerations
//! - `BudgetRange` keeps `min <= max` from construction onwards
//!
//! `BusinessIdea` re-checks every invariant when it is built and when it is
//! deserialized, so an instance that exists is an instance that conforms.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SchemaViolation;

// =============================================================================
// Plan Sections
// =============================================================================

/// The nine SBA business-plan components, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    ExecutiveSummary,
    CompanyDescription,
    MarketAnalysis,
    OrganizationAndManagement,
    ServiceOrProductLine,
    MarketingAndSales,
    FundingRequest,
    FinancialProjections,
    Appendix,
}

impl SectionKey {
    pub const ALL: [SectionKey; 9] = [
        SectionKey::ExecutiveSummary,
        SectionKey::CompanyDescription,
        SectionKey::MarketAnalysis,
        SectionKey::OrganizationAndManagement,
        SectionKey::ServiceOrProductLine,
        SectionKey::MarketingAndSales,
        SectionKey::FundingRequest,
        SectionKey::FinancialProjections,
        SectionKey::Appendix,
    ];

    /// Field name as it appears in serialized plans (`fundingRequest`)
    pub fn field_name(self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "executiveSummary",
            Self::CompanyDescription => "companyDescription",
            Self::MarketAnalysis => "marketAnalysis",
            Self::OrganizationAndManagement => "organizationAndManagement",
            Self::ServiceOrProductLine => "serviceOrProductLine",
            Self::MarketingAndSales => "marketingAndSales",
            Self::FundingRequest => "fundingRequest",
            Self::FinancialProjections => "financialProjections",
            Self::Appendix => "appendix",
        }
    }

    /// Canonical human-readable section title
    pub fn title(self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "Executive Summary",
            Self::CompanyDescription => "Company Description",
            Self::MarketAnalysis => "Market Analysis",
            Self::OrganizationAndManagement => "Organization and Management",
            Self::ServiceOrProductLine => "Service or Product Line",
            Self::MarketingAndSales => "Marketing and Sales",
            Self::FundingRequest => "Funding Request",
            Self::FinancialProjections => "Financial Projections",
            Self::Appendix => "Appendix",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One titled section of a business plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SbaSection {
    pub title: String,
    pub content: String,
}

impl SbaSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Section carrying the canonical title for `key`
    pub fn canonical(key: SectionKey, content: impl Into<String>) -> Self {
        Self::new(key.title(), content)
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A complete nine-section SBA business plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPlan {
    pub executive_summary: SbaSection,
    pub company_description: SbaSection,
    pub market_analysis: SbaSection,
    pub organization_and_management: SbaSection,
    pub service_or_product_line: SbaSection,
    pub marketing_and_sales: SbaSection,
    pub funding_request: SbaSection,
    pub financial_projections: SbaSection,
    pub appendix: SbaSection,
}

impl BusinessPlan {
    /// Build a plan by producing each section from its key, in canonical order
    pub fn from_fn(mut section: impl FnMut(SectionKey) -> SbaSection) -> Self {
        Self {
            executive_summary: section(SectionKey::ExecutiveSummary),
            company_description: section(SectionKey::CompanyDescription),
            market_analysis: section(SectionKey::MarketAnalysis),
            organization_and_management: section(SectionKey::OrganizationAndManagement),
            service_or_product_line: section(SectionKey::ServiceOrProductLine),
            marketing_and_sales: section(SectionKey::MarketingAndSales),
            funding_request: section(SectionKey::FundingRequest),
            financial_projections: section(SectionKey::FinancialProjections),
            appendix: section(SectionKey::Appendix),
        }
    }

    pub fn section(&self, key: SectionKey) -> &SbaSection {
        match key {
            SectionKey::ExecutiveSummary => &self.executive_summary,
            SectionKey::CompanyDescription => &self.company_description,
            SectionKey::MarketAnalysis => &self.market_analysis,
            SectionKey::OrganizationAndManagement => &self.organization_and_management,
            SectionKey::ServiceOrProductLine => &self.service_or_product_line,
            SectionKey::MarketingAndSales => &self.marketing_and_sales,
            SectionKey::FundingRequest => &self.funding_request,
            SectionKey::FinancialProjections => &self.financial_projections,
            SectionKey::Appendix => &self.appendix,
        }
    }

    /// Iterate sections in canonical order
    pub fn sections(&self) -> impl Iterator<Item = (SectionKey, &SbaSection)> {
        SectionKey::ALL.into_iter().map(|key| (key, self.section(key)))
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        for (key, section) in self.sections() {
            if section.title.trim().is_empty() {
                return Err(SchemaViolation::new(
                    format!("plan.{}.title", key.field_name()),
                    "section title is empty",
                ));
            }
            if section.is_blank() {
                return Err(SchemaViolation::new(
                    format!("plan.{}.content", key.field_name()),
                    "section content is empty",
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Timeframe
// =============================================================================

/// Planning horizon of a `Timeframe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::ShortTerm, Horizon::MediumTerm, Horizon::LongTerm];

    pub fn field_name(self) -> &'static str {
        match self {
            Self::ShortTerm => "shortTerm",
            Self::MediumTerm => "mediumTerm",
            Self::LongTerm => "longTerm",
        }
    }

    /// Calendar span the horizon covers
    pub fn span(self) -> &'static str {
        match self {
            Self::ShortTerm => "1-3 months",
            Self::MediumTerm => "3-12 months",
            Self::LongTerm => "1-3 years",
        }
    }
}

/// Milestones across the three planning horizons (free text)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeframe {
    pub short_term: String,
    pub medium_term: String,
    pub long_term: String,
}

impl Timeframe {
    pub fn get(&self, horizon: Horizon) -> &str {
        match horizon {
            Horizon::ShortTerm => &self.short_term,
            Horizon::MediumTerm => &self.medium_term,
            Horizon::LongTerm => &self.long_term,
        }
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        for horizon in Horizon::ALL {
            if self.get(horizon).trim().is_empty() {
                return Err(SchemaViolation::new(
                    format!("timeframe.{}", horizon.field_name()),
                    "horizon is empty",
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Closed Enumerations
// =============================================================================

/// Business category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Tech,
    Retail,
    Service,
    Food,
    Creative,
    Education,
    Consulting,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Tech,
        Category::Retail,
        Category::Service,
        Category::Food,
        Category::Creative,
        Category::Education,
        Category::Consulting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tech => "Tech",
            Self::Retail => "Retail",
            Self::Service => "Service",
            Self::Food => "Food",
            Self::Creative => "Creative",
            Self::Education => "Education",
            Self::Consulting => "Consulting",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Exact, case-insensitive match on the enumeration names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                format!(
                    "Unknown category: {}. Valid values: Tech, Retail, Service, Food, Creative, Education, Consulting",
                    s
                )
            })
    }
}

/// Market risk band (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketRisk {
    Low,
    Medium,
    High,
}

impl MarketRisk {
    pub const ALL: [MarketRisk; 3] = [MarketRisk::Low, MarketRisk::Medium, MarketRisk::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for MarketRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketRisk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown market risk: {}. Valid values: Low, Medium, High", s))
    }
}

// =============================================================================
// Budget
// =============================================================================

/// Inclusive budget range in whole currency units, `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBudgetRange")]
pub struct BudgetRange {
    min: u64,
    max: u64,
}

#[derive(Deserialize)]
struct RawBudgetRange {
    min: u64,
    max: u64,
}

impl TryFrom<RawBudgetRange> for BudgetRange {
    type Error = SchemaViolation;

    fn try_from(raw: RawBudgetRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl BudgetRange {
    /// Range with the given bounds; inverted bounds are rejected
    pub fn new(min: u64, max: u64) -> Result<Self, SchemaViolation> {
        if min > max {
            return Err(SchemaViolation::new(
                "initialBudget",
                format!("min ({}) exceeds max ({})", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    /// Range spanning both values, whichever order they arrive in
    pub fn spanning(a: u64, b: u64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} - ${}", self.min, self.max)
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// Opaque identifier assigned by the pipeline, never by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IdeaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdeaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for IdeaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Aggregate Root
// =============================================================================

/// Everything needed to assemble a `BusinessIdea` except its identifier
#[derive(Debug, Clone)]
pub struct IdeaParts {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub skills: BTreeSet<String>,
    pub initial_budget: BudgetRange,
    pub market_risk: MarketRisk,
    pub timeframe: Timeframe,
    pub plan: BusinessPlan,
}

/// A validated, immutable business idea with its full plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "IdeaRecord")]
pub struct BusinessIdea {
    id: IdeaId,
    title: String,
    category: Category,
    description: String,
    skills: BTreeSet<String>,
    initial_budget: BudgetRange,
    market_risk: MarketRisk,
    timeframe: Timeframe,
    plan: BusinessPlan,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdeaRecord {
    id: IdeaId,
    title: String,
    category: Category,
    description: String,
    #[serde(default)]
    skills: BTreeSet<String>,
    initial_budget: BudgetRange,
    market_risk: MarketRisk,
    timeframe: Timeframe,
    plan: BusinessPlan,
}

impl TryFrom<IdeaRecord> for BusinessIdea {
    type Error = SchemaViolation;

    fn try_from(record: IdeaRecord) -> Result<Self, Self::Error> {
        let parts = IdeaParts {
            title: record.title,
            category: record.category,
            description: record.description,
            skills: record.skills,
            initial_budget: record.initial_budget,
            market_risk: record.market_risk,
            timeframe: record.timeframe,
            plan: record.plan,
        };
        Self::new(record.id, parts)
    }
}

impl BusinessIdea {
    /// Assemble and validate an idea
    ///
    /// Skills are trimmed and blank entries dropped before validation.
    pub fn new(id: IdeaId, parts: IdeaParts) -> Result<Self, SchemaViolation> {
        let skills = parts
            .skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let idea = Self {
            id,
            title: parts.title.trim().to_string(),
            category: parts.category,
            description: parts.description.trim().to_string(),
            skills,
            initial_budget: parts.initial_budget,
            market_risk: parts.market_risk,
            timeframe: parts.timeframe,
            plan: parts.plan,
        };
        idea.validate()?;
        Ok(idea)
    }

    /// Re-check every structural invariant
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.id.as_str().trim().is_empty() {
            return Err(SchemaViolation::new("id", "identifier is empty"));
        }
        if self.title.is_empty() {
            return Err(SchemaViolation::new("title", "title is empty"));
        }
        if self.description.is_empty() {
            return Err(SchemaViolation::new("description", "description is empty"));
        }
        if self.initial_budget.min() > self.initial_budget.max() {
            return Err(SchemaViolation::new("initialBudget", "min exceeds max"));
        }
        self.timeframe.validate()?;
        self.plan.validate()
    }

    pub fn id(&self) -> &IdeaId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn initial_budget(&self) -> BudgetRange {
        self.initial_budget
    }

    pub fn market_risk(&self) -> MarketRisk {
        self.market_risk
    }

    pub fn timeframe(&self) -> &Timeframe {
        &self.timeframe
    }

    pub fn plan(&self) -> &BusinessPlan {
        &self.plan
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn sample_parts() -> IdeaParts {
        IdeaParts {
            title: "Neighborhood Bakery".to_string(),
            category: Category::Food,
            description: "Small-batch sourdough sold at weekend markets".to_string(),
            skills: ["baking".to_string()].into_iter().collect(),
            initial_budget: BudgetRange::new(500, 2000).unwrap(),
            market_risk: MarketRisk::Low,
            timeframe: Timeframe {
                short_term: "Secure a cottage food permit".to_string(),
                medium_term: "Two weekly market stalls".to_string(),
                long_term: "Open a storefront".to_string(),
            },
            plan: BusinessPlan::from_fn(|key| SbaSection::canonical(key, "Details")),
        }
    }

    pub(crate) fn sample_idea(id: &str) -> BusinessIdea {
        BusinessIdea::new(IdeaId::from(id), sample_parts()).unwrap()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_parts() -> IdeaParts {
        fixtures::sample_parts()
    }

    #[test]
    fn test_section_key_names() {
        assert_eq!(SectionKey::FundingRequest.field_name(), "fundingRequest");
        assert_eq!(SectionKey::FundingRequest.title(), "Funding Request");
        assert_eq!(SectionKey::ALL.len(), 9);
    }

    #[test]
    fn test_plan_from_fn_is_canonical_order() {
        let plan = BusinessPlan::from_fn(|key| SbaSection::canonical(key, key.field_name()));
        let keys: Vec<_> = plan.sections().map(|(k, _)| k).collect();
        assert_eq!(keys, SectionKey::ALL.to_vec());
        assert_eq!(plan.appendix.content, "appendix");
    }

    #[test]
    fn test_plan_rejects_blank_section() {
        let plan = BusinessPlan::from_fn(|key| {
            let content = if key == SectionKey::MarketAnalysis { "  " } else { "x" };
            SbaSection::canonical(key, content)
        });
        let err = plan.validate().unwrap_err();
        assert_eq!(err.field, "plan.marketAnalysis.content");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" TECH ".parse::<Category>().unwrap(), Category::Tech);
        assert!("bakery".parse::<Category>().is_err());
    }

    #[test]
    fn test_market_risk_from_str() {
        assert_eq!("high".parse::<MarketRisk>().unwrap(), MarketRisk::High);
        assert!("moderate".parse::<MarketRisk>().is_err());
    }

    #[test]
    fn test_budget_range_ordering() {
        assert!(BudgetRange::new(10, 5).is_err());
        let spanning = BudgetRange::spanning(10, 5);
        assert_eq!((spanning.min(), spanning.max()), (5, 10));
        assert!(spanning.contains(7));
    }

    #[test]
    fn test_budget_range_deserialize_rejects_inverted() {
        let ok: BudgetRange = serde_json::from_str(r#"{"min":1,"max":2}"#).unwrap();
        assert_eq!(ok.max(), 2);
        assert!(serde_json::from_str::<BudgetRange>(r#"{"min":3,"max":2}"#).is_err());
    }

    #[test]
    fn test_idea_trims_skills() {
        let mut parts = sample_parts();
        parts.skills.insert("  ".to_string());
        parts.skills.insert(" pastry ".to_string());
        let idea = BusinessIdea::new(IdeaId::generate(), parts).unwrap();
        assert_eq!(idea.skills().len(), 2);
        assert!(idea.skills().contains("pastry"));
    }

    #[test]
    fn test_idea_rejects_empty_title() {
        let mut parts = sample_parts();
        parts.title = "   ".to_string();
        let err = BusinessIdea::new(IdeaId::generate(), parts).unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[test]
    fn test_idea_serde_shape() {
        let idea = BusinessIdea::new(IdeaId::from("abc"), sample_parts()).unwrap();
        let json = serde_json::to_value(&idea).unwrap();
        assert_eq!(json["category"], "Food");
        assert_eq!(json["marketRisk"], "Low");
        assert_eq!(json["initialBudget"]["min"], 500);
        assert_eq!(json["plan"]["fundingRequest"]["title"], "Funding Request");
        assert_eq!(json["timeframe"]["shortTerm"], "Secure a cottage food permit");

        let back: BusinessIdea = serde_json::from_value(json).unwrap();
        assert_eq!(back, idea);
    }

    #[test]
    fn test_idea_deserialize_rejects_blank_section() {
        let idea = BusinessIdea::new(IdeaId::from("abc"), sample_parts()).unwrap();
        let mut json = serde_json::to_value(&idea).unwrap();
        json["plan"]["appendix"]["content"] = serde_json::json!("");
        assert!(serde_json::from_value::<BusinessIdea>(json).is_err());
    }
}
