//! Rule Tables
//!
//! Label matching, category keywords, and timeframe templates, kept as data
//! so parsing and classification stay free of scattered conditionals.
//!
//! Phrases are matched on word boundaries against normalized text (see
//! [`normalize_label`]). Rule order matters: the first matching rule wins, so
//! more specific phrases sit above the generic ones that would shadow them.

use crate::types::{Category, Horizon, SectionKey};

/// What a labelled segment of provider output feeds into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelTarget {
    Section(SectionKey),
    Title,
    Description,
    Category,
    MarketRisk,
    Budget,
    Skills,
    Horizon(Horizon),
    /// Parent heading whose body holds the horizon labels
    Timeframe,
}

impl LabelTarget {
    /// Metadata targets carry a single value rather than a plan section
    pub fn is_metadata(self) -> bool {
        !matches!(self, Self::Section(_) | Self::Timeframe)
    }
}

const LABEL_RULES: &[(&[&str], LabelTarget)] = &[
    (
        &[
            "business name",
            "company name",
            "idea name",
            "idea title",
            "business idea",
            "title",
            "name",
        ],
        LabelTarget::Title,
    ),
    (
        &[
            "company description",
            "business description",
            "company overview",
            "about the company",
            "about us",
            "company",
        ],
        LabelTarget::Section(SectionKey::CompanyDescription),
    ),
    (
        &["short description", "one line description", "tagline", "description"],
        LabelTarget::Description,
    ),
    (
        &["executive summary", "summary", "overview", "introduction"],
        LabelTarget::Section(SectionKey::ExecutiveSummary),
    ),
    (
        &["market risk", "risk level", "risk assessment", "risk"],
        LabelTarget::MarketRisk,
    ),
    (
        &[
            "market analysis",
            "market research",
            "industry analysis",
            "competitive analysis",
            "competition",
            "competitors",
            "target market",
            "market opportunity",
        ],
        LabelTarget::Section(SectionKey::MarketAnalysis),
    ),
    (
        &["business category", "category", "business type", "industry", "sector"],
        LabelTarget::Category,
    ),
    (
        &[
            "organization and management",
            "organisation and management",
            "organization",
            "organisation",
            "management",
            "team",
            "ownership",
        ],
        LabelTarget::Section(SectionKey::OrganizationAndManagement),
    ),
    (
        &[
            "service or product line",
            "product or service line",
            "products and services",
            "product line",
            "service line",
            "products",
            "product",
            "services",
            "service",
            "offerings",
            "offering",
        ],
        LabelTarget::Section(SectionKey::ServiceOrProductLine),
    ),
    (
        &[
            "marketing and sales",
            "marketing",
            "sales strategy",
            "sales",
            "go to market",
            "customer acquisition",
        ],
        LabelTarget::Section(SectionKey::MarketingAndSales),
    ),
    (
        &[
            "initial budget",
            "startup budget",
            "start up budget",
            "startup costs",
            "start up costs",
            "startup capital",
            "initial investment",
            "budget",
        ],
        LabelTarget::Budget,
    ),
    (
        &[
            "funding request",
            "funding",
            "financing",
            "capital requirements",
            "use of funds",
        ],
        LabelTarget::Section(SectionKey::FundingRequest),
    ),
    (
        &[
            "financial projections",
            "financial plan",
            "financial forecast",
            "financials",
            "financial",
            "projections",
            "forecast",
        ],
        LabelTarget::Section(SectionKey::FinancialProjections),
    ),
    (
        &[
            "appendix",
            "appendices",
            "supporting documents",
            "additional information",
        ],
        LabelTarget::Section(SectionKey::Appendix),
    ),
    (
        &[
            "required skills",
            "skills needed",
            "key skills",
            "skill set",
            "skillset",
            "skills",
        ],
        LabelTarget::Skills,
    ),
    (
        &["short term", "1 3 months", "first 3 months"],
        LabelTarget::Horizon(Horizon::ShortTerm),
    ),
    (
        &["medium term", "mid term", "3 12 months"],
        LabelTarget::Horizon(Horizon::MediumTerm),
    ),
    (
        &["long term", "1 3 years"],
        LabelTarget::Horizon(Horizon::LongTerm),
    ),
    (
        &["timeframe", "time frame", "timeline", "milestones", "roadmap"],
        LabelTarget::Timeframe,
    ),
];

/// Normalize a label or free text for phrase matching
///
/// Lowercases, turns `&` into `and`, strips leading list numbering
/// (`3.`, `IV)`), replaces punctuation with spaces, and collapses whitespace.
pub fn normalize_label(raw: &str) -> String {
    let stripped = strip_numbering(raw.trim());
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if c == '&' {
            out.push_str(" and ");
        } else if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove a leading `12.` / `12)` / `iv.` list marker followed by whitespace
fn strip_numbering(text: &str) -> &str {
    let marker_len = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || "ivxlcdmIVXLCDM".contains(*c)))
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    if marker_len == 0 {
        return text;
    }

    let rest = &text[marker_len..];
    match rest.strip_prefix(['.', ')']) {
        Some(after) if after.starts_with(char::is_whitespace) => after.trim_start(),
        _ => text,
    }
}

/// Whether `phrase` occurs in normalized `text` as whole words
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    format!(" {} ", text).contains(&format!(" {} ", phrase))
}

/// Map a raw label onto its target, first matching rule wins
pub fn match_label(raw: &str) -> Option<LabelTarget> {
    let label = normalize_label(raw);
    if label.is_empty() {
        return None;
    }
    LABEL_RULES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| contains_phrase(&label, p)))
        .map(|(_, target)| *target)
}

/// Like [`match_label`], but the whole label must be one of the phrases
///
/// Used where a loose match would swallow ordinary prose, such as numbered
/// list items and `Label: value` lines inside a section.
pub fn match_label_exact(raw: &str) -> Option<LabelTarget> {
    let label = normalize_label(raw);
    LABEL_RULES
        .iter()
        .find(|(phrases, _)| phrases.contains(&label.as_str()))
        .map(|(_, target)| *target)
}

/// Whether the text starts with a list number such as `2.` or `IV)`
pub fn has_list_number(text: &str) -> bool {
    let trimmed = text.trim_start();
    strip_numbering(trimmed).len() != trimmed.len()
}

// =============================================================================
// Category Keywords
// =============================================================================

/// Keyword rows; on equal scores the earlier row wins
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Tech,
        &[
            "tech", "technology", "software", "app", "apps", "saas", "web", "website",
            "digital", "online platform", "it", "ai", "data", "programming", "coding",
            "developer", "computer", "mobile", "cyber", "cybersecurity",
        ],
    ),
    (
        Category::Food,
        &[
            "food", "bakery", "baking", "bake", "baked goods", "pastry", "cafe", "coffee",
            "restaurant", "catering", "meal", "meals", "kitchen", "culinary", "chef",
            "cooking", "beverage", "beverages", "brewery", "snack", "dessert", "bread",
            "cake", "cakes", "food truck",
        ],
    ),
    (
        Category::Education,
        &[
            "education", "educational", "tutoring", "tutor", "teaching", "teacher",
            "course", "courses", "school", "learning", "lessons", "classes", "workshop",
            "workshops", "training",
        ],
    ),
    (
        Category::Creative,
        &[
            "creative", "design", "designer", "graphic design", "art", "arts", "artist",
            "photography", "music", "writing", "video", "film", "craft", "crafts",
            "illustration", "fashion", "painting", "pottery",
        ],
    ),
    (
        Category::Retail,
        &[
            "retail", "store", "shop", "boutique", "ecommerce", "e commerce", "merchandise",
            "resale", "reselling", "marketplace", "goods", "wholesale",
        ],
    ),
    (
        Category::Service,
        &[
            "service", "services", "cleaning", "repair", "maintenance", "landscaping",
            "gardening", "handyman", "pet", "care", "childcare", "delivery", "plumbing",
            "salon", "fitness", "personal training", "moving", "event planning",
        ],
    ),
    (
        Category::Consulting,
        &[
            "consulting", "consultancy", "consultant", "advisory", "advisor", "strategy",
            "coaching", "accounting", "bookkeeping", "business advice",
        ],
    ),
];

/// Best keyword match for free text, if any keyword occurs
pub fn category_from_keywords(text: &str) -> Option<Category> {
    let normalized = normalize_label(text);
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<(Category, usize)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        let score = keywords
            .iter()
            .filter(|k| contains_phrase(&normalized, k))
            .count();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((*category, score));
        }
    }
    best.map(|(category, _)| category)
}

// =============================================================================
// Risk Words
// =============================================================================

pub const LOW_RISK_WORDS: &[&str] = &["low", "minimal", "limited", "minor", "small"];
pub const MEDIUM_RISK_WORDS: &[&str] = &["medium", "moderate", "average", "balanced"];
pub const HIGH_RISK_WORDS: &[&str] = &[
    "high",
    "significant",
    "elevated",
    "considerable",
    "substantial",
    "severe",
];

// =============================================================================
// Timeframe Templates
// =============================================================================

/// Milestone focus per category: short, medium, and long term
const TIMEFRAME_FOCUS: &[(Category, [&str; 3])] = &[
    (
        Category::Tech,
        [
            "build a minimum viable product",
            "reach the first paying users",
            "scale the platform",
        ],
    ),
    (
        Category::Retail,
        [
            "secure suppliers and a sales channel",
            "build a base of repeat customers",
            "expand the product range",
        ],
    ),
    (
        Category::Service,
        [
            "land the first clients",
            "standardize service delivery",
            "hire staff and add service areas",
        ],
    ),
    (
        Category::Food,
        [
            "finalize recipes, permits and a test menu",
            "grow local sales and wholesale accounts",
            "open a dedicated location or widen distribution",
        ],
    ),
    (
        Category::Creative,
        [
            "assemble a portfolio and first commissions",
            "establish steady commissions and an audience",
            "grow into a recognized studio brand",
        ],
    ),
    (
        Category::Education,
        [
            "design the curriculum and run pilot sessions",
            "fill regular classes",
            "add courses and instructors",
        ],
    ),
    (
        Category::Consulting,
        [
            "define the offer and sign the first clients",
            "build referrals and case studies",
            "grow into a small advisory practice",
        ],
    ),
];

/// Generic milestone text for a horizon the provider left empty
pub fn timeframe_template(category: Category, horizon: Horizon) -> String {
    let focus = TIMEFRAME_FOCUS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, focus)| *focus)
        .unwrap_or(["get started", "grow steadily", "expand the business"]);

    let index = match horizon {
        Horizon::ShortTerm => 0,
        Horizon::MediumTerm => 1,
        Horizon::LongTerm => 2,
    };
    format!("{}: {}.", horizon.span(), focus[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("## 3. Marketing & Sales:"), "3 marketing and sales");
        assert_eq!(normalize_label("3. Marketing & Sales"), "marketing and sales");
        assert_eq!(normalize_label("IV) Funding Request"), "funding request");
        assert_eq!(normalize_label("Short-term (1-3 months)"), "short term 1 3 months");
    }

    #[test]
    fn test_numbering_needs_marker_and_space() {
        assert_eq!(normalize_label("1-3 months"), "1 3 months");
        assert_eq!(normalize_label("Civic plans"), "civic plans");
    }

    #[test]
    fn test_match_sections() {
        assert_eq!(
            match_label("Funding"),
            Some(LabelTarget::Section(SectionKey::FundingRequest))
        );
        assert_eq!(
            match_label("Organization & Management"),
            Some(LabelTarget::Section(SectionKey::OrganizationAndManagement))
        );
        assert_eq!(
            match_label("Products and Services"),
            Some(LabelTarget::Section(SectionKey::ServiceOrProductLine))
        );
        assert_eq!(
            match_label("Company Overview"),
            Some(LabelTarget::Section(SectionKey::CompanyDescription))
        );
        assert_eq!(
            match_label("Industry Analysis"),
            Some(LabelTarget::Section(SectionKey::MarketAnalysis))
        );
    }

    #[test]
    fn test_word_boundaries() {
        // "market" inside "marketing" must not trigger market analysis
        assert_eq!(
            match_label("Marketing Plan"),
            Some(LabelTarget::Section(SectionKey::MarketingAndSales))
        );
        assert_eq!(match_label("Marketplace notes"), None);
    }

    #[test]
    fn test_match_metadata() {
        assert_eq!(match_label("Category"), Some(LabelTarget::Category));
        assert_eq!(match_label("Industry"), Some(LabelTarget::Category));
        assert_eq!(match_label("Market Risk"), Some(LabelTarget::MarketRisk));
        assert_eq!(match_label("Startup Costs"), Some(LabelTarget::Budget));
        assert_eq!(match_label("Description"), Some(LabelTarget::Description));
        assert_eq!(
            match_label("Short term (1-3 months)"),
            Some(LabelTarget::Horizon(Horizon::ShortTerm))
        );
        assert_eq!(match_label("Milestones"), Some(LabelTarget::Timeframe));
        assert_eq!(match_label("Sweet Crumbs Bakery"), None);
    }

    #[test]
    fn test_exact_match_rejects_prose() {
        assert_eq!(
            match_label_exact("2. Market Analysis"),
            Some(LabelTarget::Section(SectionKey::MarketAnalysis))
        );
        assert_eq!(match_label_exact("Social media marketing"), None);
        assert!(has_list_number("2. Market Analysis"));
        assert!(!has_list_number("Market Analysis"));
    }

    #[test]
    fn test_category_keywords() {
        assert_eq!(category_from_keywords("Software & apps"), Some(Category::Tech));
        assert_eq!(category_from_keywords("Food & Beverage"), Some(Category::Food));
        assert_eq!(category_from_keywords("baking"), Some(Category::Food));
        assert_eq!(category_from_keywords("Online tutoring"), Some(Category::Education));
        assert_eq!(category_from_keywords("Hospitality"), None);
    }

    #[test]
    fn test_category_ties_keep_table_order() {
        // one Tech hit and one Service hit
        assert_eq!(category_from_keywords("web services"), Some(Category::Tech));
    }

    #[test]
    fn test_timeframe_templates_mention_span() {
        for category in Category::ALL {
            for horizon in Horizon::ALL {
                let text = timeframe_template(category, horizon);
                assert!(text.to_lowercase().starts_with(horizon.span()));
            }
        }
    }
}
