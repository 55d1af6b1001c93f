//! Business Plan Prompt
//!
//! Fixed template asking the provider for one idea in a layout the parser
//! reads best: metadata labels up front, then the nine SBA sections as `##`
//! headings, then a timeframe block. The parser does not depend on the
//! provider following it.

use crate::ai::PromptBuilder;
use crate::types::{Category, Horizon, Preferences, SectionKey};

/// Guidance for each plan section, in canonical order
fn section_guidance(key: SectionKey) -> &'static str {
    match key {
        SectionKey::ExecutiveSummary => "What the business is, who it serves, and why it can succeed",
        SectionKey::CompanyDescription => "Legal structure, location, mission, and what sets it apart",
        SectionKey::MarketAnalysis => "Target customers, market size, trends, and competitors",
        SectionKey::OrganizationAndManagement => "Who runs the business and who does what",
        SectionKey::ServiceOrProductLine => "What is sold, pricing, and product lifecycle",
        SectionKey::MarketingAndSales => "How customers are reached and converted",
        SectionKey::FundingRequest => "Capital needed now and how it will be used",
        SectionKey::FinancialProjections => "Expected revenue, costs, and break-even point",
        SectionKey::Appendix => "Permits, licenses, and other supporting material",
    }
}

fn format_section(key: SectionKey) -> String {
    format!("## {}\n<{}>", key.title(), section_guidance(key))
}

/// Render the generation prompt for a set of preferences
pub fn business_plan_prompt(prefs: &Preferences) -> String {
    let skills = if prefs.skills.is_empty() {
        "none stated".to_string()
    } else {
        prefs
            .skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let interests = if prefs.interests.is_empty() {
        "none stated".to_string()
    } else {
        prefs.interests.join(", ")
    };
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let sections = SectionKey::ALL
        .iter()
        .map(|key| format_section(*key))
        .collect::<Vec<_>>()
        .join("\n\n");

    let horizons = Horizon::ALL
        .iter()
        .map(|h| format!("- {} ({}): <milestones>", horizon_label(*h), h.span()))
        .collect::<Vec<_>>()
        .join("\n");

    let layout = format!(
        "Title: <business name>\n\
         Description: <one sentence>\n\
         Category: <one of {categories}>\n\
         Market Risk: <Low, Medium, or High>\n\
         Initial Budget: $<min> - $<max>\n\
         Skills: <comma-separated skills the owner needs>\n\n\
         {sections}\n\n\
         ## Timeframe\n\
         {horizons}"
    );

    PromptBuilder::new()
        .role("small business consultant", "SBA-style business plans")
        .objectives(vec![
            "Propose ONE business idea that fits the person described below",
            "Keep the initial budget inside their budget range",
            "Match the market risk to their risk tolerance",
            "Write a complete plan covering all nine SBA sections",
        ])
        .context_item("Skills", &skills)
        .context_item("Budget Range", &prefs.budget_range.to_string())
        .context_item("Risk Tolerance", &prefs.risk_tolerance.to_string())
        .context_item("Interests", &interests)
        .section("Output Format", &layout)
        .focus(
            "a single, concrete business idea",
            vec![
                "Use the exact labels and headings shown above, in that order",
                "Do NOT list alternative ideas",
                "Do NOT wrap the answer in a code block",
            ],
        )
        .build()
}

fn horizon_label(horizon: Horizon) -> &'static str {
    match horizon {
        Horizon::ShortTerm => "Short term",
        Horizon::MediumTerm => "Medium term",
        Horizon::LongTerm => "Long term",
    }
}
