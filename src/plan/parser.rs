//! Response Parser
//!
//! Turns raw provider output into a [`PlanDraft`]: the nine plan sections
//! plus whatever metadata hints (title, category, risk, budget, skills,
//! horizons) the text carries.
//!
//! ## Segmentation
//!
//! Parsing is line-oriented and best-effort. A new segment starts at
//! - a Markdown heading (`## Market Analysis`) or a bold-only line
//!   (`**Funding**`), matched loosely against the label table;
//! - a numbered heading (`3. Market Analysis`) or a `Label: value` line whose
//!   label is exactly one of the table's phrases.
//!
//! `Label: value` lines naming metadata (`Category: Food`) are recorded as
//! hints without ending the surrounding section. Answers that are a JSON
//! object are flattened into the same segments first, so both formats share
//! one label table. Parsing is deterministic: the same text always yields
//! the same draft.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::json::extract_object;
use super::rules::{
    LabelTarget, contains_phrase, has_list_number, match_label, match_label_exact,
    normalize_label,
};
use crate::constants::parser as parser_constants;
use crate::types::{
    BusinessPlan, Horizon, ParseFailure, RequestContext, SbaSection, SectionKey,
};

static AMOUNT: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?i)(\$)?\s*(\d[\d,]*(?:\.\d+)?)\s*(k|m|thousand|million)?\b")
});

/// JSON keys whose objects are searched for further labels
const CONTAINER_KEYS: &[&str] = &["plan", "business plan", "sections", "idea", "data", "result"];

const UPPER_BOUND_PHRASES: &[&str] = &[
    "up to",
    "under",
    "less than",
    "below",
    "at most",
    "maximum",
    "max",
    "no more than",
];

// =============================================================================
// Parse Mode
// =============================================================================

/// Policy for plan sections the provider did not supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Missing sections fail the parse
    Strict,
    /// Missing sections are filled with placeholder content
    #[default]
    Lenient,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            _ => Err(format!("Unknown parser mode: {}. Valid values: strict, lenient", s)),
        }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// Budget bounds as stated by the provider, not yet reconciled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetHint {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl BudgetHint {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Plan-shaped result of parsing, before classification and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Category as the provider wrote it
    pub category: Option<String>,
    /// Market risk as the provider wrote it
    pub market_risk: Option<String>,
    pub budget: BudgetHint,
    pub skills: BTreeSet<String>,
    /// Short, medium, and long term milestones, in that order
    pub horizons: [Option<String>; 3],
    pub plan: BusinessPlan,
    /// Sections filled with placeholder content
    pub repaired: Vec<SectionKey>,
}

impl PlanDraft {
    pub fn horizon(&self, horizon: Horizon) -> Option<&str> {
        self.horizons[horizon_index(horizon)].as_deref()
    }
}

fn horizon_index(horizon: Horizon) -> usize {
    match horizon {
        Horizon::ShortTerm => 0,
        Horizon::MediumTerm => 1,
        Horizon::LongTerm => 2,
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Converts raw provider text into a [`PlanDraft`]
#[derive(Debug, Clone)]
pub struct ResponseParser {
    mode: ParseMode,
    placeholder: String,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(ParseMode::default())
    }
}

impl ResponseParser {
    pub fn new(mode: ParseMode) -> Self {
        Self {
            mode,
            placeholder: parser_constants::PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parse raw provider output
    ///
    /// In strict mode any missing section yields a [`ParseFailure`] naming
    /// every missing field in canonical order.
    pub fn parse(&self, raw: &str, ctx: &RequestContext) -> Result<PlanDraft, ParseFailure> {
        let _entered = ctx.span().enter();

        let (segments, format) = match extract_object(raw) {
            Some(map) => {
                let mut segments = Vec::new();
                flatten_json(&map, &mut segments);
                (segments, "json")
            }
            None => (segment_text(raw), "text"),
        };

        let collected = Collected::from_segments(segments);
        let draft = self.assemble(collected)?;

        debug!(
            format,
            mode = %self.mode,
            repaired = draft.repaired.len(),
            has_title = draft.title.is_some(),
            has_category = draft.category.is_some(),
            "Parsed provider response"
        );

        Ok(draft)
    }

    fn assemble(&self, collected: Collected) -> Result<PlanDraft, ParseFailure> {
        let mut missing = Vec::new();
        let plan = BusinessPlan::from_fn(|key| match collected.section_text(key) {
            Some(text) => SbaSection::canonical(key, text),
            None => {
                missing.push(key);
                SbaSection::canonical(key, self.placeholder.clone())
            }
        });

        if self.mode == ParseMode::Strict && !missing.is_empty() {
            return Err(ParseFailure {
                missing_fields: missing
                    .iter()
                    .map(|k| k.field_name().to_string())
                    .collect(),
            });
        }

        let (title, title_from_preamble) = match &collected.title {
            Some(title) => (Some(title.clone()), false),
            None => match collected.unmatched_headings.first() {
                Some(heading) => (clean_title(heading), false),
                None => (preamble_title(&collected.preamble), true),
            },
        };

        let description = collected
            .description
            .clone()
            .or_else(|| preamble_description(&collected.preamble, title_from_preamble))
            .or_else(|| {
                collected
                    .section_text(SectionKey::ExecutiveSummary)
                    .and_then(|text| first_paragraph(&text))
            });

        Ok(PlanDraft {
            title,
            description,
            category: collected.category,
            market_risk: collected.market_risk,
            budget: collected.budget,
            skills: collected.skills,
            horizons: collected.horizons.map(|parts| join_nonempty(&parts)),
            plan,
            repaired: missing,
        })
    }
}

// =============================================================================
// Segments
// =============================================================================

/// A run of lines attributed to one label (or to the preamble)
#[derive(Debug, Default)]
struct Segment {
    target: Option<LabelTarget>,
    /// Heading text of a heading nothing in the table matched
    unmatched_heading: Option<String>,
    lines: Vec<String>,
}

impl Segment {
    fn new(target: LabelTarget, first_line: Option<String>) -> Self {
        Self {
            target: Some(target),
            unmatched_heading: None,
            lines: first_line.into_iter().filter(|l| !l.is_empty()).collect(),
        }
    }

    fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

/// How a single line participates in segmentation
enum LineKind {
    /// `top_level` is a single `#` heading
    Heading { text: String, top_level: bool },
    /// `exact` when the whole label is a known phrase
    Labeled {
        target: LabelTarget,
        value: String,
        exact: bool,
    },
    Text,
}

fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Text;
    }

    if trimmed.starts_with('#') {
        let heading = strip_emphasis(trimmed.trim_start_matches('#'));
        return heading_or_label(&heading, !trimmed.starts_with("##"));
    }

    if let Some(inner) = bold_only(trimmed) {
        return heading_or_label(&inner, false);
    }

    let cleaned = strip_emphasis(strip_bullet(trimmed));

    if has_list_number(&cleaned)
        && !cleaned.contains(':')
        && let Some(target) = match_label_exact(&cleaned)
    {
        return LineKind::Labeled {
            target,
            value: String::new(),
            exact: true,
        };
    }

    label_value(&cleaned).unwrap_or(LineKind::Text)
}

/// Heading text, possibly carrying an inline `Label: value`
fn heading_or_label(heading: &str, top_level: bool) -> LineKind {
    let heading = heading.trim().trim_end_matches(':').trim();
    if heading.chars().count() > parser_constants::MAX_HEADING_CHARS {
        return LineKind::Text;
    }
    if let Some((label, value)) = heading.split_once(':')
        && let Some(target) = match_label(label)
    {
        return LineKind::Labeled {
            target,
            value: value.trim().to_string(),
            exact: match_label_exact(label) == Some(target),
        };
    }
    LineKind::Heading {
        text: heading.to_string(),
        top_level,
    }
}

/// `Label: value`, where the label is short and known
fn label_value(cleaned: &str) -> Option<LineKind> {
    let (label, value) = cleaned.split_once(':')?;
    let words = normalize_label(label).split(' ').count();
    if label.trim().is_empty() || words > parser_constants::MAX_LABEL_WORDS {
        return None;
    }

    // Metadata labels may be decorated ("Estimated Initial Budget");
    // section labels must be exact to leave ordinary prose alone
    let target = match match_label(label) {
        Some(target) if target.is_metadata() => target,
        _ => match_label_exact(label)?,
    };

    Some(LineKind::Labeled {
        target,
        value: value.trim().to_string(),
        exact: match_label_exact(label) == Some(target),
    })
}

/// Inner text of a line that is entirely bold (`**Label**` or `__Label__`)
fn bold_only(line: &str) -> Option<String> {
    let line = line.trim_end_matches(':');
    for marker in ["**", "__"] {
        if let Some(inner) = line
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
            && !inner.is_empty()
            && !inner.contains(marker)
        {
            return Some(inner.trim().to_string());
        }
    }
    None
}

fn strip_bullet(line: &str) -> &str {
    for bullet in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }
    line
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "").trim().to_string()
}

fn in_timeframe(target: Option<LabelTarget>) -> bool {
    matches!(
        target,
        Some(LabelTarget::Timeframe) | Some(LabelTarget::Horizon(_))
    )
}

/// Split headed prose into segments
fn segment_text(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::default();
    // Section or timeframe segment to resume after a multi-line metadata value
    let mut resume: Option<LabelTarget> = None;
    let mut seen_label = false;
    let mut seen_section = false;
    let mut seen_title_heading = false;
    // Metadata subheading inside a section; its first line is the hint
    let mut pending_hint: Option<LabelTarget> = None;

    for line in raw.lines() {
        let kind = classify_line(line);
        if !matches!(kind, LineKind::Text) {
            pending_hint = None;
        }

        match kind {
            LineKind::Heading { text, top_level } => {
                let loose = match_label(&text);
                // A business name may carry a section word ("GreenLeaf Landscaping Services")
                let demoted = top_level
                    && !seen_section
                    && !seen_title_heading
                    && loose.is_some_and(|target| !target.is_metadata())
                    && match_label_exact(&text).is_none();
                let target = if demoted { None } else { loose };

                match target {
                    Some(target)
                        if target.is_metadata()
                            && matches!(current.target, Some(LabelTarget::Section(_))) =>
                    {
                        current.lines.push(line.trim_end().to_string());
                        pending_hint = Some(target);
                    }
                    Some(target) => {
                        segments.push(std::mem::take(&mut current));
                        current = Segment::new(target, None);
                        seen_label = true;
                        if !target.is_metadata() {
                            resume = Some(target);
                            seen_section = true;
                        }
                    }
                    None if !seen_label || demoted => {
                        // Before any labelled content: a title candidate
                        segments.push(std::mem::take(&mut current));
                        current.unmatched_heading = Some(text);
                        seen_title_heading = true;
                    }
                    None => current.lines.push(line.trim_end().to_string()),
                }
            }
            LineKind::Labeled {
                target,
                value,
                exact,
            } => {
                if let LabelTarget::Horizon(_) = target
                    && !in_timeframe(current.target)
                {
                    current.lines.push(line.trim_end().to_string());
                    continue;
                }
                // Inside the plan body only exact name and description labels count
                if seen_section
                    && !exact
                    && matches!(target, LabelTarget::Title | LabelTarget::Description)
                {
                    current.lines.push(line.trim_end().to_string());
                    continue;
                }
                seen_label = true;

                if target.is_metadata()
                    && value.is_empty()
                    && matches!(current.target, Some(LabelTarget::Section(_)))
                {
                    current.lines.push(line.trim_end().to_string());
                    pending_hint = Some(target);
                    continue;
                }

                if !target.is_metadata() || value.is_empty() {
                    segments.push(std::mem::take(&mut current));
                    current = Segment::new(target, Some(value));
                    if !target.is_metadata() {
                        resume = Some(target);
                        seen_section = true;
                    }
                    continue;
                }

                // Inline metadata hint
                segments.push(Segment::new(target, Some(value)));
                match current.target {
                    Some(LabelTarget::Section(_)) => {
                        current.lines.push(line.trim_end().to_string());
                    }
                    Some(t) if t.is_metadata() => {
                        segments.push(std::mem::take(&mut current));
                        if let Some(resumed) = resume {
                            current = Segment::new(resumed, None);
                        }
                    }
                    _ => {}
                }
            }
            LineKind::Text => {
                if let Some(target) = pending_hint
                    && !line.trim().is_empty()
                {
                    segments.push(Segment::new(target, Some(line.trim().to_string())));
                    pending_hint = None;
                }
                current.lines.push(line.trim_end().to_string());
            }
        }
    }

    segments.push(current);
    segments
}

/// Flatten a JSON answer into labelled segments
fn flatten_json(map: &Map<String, Value>, out: &mut Vec<Segment>) {
    for (key, value) in map {
        let label = split_key(key);
        let target = match_label(&label);

        match (target, value) {
            (Some(target), Value::String(text)) => {
                out.push(Segment::new(target, Some(text.trim().to_string())));
            }
            (Some(target), Value::Number(n)) => {
                out.push(Segment::new(target, Some(n.to_string())));
            }
            (Some(target), Value::Array(items)) => {
                let mut segment = Segment::new(target, None);
                segment
                    .lines
                    .extend(items.iter().filter_map(json_item_text));
                out.push(segment);
            }
            (Some(LabelTarget::Section(key)), Value::Object(obj)) => {
                if let Some(text) = section_object_text(obj) {
                    out.push(Segment::new(LabelTarget::Section(key), Some(text)));
                }
            }
            (Some(LabelTarget::Budget), Value::Object(obj)) => {
                if let Some(text) = budget_object_text(obj) {
                    out.push(Segment::new(LabelTarget::Budget, Some(text)));
                }
            }
            (Some(_), Value::Object(obj)) => flatten_json(obj, out),
            (None, Value::Object(obj)) if CONTAINER_KEYS.contains(&normalize_label(&label).as_str()) => {
                flatten_json(obj, out)
            }
            _ => {}
        }
    }
}

/// `marketRisk` / `market_risk` → `market Risk` / `market risk`
fn split_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        out.push(c);
    }
    out
}

fn json_item_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => ["name", "skill", "content", "description"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(|s| s.trim().to_string()),
        _ => None,
    }
}

fn section_object_text(obj: &Map<String, Value>) -> Option<String> {
    if let Some(content) = obj.get("content").and_then(Value::as_str) {
        return Some(content.trim().to_string());
    }
    let parts: Vec<String> = obj
        .iter()
        .filter(|(k, _)| k.as_str() != "title")
        .filter_map(|(_, v)| v.as_str())
        .map(str::to_string)
        .collect();
    join_nonempty(&parts)
}

fn budget_object_text(obj: &Map<String, Value>) -> Option<String> {
    let bound = |key: &str| {
        obj.get(key)
            .and_then(Value::as_f64)
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u64)
    };
    match (bound("min"), bound("max")) {
        (Some(min), Some(max)) => Some(format!("${} - ${}", min, max)),
        (Some(min), None) => Some(format!("${}", min)),
        (None, Some(max)) => Some(format!("up to ${}", max)),
        (None, None) => None,
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Segment contents gathered per target
#[derive(Debug, Default)]
struct Collected {
    sections: BTreeMap<SectionKey, Vec<String>>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    market_risk: Option<String>,
    budget: BudgetHint,
    skills: BTreeSet<String>,
    horizons: [Vec<String>; 3],
    unmatched_headings: Vec<String>,
    preamble: Vec<String>,
}

impl Collected {
    fn from_segments(segments: Vec<Segment>) -> Self {
        let mut collected = Self::default();
        for segment in segments {
            if let Some(heading) = &segment.unmatched_heading {
                collected.unmatched_headings.push(heading.clone());
            }
            let text = segment.text();
            match segment.target {
                None => {
                    if !text.is_empty() {
                        collected.preamble.push(text);
                    }
                }
                Some(target) => collected.feed(target, &text),
            }
        }
        collected
    }

    fn feed(&mut self, target: LabelTarget, text: &str) {
        if text.is_empty() {
            return;
        }
        match target {
            LabelTarget::Section(key) => self.sections.entry(key).or_default().push(text.to_string()),
            LabelTarget::Title => {
                if self.title.is_none() {
                    self.title = clean_title(text);
                }
            }
            LabelTarget::Description => {
                if self.description.is_none() {
                    self.description = Some(text.to_string());
                }
            }
            LabelTarget::Category => {
                if self.category.is_none() {
                    self.category = first_line(text);
                }
            }
            LabelTarget::MarketRisk => {
                if self.market_risk.is_none() {
                    self.market_risk = first_line(text);
                }
            }
            LabelTarget::Budget => {
                if self.budget.is_empty() {
                    self.budget = parse_budget(text);
                }
            }
            LabelTarget::Skills => self.skills.extend(split_skills(text)),
            LabelTarget::Horizon(horizon) => {
                self.horizons[horizon_index(horizon)].push(text.to_string())
            }
            LabelTarget::Timeframe => {}
        }
    }

    /// All content found for a section, in order of appearance
    fn section_text(&self, key: SectionKey) -> Option<String> {
        self.sections.get(&key).and_then(|parts| join_nonempty(parts))
    }
}

fn join_nonempty(parts: &[String]) -> Option<String> {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    (!joined.is_empty()).then_some(joined)
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(|l| strip_emphasis(strip_bullet(l.trim())))
        .find(|l| !l.is_empty())
}

fn first_paragraph(text: &str) -> Option<String> {
    text.split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .map(str::to_string)
}

/// Strip Markdown decoration and quoting; cap the length
fn clean_title(raw: &str) -> Option<String> {
    let line = first_line(raw)?;
    let cleaned = line
        .trim_matches(|c: char| matches!(c, '#' | '*' | '_' | '"' | '\'' | '`') || c.is_whitespace())
        .trim_end_matches(['.', ':']);
    let cleaned = strip_suffix_ignore_case(cleaned, "business plan")
        .trim_end_matches(|c: char| c == '-' || c == ':' || c.is_whitespace());

    if cleaned.is_empty() {
        return None;
    }
    Some(
        cleaned
            .chars()
            .take(parser_constants::MAX_TITLE_CHARS)
            .collect(),
    )
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> &'a str {
    let split = text.len().saturating_sub(suffix.len());
    match (text.get(..split), text.get(split..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(suffix) && !head.trim().is_empty() => {
            head
        }
        _ => text,
    }
}

/// First preamble line that reads like a name rather than an introduction
fn preamble_title(preamble: &[String]) -> Option<String> {
    let first = preamble.first()?;
    let line = first.lines().map(str::trim).find(|l| !l.is_empty())?;
    if line.ends_with(':') {
        return None;
    }
    clean_title(line)
}

/// Preamble paragraph following the title line, if any
fn preamble_description(preamble: &[String], title_from_preamble: bool) -> Option<String> {
    let paragraphs: Vec<String> = preamble
        .iter()
        .flat_map(|block| block.split("\n\n"))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if !title_from_preamble {
        return paragraphs.first().cloned();
    }

    let first = paragraphs.first()?;
    let rest: Vec<&str> = first.lines().skip(1).collect();
    let rest = rest.join("\n").trim().to_string();
    if rest.is_empty() {
        paragraphs.get(1).cloned()
    } else {
        Some(rest)
    }
}

/// Extract lower/upper budget bounds from free text
///
/// Understands `$`, thousands separators, and `k`/`m` suffixes. When any
/// amount carries a `$`, bare numbers are ignored. A single amount is an
/// upper bound if phrased as one ("up to $5k"), otherwise a lower bound.
pub fn parse_budget(text: &str) -> BudgetHint {
    let Ok(re) = AMOUNT.as_ref() else {
        return BudgetHint::default();
    };

    let amounts: Vec<(bool, u64)> = re
        .captures_iter(text)
        .filter_map(|caps| {
            let dollar = caps.get(1).is_some();
            let digits = caps.get(2)?.as_str().replace(',', "");
            let value: f64 = digits.parse().ok()?;
            let scale = match caps.get(3).map(|m| m.as_str().to_lowercase()) {
                Some(s) if s == "k" || s == "thousand" => 1_000.0,
                Some(s) if s == "m" || s == "million" => 1_000_000.0,
                _ => 1.0,
            };
            Some((dollar, (value * scale).round() as u64))
        })
        .collect();

    let any_dollar = amounts.iter().any(|(dollar, _)| *dollar);
    let values: Vec<u64> = amounts
        .into_iter()
        .filter(|(dollar, _)| *dollar || !any_dollar)
        .map(|(_, v)| v)
        .take(2)
        .collect();

    match values.as_slice() {
        [a, b] => BudgetHint {
            min: Some(*a),
            max: Some(*b),
        },
        [single] => {
            let normalized = normalize_label(text);
            if UPPER_BOUND_PHRASES
                .iter()
                .any(|p| contains_phrase(&normalized, p))
            {
                BudgetHint {
                    min: None,
                    max: Some(*single),
                }
            } else {
                BudgetHint {
                    min: Some(*single),
                    max: None,
                }
            }
        }
        _ => BudgetHint::default(),
    }
}

/// Skills as lowercase items split on list separators
fn split_skills(text: &str) -> Vec<String> {
    text.split(['\n', ',', ';'])
        .map(|item| strip_emphasis(strip_bullet(item.trim())))
        .map(|item| item.trim_end_matches('.').trim().to_lowercase())
        .filter(|item| !item.is_empty() && item.chars().count() <= 60)
        .collect()
}
