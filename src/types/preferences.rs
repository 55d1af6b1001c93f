//! User Preferences
//!
//! Input to the generation pipeline: what the user can do, what they can
//! spend, and how much risk they accept.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::idea::BudgetRange;

/// How much market risk the user is willing to take on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTolerance::Low => write!(f, "low"),
            RiskTolerance::Medium => write!(f, "medium"),
            RiskTolerance::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "medium" | "moderate" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            _ => Err(format!(
                "Unknown risk tolerance: {}. Valid values: low, medium, high",
                s
            )),
        }
    }
}

/// Preferences a business idea is generated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub skills: BTreeSet<String>,
    pub budget_range: BudgetRange,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Preferences {
    pub fn new(skills: impl IntoIterator<Item = impl Into<String>>, budget_range: BudgetRange) -> Self {
        Self {
            skills: skills.into_iter().map(Into::into).collect(),
            budget_range,
            risk_tolerance: RiskTolerance::default(),
            interests: Vec::new(),
        }
    }

    pub fn with_risk_tolerance(mut self, risk_tolerance: RiskTolerance) -> Self {
        self.risk_tolerance = risk_tolerance;
        self
    }

    pub fn with_interests(mut self, interests: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }
}
