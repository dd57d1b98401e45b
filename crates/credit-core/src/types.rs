use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CreditError, CreditResult};

/// One of the seven weighted dimensions of the credit assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Liquidity,
    Solvency,
    Profitability,
    Activity,
    Coverage,
    Cashflow,
    Structure,
}

impl Aspect {
    /// Canonical order. Contribution ties are broken by this order.
    pub const ALL: [Aspect; 7] = [
        Aspect::Liquidity,
        Aspect::Solvency,
        Aspect::Profitability,
        Aspect::Activity,
        Aspect::Coverage,
        Aspect::Cashflow,
        Aspect::Structure,
    ];

    pub fn index(&self) -> usize {
        match self {
            Aspect::Liquidity => 0,
            Aspect::Solvency => 1,
            Aspect::Profitability => 2,
            Aspect::Activity => 3,
            Aspect::Coverage => 4,
            Aspect::Cashflow => 5,
            Aspect::Structure => 6,
        }
    }

    /// Column prefix used by the credit score table.
    pub fn key(&self) -> &'static str {
        match self {
            Aspect::Liquidity => "liquidity",
            Aspect::Solvency => "solvency",
            Aspect::Profitability => "profitability",
            Aspect::Activity => "activity",
            Aspect::Coverage => "coverage",
            Aspect::Cashflow => "cashflow",
            Aspect::Structure => "structure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Aspect::Liquidity => "Liquidity",
            Aspect::Solvency => "Solvency",
            Aspect::Profitability => "Profitability",
            Aspect::Activity => "Activity",
            Aspect::Coverage => "Coverage",
            Aspect::Cashflow => "Cashflow",
            Aspect::Structure => "Structure",
        }
    }

    /// Ratios surfaced next to the aspect's detailed analysis.
    pub fn key_metrics(&self) -> &'static [&'static str] {
        match self {
            Aspect::Liquidity => &["current_ratio", "quick_ratio", "cash_ratio"],
            Aspect::Solvency => &["debt_to_equity", "equity_to_assets", "interest_coverage"],
            Aspect::Profitability => &["roa", "roe", "net_profit_margin"],
            Aspect::Activity => &["days_inventory", "days_receivable", "asset_turnover"],
            Aspect::Coverage => &["interest_coverage", "dscr", "cash_coverage"],
            Aspect::Cashflow => &["ocf_ratio", "fcf_ratio", "cash_conversion_cycle"],
            Aspect::Structure => &["equity_to_assets", "debt_to_assets", "working_capital_ratio"],
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Aspect {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Aspect::ALL
            .iter()
            .copied()
            .find(|a| a.key() == needle)
            .ok_or_else(|| CreditError::UnknownAspect(s.to_string()))
    }
}

/// Categorical status attached to each aspect upstream.
///
/// Unrecognised (e.g. locale-specific) labels are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectStatus {
    Strong,
    Good,
    Moderate,
    Watch,
    Weak,
    Poor,
    Other(String),
}

impl AspectStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "strong" => AspectStatus::Strong,
            "good" => AspectStatus::Good,
            "moderate" => AspectStatus::Moderate,
            "watch" => AspectStatus::Watch,
            "weak" => AspectStatus::Weak,
            "poor" => AspectStatus::Poor,
            _ => AspectStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AspectStatus::Strong => "Strong",
            AspectStatus::Good => "Good",
            AspectStatus::Moderate => "Moderate",
            AspectStatus::Watch => "Watch",
            AspectStatus::Weak => "Weak",
            AspectStatus::Poor => "Poor",
            AspectStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for AspectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upstream assessment of a single aspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectAssessment {
    pub aspect: Aspect,
    pub score: f64, // 0 to 100
    pub status: AspectStatus,
    pub reason: String,
    pub analysis: String,
}

/// The single credit-score row for a firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmRecord {
    pub firm_id: String,
    aspects: Vec<AspectAssessment>,
    pub final_score: f64,
    pub category: String,
    pub recommendation: String,
    pub reasoning: String,
    #[serde(default)]
    pub genai_recommendation: Option<String>,
}

impl FirmRecord {
    /// Build a record. `aspects` must hold exactly one entry per aspect with
    /// scores in [0, 100]; they are stored in canonical order.
    pub fn new(
        firm_id: impl Into<String>,
        aspects: Vec<AspectAssessment>,
        final_score: f64,
        category: impl Into<String>,
        recommendation: impl Into<String>,
        reasoning: impl Into<String>,
        genai_recommendation: Option<String>,
    ) -> CreditResult<Self> {
        let mut ordered: Vec<Option<AspectAssessment>> = vec![None; Aspect::ALL.len()];
        for assessment in aspects {
            if !(0.0..=100.0).contains(&assessment.score) {
                return Err(CreditError::InvalidData(format!(
                    "{} score {} outside [0, 100]",
                    assessment.aspect.key(),
                    assessment.score
                )));
            }
            let slot = &mut ordered[assessment.aspect.index()];
            if slot.is_some() {
                return Err(CreditError::InvalidData(format!(
                    "duplicate assessment for {}",
                    assessment.aspect.key()
                )));
            }
            *slot = Some(assessment);
        }

        let missing: Vec<String> = Aspect::ALL
            .iter()
            .zip(ordered.iter())
            .filter(|(_, slot)| slot.is_none())
            .map(|(a, _)| format!("{}_score", a.key()))
            .collect();
        if !missing.is_empty() {
            return Err(CreditError::MissingColumns {
                table: "credit_score".to_string(),
                columns: missing,
            });
        }

        Ok(Self {
            firm_id: firm_id.into(),
            aspects: ordered.into_iter().flatten().collect(),
            final_score,
            category: category.into(),
            recommendation: recommendation.into(),
            reasoning: reasoning.into(),
            genai_recommendation: genai_recommendation
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    pub fn aspect(&self, aspect: Aspect) -> &AspectAssessment {
        &self.aspects[aspect.index()]
    }

    /// All assessments in canonical aspect order.
    pub fn aspects(&self) -> &[AspectAssessment] {
        &self.aspects
    }

    /// Reasoning cut to `max_chars` characters with a trailing ellipsis.
    pub fn reasoning_preview(&self, max_chars: usize) -> String {
        if self.reasoning.chars().count() > max_chars {
            let head: String = self.reasoning.chars().take(max_chars).collect();
            format!("{}...", head)
        } else {
            self.reasoning.clone()
        }
    }
}

/// Descriptive company fields, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub firm_id: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl CompanyInfo {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
