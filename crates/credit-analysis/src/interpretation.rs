//! Rule-based interpretation of ratio statistics.
//!
//! All thresholds live in the named policy tables below. Level bands are
//! checked top-down and the first match wins; every classifier is total and
//! maps a missing input to its own sentinel label.

use serde::Serialize;
use std::fmt;

use crate::catalog::{define, MetricCategory, MetricDefinition};
use crate::statistics::MetricStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Polarity {
    /// Bands are `value > threshold`.
    HigherIsBetter,
    /// Bands are `value < threshold`.
    LowerIsBetter,
}

/// Ordered threshold table for one metric category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LevelPolicy {
    pub category: MetricCategory,
    pub polarity: Polarity,
    pub bands: &'static [(f64, &'static str)],
    pub floor: &'static str,
}

impl LevelPolicy {
    /// Returns `(rank, label)`; rank 0 is the best band.
    pub fn evaluate(&self, value: f64) -> (usize, &'static str) {
        for (rank, (threshold, label)) in self.bands.iter().enumerate() {
            let hit = match self.polarity {
                Polarity::HigherIsBetter => value > *threshold,
                Polarity::LowerIsBetter => value < *threshold,
            };
            if hit {
                return (rank, *label);
            }
        }
        (self.bands.len(), self.floor)
    }
}

pub const PROFITABILITY_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::Profitability,
    polarity: Polarity::HigherIsBetter,
    bands: &[
        (0.15, "Excellent profitability"),
        (0.10, "Good profitability"),
        (0.05, "Moderate profitability"),
    ],
    floor: "Low profitability",
};

pub const LIQUIDITY_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::Liquidity,
    polarity: Polarity::HigherIsBetter,
    bands: &[
        (2.0, "Very strong liquidity"),
        (1.5, "Strong liquidity"),
        (1.0, "Adequate liquidity"),
    ],
    floor: "Weak liquidity",
};

pub const LEVERAGE_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::Leverage,
    polarity: Polarity::LowerIsBetter,
    bands: &[
        (0.3, "Very low leverage"),
        (0.6, "Moderate leverage"),
        (1.0, "High leverage"),
    ],
    floor: "Very high leverage",
};

pub const EFFICIENCY_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::Efficiency,
    polarity: Polarity::HigherIsBetter,
    bands: &[
        (1.5, "Excellent efficiency"),
        (1.0, "Good efficiency"),
        (0.5, "Moderate efficiency"),
    ],
    floor: "Low efficiency",
};

pub const COVERAGE_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::Coverage,
    polarity: Polarity::HigherIsBetter,
    bands: &[
        (3.0, "Very strong coverage"),
        (2.0, "Strong coverage"),
        (1.5, "Adequate coverage"),
    ],
    floor: "Weak coverage",
};

pub const INVENTORY_DAYS_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::InventoryDays,
    polarity: Polarity::LowerIsBetter,
    bands: &[
        (30.0, "Very efficient inventory management"),
        (60.0, "Good inventory management"),
        (90.0, "Moderate inventory management"),
    ],
    floor: "Slow inventory turnover",
};

pub const RECEIVABLE_DAYS_LEVELS: LevelPolicy = LevelPolicy {
    category: MetricCategory::ReceivableDays,
    polarity: Polarity::LowerIsBetter,
    bands: &[
        (30.0, "Very efficient collection"),
        (45.0, "Good collection"),
        (60.0, "Moderate collection"),
    ],
    floor: "Slow collection",
};

/// Threshold table for a category. `OtherDays` and `General` have none and
/// are described by their average.
pub fn level_policy(category: MetricCategory) -> Option<&'static LevelPolicy> {
    match category {
        MetricCategory::Profitability => Some(&PROFITABILITY_LEVELS),
        MetricCategory::Liquidity => Some(&LIQUIDITY_LEVELS),
        MetricCategory::Leverage => Some(&LEVERAGE_LEVELS),
        MetricCategory::Efficiency => Some(&EFFICIENCY_LEVELS),
        MetricCategory::Coverage => Some(&COVERAGE_LEVELS),
        MetricCategory::InventoryDays => Some(&INVENTORY_DAYS_LEVELS),
        MetricCategory::ReceivableDays => Some(&RECEIVABLE_DAYS_LEVELS),
        MetricCategory::OtherDays | MetricCategory::General => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LevelLabel {
    NoData,
    Band {
        category: MetricCategory,
        rank: usize,
        text: &'static str,
    },
    AverageDays(f64),
    AverageValue(f64),
}

impl fmt::Display for LevelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelLabel::NoData => f.write_str("No data available"),
            LevelLabel::Band { text, .. } => f.write_str(text),
            LevelLabel::AverageDays(v) => write!(f, "Average of {:.1} days", v),
            LevelLabel::AverageValue(v) => write!(f, "Average value of {:.3}", v),
        }
    }
}

/// Volatility bands on the standard deviation.
///
/// The ratio explorer once used 0.15 for the stable bound; this table is the
/// single canonical set.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StabilityPolicy {
    pub high_stability_below: f64,
    pub stable_below: f64,
    pub moderate_volatility_below: f64,
}

pub const STABILITY_POLICY: StabilityPolicy = StabilityPolicy {
    high_stability_below: 0.05,
    stable_below: 0.10,
    moderate_volatility_below: 0.20,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StabilityLabel {
    HighStability,
    Stable,
    ModerateVolatility,
    HighVolatility,
    NoData,
}

impl StabilityLabel {
    pub fn label(&self) -> &'static str {
        match self {
            StabilityLabel::HighStability => "High stability",
            StabilityLabel::Stable => "Stable",
            StabilityLabel::ModerateVolatility => "Moderate volatility",
            StabilityLabel::HighVolatility => "High volatility",
            StabilityLabel::NoData => "No volatility data",
        }
    }

    pub fn sentence(&self) -> &'static str {
        match self {
            StabilityLabel::HighStability => {
                "The metric shows high stability over time with consistent performance."
            }
            StabilityLabel::Stable => {
                "The metric is stable with some acceptable fluctuations."
            }
            StabilityLabel::ModerateVolatility => {
                "The metric shows moderate volatility that warrants monitoring."
            }
            StabilityLabel::HighVolatility => {
                "The metric shows high volatility indicating inconsistent performance that may require attention."
            }
            StabilityLabel::NoData => "No volatility data.",
        }
    }
}

impl fmt::Display for StabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Slope bands. The asymmetric 0.05 / 0.02 bounds are policy constants.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrendPolicy {
    pub strong_improving_above: f64,
    pub improving_above: f64,
    pub stable_above: f64,
    pub deteriorating_above: f64,
}

pub const TREND_POLICY: TrendPolicy = TrendPolicy {
    strong_improving_above: 0.05,
    improving_above: 0.02,
    stable_above: -0.02,
    deteriorating_above: -0.05,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendLabel {
    StrongImproving,
    Improving,
    Stable,
    Deteriorating,
    StrongDeteriorating,
    NoClearTrend,
}

/// Direction of the slope, independent of whether that direction is good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrendSign {
    Rising,
    Flat,
    Falling,
    Unknown,
}

impl TrendSign {
    pub fn label(&self) -> &'static str {
        match self {
            TrendSign::Rising => "rising",
            TrendSign::Flat => "flat",
            TrendSign::Falling => "declining",
            TrendSign::Unknown => "unknown",
        }
    }
}

impl TrendLabel {
    pub fn label(&self) -> &'static str {
        match self {
            TrendLabel::StrongImproving => "Strong improving trend",
            TrendLabel::Improving => "Improving trend",
            TrendLabel::Stable => "Stable trend",
            TrendLabel::Deteriorating => "Deteriorating trend",
            TrendLabel::StrongDeteriorating => "Strong deteriorating trend",
            TrendLabel::NoClearTrend => "No clear trend",
        }
    }

    pub fn sign(&self) -> TrendSign {
        match self {
            TrendLabel::StrongImproving | TrendLabel::Improving => TrendSign::Rising,
            TrendLabel::Stable => TrendSign::Flat,
            TrendLabel::Deteriorating | TrendLabel::StrongDeteriorating => TrendSign::Falling,
            TrendLabel::NoClearTrend => TrendSign::Unknown,
        }
    }

    pub fn sentence(&self) -> &'static str {
        match self {
            TrendLabel::StrongImproving => {
                "There is a strong improving trend over time, suggesting favorable development."
            }
            TrendLabel::Improving => {
                "There is a positive improving trend over time, suggesting favorable development."
            }
            TrendLabel::Stable => {
                "The metric remains relatively stable over time without significant directional change."
            }
            TrendLabel::Deteriorating => {
                "There is a declining trend that may require management attention."
            }
            TrendLabel::StrongDeteriorating => {
                "There is a strong declining trend that requires management attention and intervention."
            }
            TrendLabel::NoClearTrend => "No clear trend.",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the (category × trend direction) narrative table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DirectionalRule {
    pub category: MetricCategory,
    pub sign: TrendSign,
    pub sentence: &'static str,
}

/// Leverage reads inverted: a falling ratio is a strengthening balance sheet.
pub const DIRECTIONAL_RULES: &[DirectionalRule] = &[
    DirectionalRule {
        category: MetricCategory::Liquidity,
        sign: TrendSign::Rising,
        sentence: "Liquidity position is strengthening, improving ability to meet short-term obligations.",
    },
    DirectionalRule {
        category: MetricCategory::Liquidity,
        sign: TrendSign::Falling,
        sentence: "Liquidity position is weakening, potentially creating short-term financial stress.",
    },
    DirectionalRule {
        category: MetricCategory::Leverage,
        sign: TrendSign::Rising,
        sentence: "Leverage is increasing, potentially raising financial risk profile.",
    },
    DirectionalRule {
        category: MetricCategory::Leverage,
        sign: TrendSign::Falling,
        sentence: "Leverage is decreasing, strengthening the balance sheet position.",
    },
    DirectionalRule {
        category: MetricCategory::Profitability,
        sign: TrendSign::Rising,
        sentence: "Profitability is improving, indicating better operational efficiency.",
    },
    DirectionalRule {
        category: MetricCategory::Profitability,
        sign: TrendSign::Falling,
        sentence: "Profitability is declining, suggesting operational challenges that need addressing.",
    },
];

pub fn directional_sentence(category: MetricCategory, sign: TrendSign) -> Option<&'static str> {
    DIRECTIONAL_RULES
        .iter()
        .find(|r| r.category == category && r.sign == sign)
        .map(|r| r.sentence)
}

pub fn classify_level_for(category: MetricCategory, mean: Option<f64>) -> LevelLabel {
    let value = match mean.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => return LevelLabel::NoData,
    };
    match level_policy(category) {
        Some(policy) => {
            let (rank, text) = policy.evaluate(value);
            LevelLabel::Band {
                category,
                rank,
                text,
            }
        }
        None if category == MetricCategory::OtherDays => LevelLabel::AverageDays(value),
        None => LevelLabel::AverageValue(value),
    }
}

pub fn classify_level(metric_name: &str, mean: Option<f64>) -> LevelLabel {
    classify_level_for(define(metric_name).category, mean)
}

pub fn classify_stability(std_dev: Option<f64>) -> StabilityLabel {
    let p = &STABILITY_POLICY;
    match std_dev.filter(|v| v.is_finite()) {
        None => StabilityLabel::NoData,
        Some(v) if v < p.high_stability_below => StabilityLabel::HighStability,
        Some(v) if v < p.stable_below => StabilityLabel::Stable,
        Some(v) if v < p.moderate_volatility_below => StabilityLabel::ModerateVolatility,
        Some(_) => StabilityLabel::HighVolatility,
    }
}

pub fn classify_trend(slope: Option<f64>) -> TrendLabel {
    let p = &TREND_POLICY;
    match slope.filter(|v| v.is_finite()) {
        None => TrendLabel::NoClearTrend,
        Some(v) if v > p.strong_improving_above => TrendLabel::StrongImproving,
        Some(v) if v > p.improving_above => TrendLabel::Improving,
        Some(v) if v > p.stable_above => TrendLabel::Stable,
        Some(v) if v > p.deteriorating_above => TrendLabel::Deteriorating,
        Some(_) => TrendLabel::StrongDeteriorating,
    }
}

/// Every judgement made about one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub metric: String,
    pub category: MetricCategory,
    pub level: LevelLabel,
    pub stability: StabilityLabel,
    pub trend: TrendLabel,
    pub directional: Option<&'static str>,
}

impl Interpretation {
    /// Level, stability and trend sentences, then the directional sentence
    /// when the table has one.
    pub fn sentences(&self) -> Vec<String> {
        let mut out = vec![
            format!("{}.", self.level),
            self.stability.sentence().to_string(),
            self.trend.sentence().to_string(),
        ];
        if let Some(s) = self.directional {
            out.push(s.to_string());
        }
        out
    }

    /// Compact `"<level>. <stability>. <trend>."` form.
    pub fn summary(&self) -> String {
        format!("{}. {}. {}.", self.level, self.stability, self.trend)
    }
}

pub fn interpret(definition: &MetricDefinition, stats: &MetricStatistics) -> Interpretation {
    interpret_values(definition.name.as_str(), definition.category, stats.mean, stats.std_dev, stats.trend_slope)
}

fn interpret_values(
    metric: &str,
    category: MetricCategory,
    mean: Option<f64>,
    std_dev: Option<f64>,
    slope: Option<f64>,
) -> Interpretation {
    let trend = classify_trend(slope);
    Interpretation {
        metric: metric.to_string(),
        category,
        level: classify_level_for(category, mean),
        stability: classify_stability(std_dev),
        trend,
        directional: directional_sentence(category, trend.sign()),
    }
}

pub fn narrate(metric_name: &str, mean: Option<f64>, std_dev: Option<f64>, slope: Option<f64>) -> Vec<String> {
    interpret_values(metric_name, define(metric_name).category, mean, std_dev, slope).sentences()
}
