//! Mean, volatility and trend slope of a metric's time series.
//!
//! Statistics resolve through two tiers, field by field:
//! 1. the precomputed aggregate table, when the column exists and holds a value;
//! 2. direct computation from the ratio series otherwise.
//!
//! The derived tier uses the same definitions as the upstream aggregates
//! (sample standard deviation, OLS slope against year), so both tiers agree
//! on the same input series.

use credit_core::stats::{mean, ols_slope, sample_std_dev};
use credit_core::{AggregateStats, CreditError, CreditResult, Observation, StatKind, YearTable};
use serde::{Deserialize, Serialize};

/// Where a resolved statistic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatTier {
    Precomputed,
    Derived,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatTiers {
    pub mean: StatTier,
    pub std_dev: StatTier,
    pub trend_slope: StatTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub trend_slope: Option<f64>,
    pub tiers: StatTiers,
}

impl MetricStatistics {
    pub fn undefined() -> Self {
        Self {
            mean: None,
            std_dev: None,
            trend_slope: None,
            tiers: StatTiers {
                mean: StatTier::Unavailable,
                std_dev: StatTier::Unavailable,
                trend_slope: StatTier::Unavailable,
            },
        }
    }
}

fn tier_of(value: Option<f64>, tier: StatTier) -> StatTier {
    if value.is_some() {
        tier
    } else {
        StatTier::Unavailable
    }
}

/// Compute statistics directly from a series, ignoring missing values.
pub fn statistics(series: &[Observation]) -> MetricStatistics {
    let points: Vec<(f64, f64)> = series
        .iter()
        .filter_map(|o| o.value.map(|v| (o.year as f64, v)))
        .collect();
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();

    let mean = mean(&values);
    let std_dev = sample_std_dev(&values);
    let trend_slope = ols_slope(&points);

    MetricStatistics {
        mean,
        std_dev,
        trend_slope,
        tiers: StatTiers {
            mean: tier_of(mean, StatTier::Derived),
            std_dev: tier_of(std_dev, StatTier::Derived),
            trend_slope: tier_of(trend_slope, StatTier::Derived),
        },
    }
}

/// Two-tier statistics lookup over an aggregate table and a ratio table,
/// either of which may be absent.
pub struct TrendStatisticsEngine<'a> {
    aggregates: Option<&'a AggregateStats>,
    ratios: Option<&'a YearTable>,
}

impl<'a> TrendStatisticsEngine<'a> {
    pub fn new(aggregates: Option<&'a AggregateStats>, ratios: Option<&'a YearTable>) -> Self {
        Self { aggregates, ratios }
    }

    /// Resolve statistics for `metric`.
    ///
    /// Fails with `MetricNotFound` only when a loaded table could have known
    /// the metric and none did. With both tables absent every field is undefined.
    pub fn resolve(&self, metric: &str) -> CreditResult<MetricStatistics> {
        let in_aggregates = self.aggregates.map(|a| a.knows(metric));
        let in_ratios = self.ratios.map(|r| r.has_column(metric));

        match (in_aggregates, in_ratios) {
            (None, None) => return Ok(MetricStatistics::undefined()),
            (Some(false), None) | (None, Some(false)) | (Some(false), Some(false)) => {
                return Err(CreditError::MetricNotFound(metric.to_string()));
            }
            _ => {}
        }

        let derived = match self.ratios {
            Some(r) if r.has_column(metric) => statistics(&r.series(metric)?),
            _ => MetricStatistics::undefined(),
        };

        let precomputed = |kind: StatKind| -> Option<f64> {
            self.aggregates.and_then(|a| a.lookup(metric, kind)).flatten()
        };
        let pick = |kind: StatKind, fallback: Option<f64>, fallback_tier: StatTier| match precomputed(kind) {
            Some(v) => (Some(v), StatTier::Precomputed),
            None => (fallback, fallback_tier),
        };

        let (mean, mean_tier) = pick(StatKind::Mean, derived.mean, derived.tiers.mean);
        let (std_dev, std_tier) = pick(StatKind::StdDev, derived.std_dev, derived.tiers.std_dev);
        let (trend_slope, trend_tier) = pick(StatKind::Trend, derived.trend_slope, derived.tiers.trend_slope);

        Ok(MetricStatistics {
            mean,
            std_dev,
            trend_slope,
            tiers: StatTiers {
                mean: mean_tier,
                std_dev: std_tier,
                trend_slope: trend_tier,
            },
        })
    }
}
