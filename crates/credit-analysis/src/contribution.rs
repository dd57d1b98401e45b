//! Weighted contribution of each aspect to the final credit score.

use credit_core::{Aspect, AspectStatus, CreditError, CreditResult, FirmRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Validated aspect weights. Always holds all seven aspects and sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectWeights {
    weights: [f64; 7],
}

impl AspectWeights {
    pub const TOLERANCE: f64 = 1e-6;

    /// Weights used upstream to produce `final_score`.
    pub fn standard() -> Self {
        Self {
            weights: [0.15, 0.15, 0.20, 0.10, 0.10, 0.15, 0.15],
        }
    }

    /// Validate a full aspect → weight mapping.
    pub fn new<I>(entries: I) -> CreditResult<Self>
    where
        I: IntoIterator<Item = (Aspect, f64)>,
    {
        let mut slots: [Option<f64>; 7] = [None; 7];
        for (aspect, weight) in entries {
            if !weight.is_finite() || weight < 0.0 {
                return Err(CreditError::InvalidWeights(format!(
                    "{} weight {} must be a non-negative number",
                    aspect.key(),
                    weight
                )));
            }
            if slots[aspect.index()].replace(weight).is_some() {
                return Err(CreditError::InvalidWeights(format!(
                    "{} given more than once",
                    aspect.key()
                )));
            }
        }

        let missing: Vec<&str> = Aspect::ALL
            .iter()
            .filter(|a| slots[a.index()].is_none())
            .map(|a| a.key())
            .collect();
        if !missing.is_empty() {
            return Err(CreditError::InvalidWeights(format!(
                "missing weights for {}",
                missing.join(", ")
            )));
        }

        let weights = slots.map(|w| w.unwrap_or_default());
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > Self::TOLERANCE {
            return Err(CreditError::InvalidWeights(format!(
                "weights sum to {:.6}, expected 1.0",
                total
            )));
        }

        Ok(Self { weights })
    }

    pub fn get(&self, aspect: Aspect) -> f64 {
        self.weights[aspect.index()]
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }
}

impl Default for AspectWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parses `liquidity=0.15,solvency=0.15,...`.
impl FromStr for AspectWeights {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                CreditError::InvalidWeights(format!("expected aspect=weight, got '{}'", pair))
            })?;
            let aspect: Aspect = name.parse()?;
            let weight: f64 = value.trim().parse().map_err(|_| {
                CreditError::InvalidWeights(format!("weight for {} is not a number: '{}'", name.trim(), value.trim()))
            })?;
            entries.push((aspect, weight));
        }
        Self::new(entries)
    }
}

/// Share of the final score attributable to one aspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectContribution {
    pub aspect: Aspect,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
    pub status: AspectStatus,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ContributionCalculator {
    weights: AspectWeights,
}

impl ContributionCalculator {
    pub fn new(weights: AspectWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &AspectWeights {
        &self.weights
    }

    /// Contributions sorted by contribution, largest first. Ties keep the
    /// canonical aspect order.
    pub fn compute(&self, record: &FirmRecord) -> Vec<AspectContribution> {
        let mut contributions: Vec<AspectContribution> = record
            .aspects()
            .iter()
            .map(|a| {
                let weight = self.weights.get(a.aspect);
                AspectContribution {
                    aspect: a.aspect,
                    score: a.score,
                    weight,
                    contribution: a.score * weight,
                    status: a.status.clone(),
                    reason: a.reason.clone(),
                }
            })
            .collect();

        // Vec::sort_by is stable
        contributions.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(Ordering::Equal)
        });
        contributions
    }

    /// Whether the contributions add back up to the record's `final_score`.
    pub fn reconciles(&self, record: &FirmRecord, tolerance: f64) -> bool {
        let total = total_contribution(&self.compute(record));
        (total - record.final_score).abs() <= tolerance
    }
}

impl Default for ContributionCalculator {
    fn default() -> Self {
        Self::new(AspectWeights::standard())
    }
}

pub fn compute_contributions(record: &FirmRecord, weights: &AspectWeights) -> Vec<AspectContribution> {
    ContributionCalculator::new(*weights).compute(record)
}

pub fn total_contribution(contributions: &[AspectContribution]) -> f64 {
    contributions.iter().map(|c| c.contribution).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use credit_core::AspectAssessment;

    fn record(scores: [f64; 7], final_score: f64) -> FirmRecord {
        let aspects = Aspect::ALL
            .iter()
            .zip(scores)
            .map(|(aspect, score)| AspectAssessment {
                aspect: *aspect,
                score,
                status: AspectStatus::Moderate,
                reason: String::new(),
                analysis: String::new(),
            })
            .collect();
        FirmRecord::new("F1", aspects, final_score, "B", "Approve", "", None).unwrap()
    }

    #[test]
    fn test_standard_weights_sum_to_one() {
        assert_relative_eq!(AspectWeights::standard().total(), 1.0, epsilon = AspectWeights::TOLERANCE);
        assert_relative_eq!(AspectWeights::default().get(Aspect::Profitability), 0.20);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let entries = Aspect::ALL.iter().map(|a| (*a, 0.2));
        assert!(matches!(AspectWeights::new(entries), Err(CreditError::InvalidWeights(_))));
    }

    #[test]
    fn test_weights_require_every_aspect() {
        let err = AspectWeights::new(vec![(Aspect::Liquidity, 1.0)]).unwrap_err();
        assert!(err.to_string().contains("solvency"));
    }

    #[test]
    fn test_weights_reject_negative() {
        let mut entries: Vec<(Aspect, f64)> = Aspect::ALL.iter().map(|a| (*a, AspectWeights::standard().get(*a))).collect();
        entries[0].1 = -0.15;
        entries[1].1 = 0.45;
        assert!(AspectWeights::new(entries).is_err());
    }

    #[test]
    fn test_weights_from_str() {
        let parsed: AspectWeights = "liquidity=0.15, solvency=0.15, profitability=0.2, activity=0.1, \
                                     coverage=0.1, cashflow=0.15, structure=0.15"
            .parse()
            .unwrap();
        assert_eq!(parsed, AspectWeights::standard());

        assert!("liquidity=abc".parse::<AspectWeights>().is_err());
        assert!("liquidity".parse::<AspectWeights>().is_err());
        assert!(matches!(
            "momentum=1.0".parse::<AspectWeights>(),
            Err(CreditError::UnknownAspect(_))
        ));
    }

    #[test]
    fn test_contributions_sorted_descending() {
        let r = record([80.0, 70.0, 90.0, 60.0, 75.0, 85.0, 65.0], 76.5);
        let contributions = ContributionCalculator::default().compute(&r);
        let order: Vec<Aspect> = contributions.iter().map(|c| c.aspect).collect();

        assert_eq!(order[0], Aspect::Profitability);
        assert_relative_eq!(contributions[0].contribution, 18.0, epsilon = 1e-9);
        assert_eq!(order[1], Aspect::Cashflow);
        assert_relative_eq!(contributions[1].contribution, 12.75, epsilon = 1e-9);
        assert_eq!(order[2], Aspect::Liquidity);
        assert_relative_eq!(contributions[2].contribution, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ties_keep_canonical_order() {
        let r = record([50.0; 7], 50.0);
        let contributions = ContributionCalculator::default().compute(&r);
        let order: Vec<Aspect> = contributions.iter().map(|c| c.aspect).collect();
        // 0.15-weighted aspects tie at 7.5, 0.10-weighted at 5.0
        assert_eq!(
            order,
            vec![
                Aspect::Profitability,
                Aspect::Liquidity,
                Aspect::Solvency,
                Aspect::Cashflow,
                Aspect::Structure,
                Aspect::Activity,
                Aspect::Coverage,
            ]
        );
    }

    #[test]
    fn test_contributions_reconcile_with_final_score() {
        let grids = [
            [80.0, 70.0, 90.0, 60.0, 75.0, 85.0, 65.0],
            [0.0, 100.0, 33.3, 12.5, 99.9, 45.0, 70.0],
            [100.0; 7],
        ];
        let weights = AspectWeights::standard();
        for scores in grids {
            let expected: f64 = Aspect::ALL.iter().map(|a| scores[a.index()] * weights.get(*a)).sum();
            let r = record(scores, expected);
            assert_relative_eq!(total_contribution(&compute_contributions(&r, &weights)), expected, epsilon = 1e-9);
            assert!(ContributionCalculator::new(weights).reconciles(&r, 1e-6));
        }

        let off = record([80.0, 70.0, 90.0, 60.0, 75.0, 85.0, 65.0], 60.0);
        assert!(!ContributionCalculator::default().reconciles(&off, 1e-6));
    }
}
