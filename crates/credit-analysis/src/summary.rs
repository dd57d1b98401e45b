use credit_core::{Aspect, AspectStatus, FirmRecord, YearTable};
use serde::Serialize;

use crate::catalog::display_name;
use crate::contribution::{AspectContribution, ContributionCalculator};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetric {
    pub name: String,
    pub display_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AspectDetail {
    pub aspect: Aspect,
    pub score: f64,
    pub status: AspectStatus,
    pub weight: f64,
    pub reason: String,
    pub analysis: String,
    pub key_metrics: Vec<KeyMetric>,
}

/// Everything the summary page shows for one firm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub firm_id: String,
    pub final_score: f64,
    pub category: String,
    pub recommendation: String,
    pub reasoning: String,
    pub reasoning_truncated: bool,
    pub genai_recommendation: Option<String>,
    pub contributions: Vec<AspectContribution>,
    pub aspects: Vec<AspectDetail>,
    pub metrics_year: Option<i32>,
}

/// Latest-year values of the aspect's key ratios. Ratios absent from the
/// table or missing in that year are skipped.
pub fn latest_key_metrics(ratios: Option<&YearTable>, aspect: Aspect) -> Vec<KeyMetric> {
    let (table, year) = match ratios.and_then(|t| t.latest_year().map(|y| (t, y))) {
        Some(found) => found,
        None => return Vec::new(),
    };
    aspect
        .key_metrics()
        .iter()
        .filter_map(|name| {
            table.cell(name, year).map(|value| KeyMetric {
                name: name.to_string(),
                display_name: display_name(name),
                value,
            })
        })
        .collect()
}

/// Headline variables from the latest ratio row: revenue, current ratio,
/// ROA and debt-to-equity.
pub fn key_summary_variables(ratios: Option<&YearTable>) -> Vec<(&'static str, Option<f64>)> {
    const NAMES: [&str; 4] = ["revenue", "current_ratio", "roa", "debt_to_equity"];
    let latest = ratios.and_then(|t| t.latest_year().map(|y| (t, y)));
    NAMES
        .iter()
        .map(|name| (*name, latest.and_then(|(t, y)| t.cell(name, y))))
        .collect()
}

/// `reasoning_preview` of `None` keeps the full reasoning text.
pub fn build_scorecard(
    record: &FirmRecord,
    calculator: &ContributionCalculator,
    ratios: Option<&YearTable>,
    reasoning_preview: Option<usize>,
) -> Scorecard {
    let (reasoning, reasoning_truncated) = match reasoning_preview {
        Some(limit) => {
            let preview = record.reasoning_preview(limit);
            let truncated = preview != record.reasoning;
            (preview, truncated)
        }
        None => (record.reasoning.clone(), false),
    };

    let aspects = record
        .aspects()
        .iter()
        .map(|a| AspectDetail {
            aspect: a.aspect,
            score: a.score,
            status: a.status.clone(),
            weight: calculator.weights().get(a.aspect),
            reason: a.reason.clone(),
            analysis: a.analysis.clone(),
            key_metrics: latest_key_metrics(ratios, a.aspect),
        })
        .collect();

    Scorecard {
        firm_id: record.firm_id.clone(),
        final_score: record.final_score,
        category: record.category.clone(),
        recommendation: record.recommendation.clone(),
        reasoning,
        reasoning_truncated,
        genai_recommendation: record.genai_recommendation.clone(),
        contributions: calculator.compute(record),
        aspects,
        metrics_year: ratios.and_then(|t| t.latest_year()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::{AspectAssessment, YearRow};

    fn record() -> FirmRecord {
        let aspects = Aspect::ALL
            .iter()
            .map(|a| AspectAssessment {
                aspect: *a,
                score: 70.0,
                status: AspectStatus::Good,
                reason: "steady".into(),
                analysis: format!("{} analysis", a.label()),
            })
            .collect();
        FirmRecord::new("F-001", aspects, 70.0, "A", "Approve", "x".repeat(300), Some("Extend the facility".into()))
            .unwrap()
    }

    fn ratios() -> YearTable {
        YearTable::new(
            "ratios",
            vec!["current_ratio".into(), "quick_ratio".into(), "revenue".into()],
            vec![
                YearRow::new(2021).with("current_ratio", Some(1.4)).with("quick_ratio", Some(0.9)),
                YearRow::new(2022).with("current_ratio", Some(1.6)).with("quick_ratio", None).with("revenue", Some(1.0e6)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_latest_key_metrics_skip_missing() {
        let table = ratios();
        let metrics = latest_key_metrics(Some(&table), Aspect::Liquidity);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].display_name, "Current Ratio");
        assert_eq!(metrics[0].value, 1.6);
        assert!(latest_key_metrics(None, Aspect::Liquidity).is_empty());
    }

    #[test]
    fn test_key_summary_variables() {
        let table = ratios();
        let vars = key_summary_variables(Some(&table));
        assert_eq!(vars[0], ("revenue", Some(1.0e6)));
        assert_eq!(vars[2], ("roa", None));
        assert!(key_summary_variables(None).iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_scorecard() {
        let table = ratios();
        let card = build_scorecard(&record(), &ContributionCalculator::default(), Some(&table), Some(200));
        assert!(card.reasoning_truncated);
        assert_eq!(card.reasoning.len(), 203);
        assert_eq!(card.contributions[0].aspect, Aspect::Profitability);
        assert_eq!(card.aspects.len(), 7);
        assert_eq!(card.aspects[0].weight, 0.15);
        assert_eq!(card.metrics_year, Some(2022));

        let full = build_scorecard(&record(), &ContributionCalculator::default(), None, None);
        assert!(!full.reasoning_truncated);
        assert_eq!(full.reasoning.len(), 300);
        assert!(full.aspects.iter().all(|a| a.key_metrics.is_empty()));
    }
}
