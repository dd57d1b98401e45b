//! Per-ratio panels for the ratio explorer and the aggregated insights deck.

use credit_core::{AggregateStats, CreditResult, YearTable};
use serde::Serialize;

use crate::catalog::{define, MetricCatalog, MetricDefinition, RatioGroup};
use crate::delta::{latest_change, YearOverYear};
use crate::interpretation::{interpret, Interpretation};
use crate::statistics::{MetricStatistics, TrendStatisticsEngine};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioPanel {
    pub definition: MetricDefinition,
    /// `None` when the table has fewer than two years.
    pub latest: Option<YearOverYear>,
    pub statistics: MetricStatistics,
    pub interpretation: Interpretation,
    pub valid_points: usize,
    pub total_years: usize,
}

impl RatioPanel {
    pub fn narrative(&self) -> String {
        self.interpretation.sentences().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioSection {
    pub group: RatioGroup,
    pub panels: Vec<RatioPanel>,
}

pub struct RatioExplorer<'a> {
    ratios: &'a YearTable,
    stats: TrendStatisticsEngine<'a>,
    catalog: MetricCatalog,
}

impl<'a> RatioExplorer<'a> {
    pub fn new(ratios: &'a YearTable, aggregates: Option<&'a AggregateStats>) -> Self {
        Self {
            ratios,
            stats: TrendStatisticsEngine::new(aggregates, Some(ratios)),
            catalog: MetricCatalog::from_columns(ratios.columns()),
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn panel(&self, metric: &str) -> CreditResult<RatioPanel> {
        let definition = self
            .catalog
            .get(metric)
            .cloned()
            .unwrap_or_else(|| define(metric));
        let latest = latest_change(Some(self.ratios), metric)?;
        let statistics = self.stats.resolve(metric)?;
        let interpretation = interpret(&definition, &statistics);

        Ok(RatioPanel {
            definition,
            latest,
            statistics,
            interpretation,
            valid_points: self.ratios.valid_points(metric),
            total_years: self.ratios.years().len(),
        })
    }

    /// Grouped panels; groups without ratios and uncategorised ratios are omitted.
    pub fn sections(&self) -> CreditResult<Vec<RatioSection>> {
        let mut sections = Vec::new();
        for group in RatioGroup::ALL {
            let panels = self
                .catalog
                .group(group)
                .iter()
                .map(|d| self.panel(&d.name))
                .collect::<CreditResult<Vec<_>>>()?;
            if !panels.is_empty() {
                sections.push(RatioSection { group, panels });
            }
        }
        Ok(sections)
    }
}

/// One row of the aggregated insights deck, read purely from the aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightRow {
    pub metric: String,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub trend: Option<f64>,
    pub interpretation: Interpretation,
}

/// Every metric in the aggregate table, optionally filtered by a
/// case-insensitive substring of its name.
pub fn aggregated_insights(aggregates: &AggregateStats, search: Option<&str>) -> Vec<InsightRow> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    aggregates
        .metrics()
        .into_iter()
        .filter(|m| match &needle {
            Some(n) => m.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .map(|metric| {
            let statistics = TrendStatisticsEngine::new(Some(aggregates), None)
                .resolve(&metric)
                .unwrap_or_else(|_| MetricStatistics::undefined());
            let interpretation = interpret(&define(&metric), &statistics);
            InsightRow {
                mean: statistics.mean,
                std_dev: statistics.std_dev,
                trend: statistics.trend_slope,
                interpretation,
                metric,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::{CreditError, YearRow};

    fn ratios() -> YearTable {
        YearTable::new(
            "ratios",
            vec!["current_ratio".into(), "debt_to_equity".into(), "altman_z".into()],
            vec![
                YearRow::new(2020).with("current_ratio", Some(2.0)).with("debt_to_equity", Some(0.28)),
                YearRow::new(2021).with("current_ratio", Some(1.8)).with("debt_to_equity", Some(0.25)),
                YearRow::new(2022).with("current_ratio", Some(2.3)).with("debt_to_equity", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_panel() {
        let table = ratios();
        let explorer = RatioExplorer::new(&table, None);
        let panel = explorer.panel("current_ratio").unwrap();

        let latest = panel.latest.unwrap();
        assert_eq!(latest.year, 2022);
        assert!(latest.delta.percent_change.unwrap() > 27.0);
        assert_eq!(panel.valid_points, 3);
        assert_eq!(panel.total_years, 3);
        assert_eq!(panel.interpretation.level.to_string(), "Very strong liquidity");
        assert!(panel.narrative().contains("Liquidity position is strengthening"));
    }

    #[test]
    fn test_panel_with_missing_latest_value() {
        let table = ratios();
        let panel = RatioExplorer::new(&table, None).panel("debt_to_equity").unwrap();
        assert!(!panel.latest.unwrap().delta.is_defined());
        assert_eq!(panel.valid_points, 2);
        assert!(RatioExplorer::new(&table, None).panel("roe").is_err());
    }

    #[test]
    fn test_sections_hide_uncategorised() {
        let table = ratios();
        let sections = RatioExplorer::new(&table, None).sections().unwrap();
        let groups: Vec<RatioGroup> = sections.iter().map(|s| s.group).collect();
        assert_eq!(groups, vec![RatioGroup::Liquidity, RatioGroup::Solvency]);
        assert!(sections.iter().flat_map(|s| &s.panels).all(|p| p.definition.name != "altman_z"));
    }

    #[test]
    fn test_sections_repeat_ratio_in_each_group() {
        let table = YearTable::new(
            "ratios",
            vec!["equity_to_assets".into()],
            vec![
                YearRow::new(2021).with("equity_to_assets", Some(0.55)),
                YearRow::new(2022).with("equity_to_assets", Some(0.58)),
            ],
        )
        .unwrap();
        let sections = RatioExplorer::new(&table, None).sections().unwrap();
        let groups: Vec<RatioGroup> = sections.iter().map(|s| s.group).collect();
        assert_eq!(groups, vec![RatioGroup::Solvency, RatioGroup::Structure]);
        assert!(sections.iter().all(|s| s.panels.len() == 1 && s.panels[0].definition.name == "equity_to_assets"));
    }

    #[test]
    fn test_insights_filter() {
        let agg = AggregateStats::new(
            None,
            vec![
                ("roa_mean".into(), Some(0.12)),
                ("roa_std".into(), Some(0.03)),
                ("roa_trend".into(), Some(0.01)),
                ("current_ratio_mean".into(), None),
            ],
        );
        let all = aggregated_insights(&agg, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].interpretation.summary(), "Good profitability. High stability. Stable trend.");
        assert_eq!(all[1].interpretation.summary(), "No data available. No volatility data. No clear trend.");

        let filtered = aggregated_insights(&agg, Some("CURRENT"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].metric, "current_ratio");
    }

    #[test]
    fn test_unknown_metric_error_kind() {
        let table = ratios();
        assert!(matches!(
            RatioExplorer::new(&table, None).panel("ebitda_margin"),
            Err(CreditError::MetricNotFound(_))
        ));
    }
}
