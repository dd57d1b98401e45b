//! Page view models and their plain-text rendering.
//!
//! Each page is built once from the loaded store and either printed through
//! its `Display` impl or serialised as JSON.

use std::fmt;

use anyhow::{bail, Result};
use credit_analysis::{
    aggregated_insights, asset_structure, build_scorecard, company_profile, display_name, key_summary_variables,
    key_variables, observation_years, statement_view, total_contribution, AssetStructure, ContributionCalculator,
    InsightRow, LineItem, RatioExplorer, RatioPanel, RatioSection, Scorecard, StatementView,
};
use credit_core::{Aspect, TableKind, TabularStore};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::format::{format_number, format_percent, trend_indicator, MISSING};
use crate::state::ViewState;

pub struct Dashboard<'a> {
    store: &'a TabularStore,
    calculator: ContributionCalculator,
    reasoning_preview: usize,
}

impl<'a> Dashboard<'a> {
    pub fn new(store: &'a TabularStore, config: &DashboardConfig) -> Self {
        Self {
            store,
            calculator: ContributionCalculator::new(config.weights),
            reasoning_preview: config.reasoning_preview,
        }
    }

    /// Fails when the credit score table is not loaded.
    pub fn summary(&self, state: &ViewState) -> Result<SummaryView> {
        let record = match self.store.credit_score.as_ref() {
            Some(record) => record,
            None => bail!(
                "Credit score data is not available. Make sure {} exists in the data directory.",
                TableKind::CreditScore.file_name()
            ),
        };

        let preview = if state.full_reasoning {
            None
        } else {
            Some(self.reasoning_preview)
        };
        let ratios = self.store.ratios.as_ref();

        Ok(SummaryView {
            scorecard: build_scorecard(record, &self.calculator, ratios, preview),
            key_variables: key_summary_variables(ratios)
                .into_iter()
                .map(|(name, value)| KeyFigure {
                    label: display_name(name),
                    value,
                })
                .collect(),
            expanded: Aspect::ALL
                .iter()
                .copied()
                .filter(|a| state.is_aspect_expanded(*a))
                .collect(),
        })
    }

    pub fn ratios(&self) -> Result<RatiosView> {
        let sections = match self.store.ratios.as_ref() {
            Some(ratios) => RatioExplorer::new(ratios, self.store.aggregates.as_ref()).sections()?,
            None => Vec::new(),
        };
        Ok(RatiosView {
            firm_id: self.store.current_firm_id(),
            available: self.store.ratios.is_some(),
            sections,
        })
    }

    pub fn financials(&self) -> FinancialsView {
        let balance = self.store.balance_sheet.as_ref();
        let income = self.store.income_statement.as_ref();
        let years = observation_years(balance, income);

        let mut statements: Vec<StatementView> = [(TableKind::BalanceSheet, balance), (TableKind::IncomeStatement, income)]
            .into_iter()
            .filter_map(|(kind, table)| table.and_then(|t| statement_view(kind, t, &years)))
            .collect();
        // the cash flow statement keeps its own year axis
        if let Some(view) = self
            .store
            .cash_flow
            .as_ref()
            .and_then(|t| statement_view(TableKind::CashFlow, t, &t.years()))
        {
            statements.push(view);
        }

        FinancialsView {
            firm_id: self.store.current_firm_id(),
            key_variables: key_variables(balance, income),
            statements,
            asset_structure: asset_structure(balance, &years),
            company: company_profile(self.store.company_info.as_ref()),
            years,
        }
    }

    pub fn insights(&self, search: Option<&str>) -> InsightsView {
        InsightsView {
            firm_id: self.store.current_firm_id(),
            available: self.store.aggregates.is_some(),
            search: search.map(str::to_string),
            rows: self
                .store
                .aggregates
                .as_ref()
                .map(|agg| aggregated_insights(agg, search))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyFigure {
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub scorecard: Scorecard,
    pub key_variables: Vec<KeyFigure>,
    pub expanded: Vec<Aspect>,
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let card = &self.scorecard;
        writeln!(f, "Credit Analysis Summary: {}", card.firm_id)?;
        writeln!(
            f,
            "Final score: {}  |  Category: {}  |  Recommendation: {}",
            format_number(Some(card.final_score), 2),
            card.category,
            card.recommendation
        )?;
        writeln!(f)?;
        writeln!(f, "Reasoning: {}", card.reasoning)?;
        if card.reasoning_truncated {
            writeln!(f, "  (truncated; pass --full-reasoning for the full text)")?;
        }
        if let Some(ai) = &card.genai_recommendation {
            writeln!(f)?;
            writeln!(f, "AI recommendation: {}", ai)?;
        }

        writeln!(f)?;
        match card.metrics_year {
            Some(year) => writeln!(f, "Key variables ({})", year)?,
            None => writeln!(f, "Key variables")?,
        }
        for figure in &self.key_variables {
            writeln!(f, "  {:<16} {}", figure.label, format_number(figure.value, 2))?;
        }

        writeln!(f)?;
        writeln!(f, "Aspect contributions")?;
        for c in &card.contributions {
            writeln!(
                f,
                "  {:<14} {:>6} x {:.2} = {:>6}  [{}]  {}",
                c.aspect.label(),
                format_number(Some(c.score), 1),
                c.weight,
                format_number(Some(c.contribution), 2),
                c.status,
                c.reason
            )?;
        }
        writeln!(
            f,
            "  {:<14} {:>26}",
            "Total",
            format_number(Some(total_contribution(&card.contributions)), 2)
        )?;

        writeln!(f)?;
        writeln!(f, "Aspects")?;
        for detail in &card.aspects {
            let open = self.expanded.contains(&detail.aspect);
            writeln!(
                f,
                "  [{}] {:<14} {:>6}  {}",
                if open { "-" } else { "+" },
                detail.aspect.label(),
                format_number(Some(detail.score), 1),
                detail.status
            )?;
            if !open {
                continue;
            }
            if !detail.reason.is_empty() {
                writeln!(f, "      Reason: {}", detail.reason)?;
            }
            if !detail.analysis.is_empty() {
                writeln!(f, "      Analysis: {}", detail.analysis)?;
            }
            for metric in &detail.key_metrics {
                writeln!(f, "      {}: {}", metric.display_name, format_number(Some(metric.value), 2))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatiosView {
    pub firm_id: String,
    pub available: bool,
    pub sections: Vec<RatioSection>,
}

fn write_panel(f: &mut fmt::Formatter<'_>, panel: &RatioPanel) -> fmt::Result {
    let name = panel.definition.display_name();
    match &panel.latest {
        Some(latest) => writeln!(
            f,
            "{} ({}): {}  {}",
            name,
            latest.year,
            format_number(latest.value, 2),
            trend_indicator(&latest.delta)
        )?,
        None => writeln!(f, "{}: insufficient data for trend analysis", name)?,
    }
    if let Some(formula) = &panel.definition.formula {
        writeln!(f, "  Formula: {}", formula)?;
    }
    let stats = &panel.statistics;
    writeln!(
        f,
        "  Mean {} | Std {} | Trend {}",
        format_number(stats.mean, 3),
        format_number(stats.std_dev, 3),
        format_number(stats.trend_slope, 4)
    )?;
    writeln!(f, "  {} | {}", panel.interpretation.stability, panel.interpretation.trend)?;
    writeln!(f, "  {}", panel.narrative())?;
    writeln!(f, "  Data points: {}/{}", panel.valid_points, panel.total_years)
}

impl fmt::Display for RatiosView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ratio Explorer: {}", self.firm_id)?;
        if !self.available {
            return writeln!(f, "Ratio data is not available.");
        }
        if self.sections.is_empty() {
            return writeln!(f, "No categorised ratios found.");
        }
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "== {} ==", section.group.title())?;
            for panel in &section.panels {
                write_panel(f, panel)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialsView {
    pub firm_id: String,
    pub years: Vec<i32>,
    pub key_variables: Vec<LineItem>,
    pub statements: Vec<StatementView>,
    pub asset_structure: Vec<AssetStructure>,
    pub company: Vec<(String, String)>,
}

fn statement_title(kind: TableKind) -> &'static str {
    match kind {
        TableKind::BalanceSheet => "Balance Sheet",
        TableKind::IncomeStatement => "Income Statement",
        TableKind::CashFlow => "Cash Flow Statement",
        _ => "Statement",
    }
}

fn write_lines(f: &mut fmt::Formatter<'_>, lines: &[LineItem], years: &[i32]) -> fmt::Result {
    write!(f, "  {:<28}", "Item")?;
    for year in years {
        write!(f, " {:>16}", year)?;
    }
    writeln!(f, " {:>10}", "Change %")?;

    for line in lines {
        write!(f, "  {:<28}", line.label)?;
        for year in years {
            write!(f, " {:>16}", format_number(line.value(*year), 2))?;
        }
        let change = line
            .change
            .map(|d| format_percent(d.percent_change))
            .unwrap_or_else(|| MISSING.to_string());
        writeln!(f, " {:>10}", change)?;
    }
    Ok(())
}

impl fmt::Display for FinancialsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Financial Statements: {}", self.firm_id)?;

        if !self.company.is_empty() {
            writeln!(f)?;
            writeln!(f, "Company information")?;
            for (field, value) in &self.company {
                writeln!(f, "  {}: {}", field, value)?;
            }
        }

        if self.years.is_empty() {
            return writeln!(f, "No year data available");
        }
        let years: Vec<String> = self.years.iter().map(|y| y.to_string()).collect();
        writeln!(f, "Observation years: {}", years.join(", "))?;

        writeln!(f)?;
        writeln!(f, "Key financial variables")?;
        write_lines(f, &self.key_variables, &self.years)?;

        writeln!(f)?;
        writeln!(f, "Asset structure")?;
        for row in &self.asset_structure {
            writeln!(
                f,
                "  {}: non-current {} | current {}",
                row.year,
                format_number(row.non_current, 0),
                format_number(row.current, 0)
            )?;
        }

        for view in &self.statements {
            writeln!(f)?;
            writeln!(f, "=== {} ===", statement_title(view.kind))?;
            for section in &view.sections {
                writeln!(f, "-- {} --", section.title)?;
                write_lines(f, &section.lines, &view.years)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsView {
    pub firm_id: String,
    pub available: bool,
    pub search: Option<String>,
    pub rows: Vec<InsightRow>,
}

impl fmt::Display for InsightsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Insights: {}", self.firm_id)?;
        if !self.available {
            return writeln!(f, "Aggregated statistics are not available.");
        }
        if let Some(term) = &self.search {
            writeln!(f, "Filter '{}': {} metric(s)", term, self.rows.len())?;
        }
        if self.rows.is_empty() {
            return writeln!(f, "No metrics match.");
        }
        for row in &self.rows {
            writeln!(f)?;
            writeln!(f, "{}", display_name(&row.metric))?;
            writeln!(
                f,
                "  Mean {} | Std {} | Trend {}",
                format_number(row.mean, 3),
                format_number(row.std_dev, 3),
                format_number(row.trend, 4)
            )?;
            writeln!(f, "  {}", row.interpretation.summary())?;
        }
        Ok(())
    }
}
