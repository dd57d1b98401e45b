//! Ratio schema: each ratio is tagged once with an interpretation category,
//! an explorer group and (when known) its formula.
//!
//! Known ratios carry explicit tags. Any other column is tagged when the
//! catalog is built, by keyword, in this priority order: profitability,
//! liquidity, leverage, efficiency, coverage, days, general.

use serde::{Deserialize, Serialize};

fn contains_any(name: &str, keys: &[&str]) -> bool {
    keys.iter().any(|k| name.contains(*k))
}

/// Drives which level-threshold table interprets a metric's mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    Profitability,
    Liquidity,
    Leverage,
    Efficiency,
    Coverage,
    InventoryDays,
    ReceivableDays,
    OtherDays,
    General,
}

impl MetricCategory {
    /// Keyword inference for names not in the known-ratio table.
    pub fn infer(name: &str) -> Self {
        let name = name.to_lowercase();

        if contains_any(&name, &["roa", "roe", "margin"]) {
            MetricCategory::Profitability
        } else if contains_any(&name, &["current_ratio", "quick_ratio", "cash_ratio"]) {
            MetricCategory::Liquidity
        } else if contains_any(&name, &["debt_to_equity", "debt_to_assets"]) {
            MetricCategory::Leverage
        } else if contains_any(&name, &["turnover"]) {
            MetricCategory::Efficiency
        } else if contains_any(&name, &["interest_coverage", "dscr"]) {
            MetricCategory::Coverage
        } else if name == "days_inventory" {
            MetricCategory::InventoryDays
        } else if name == "days_receivable" {
            MetricCategory::ReceivableDays
        } else if contains_any(&name, &["days_"]) {
            MetricCategory::OtherDays
        } else {
            MetricCategory::General
        }
    }
}

/// Section of the ratio explorer a ratio is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatioGroup {
    Liquidity,
    Solvency,
    Profitability,
    ActivityEfficiency,
    CashFlow,
    Structure,
}

impl RatioGroup {
    pub const ALL: [RatioGroup; 6] = [
        RatioGroup::Liquidity,
        RatioGroup::Solvency,
        RatioGroup::Profitability,
        RatioGroup::ActivityEfficiency,
        RatioGroup::CashFlow,
        RatioGroup::Structure,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            RatioGroup::Liquidity => "Liquidity Ratios",
            RatioGroup::Solvency => "Solvency Ratios",
            RatioGroup::Profitability => "Profitability Ratios",
            RatioGroup::ActivityEfficiency => "Activity/Efficiency Ratios",
            RatioGroup::CashFlow => "Cash Flow Ratios",
            RatioGroup::Structure => "Structure Ratios",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            RatioGroup::Liquidity => &["current_ratio", "quick_ratio", "cash_ratio", "working_capital"],
            RatioGroup::Solvency => &["debt_to_equity", "debt_to_assets", "equity_to_assets", "leverage", "long_term_debt_ratio"],
            RatioGroup::Profitability => &["roa", "roe", "gross_margin", "gross_profit_margin", "net_profit_margin", "ebitda_margin"],
            RatioGroup::ActivityEfficiency => &["turnover", "days_"],
            RatioGroup::CashFlow => &["ocf_ratio", "free_cash_flow", "cash_quality_ratio"],
            RatioGroup::Structure => &["fund_flow", "equity_to_asset", "net_margin_ratio"],
        }
    }

    /// Every group whose keywords appear in `name`, in section order. Names
    /// matching no group are left out of the explorer.
    pub fn infer(name: &str) -> Vec<Self> {
        let name = name.to_lowercase();
        RatioGroup::ALL
            .iter()
            .copied()
            .filter(|g| contains_any(&name, g.keywords()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub category: MetricCategory,
    /// Explorer sections listing this ratio; empty when uncategorised.
    pub groups: Vec<RatioGroup>,
    pub formula: Option<String>,
}

impl MetricDefinition {
    /// `current_ratio` → `Current Ratio`
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

struct KnownRatio {
    name: &'static str,
    category: MetricCategory,
    groups: &'static [RatioGroup],
    formula: &'static str,
}

const fn known(
    name: &'static str,
    category: MetricCategory,
    groups: &'static [RatioGroup],
    formula: &'static str,
) -> KnownRatio {
    KnownRatio {
        name,
        category,
        groups,
        formula,
    }
}

use self::MetricCategory as C;
use self::RatioGroup as G;

const KNOWN_RATIOS: &[KnownRatio] = &[
    known("current_ratio", C::Liquidity, &[G::Liquidity], "Current Assets / Current Liabilities"),
    known("quick_ratio", C::Liquidity, &[G::Liquidity], "(Current Assets - Inventory) / Current Liabilities"),
    known("cash_ratio", C::Liquidity, &[G::Liquidity], "Cash & Cash Equivalents / Current Liabilities"),
    known("working_capital_ratio", C::General, &[G::Liquidity], ""),
    known("debt_to_equity", C::Leverage, &[G::Solvency], "Total Debt / Total Equity"),
    known("debt_to_assets", C::Leverage, &[G::Solvency], "Total Debt / Total Assets"),
    known("equity_to_assets", C::General, &[G::Solvency, G::Structure], "Total Equity / Total Assets"),
    known("long_term_debt_ratio", C::General, &[G::Solvency], ""),
    known("roa", C::Profitability, &[G::Profitability], "Net Income / Total Assets"),
    known("roe", C::Profitability, &[G::Profitability], "Net Income / Total Equity"),
    known("gross_margin", C::Profitability, &[G::Profitability], "Gross Profit / Revenue"),
    known("gross_profit_margin", C::Profitability, &[G::Profitability], "Gross Profit / Revenue"),
    known("net_profit_margin", C::Profitability, &[G::Profitability], "Net Income / Revenue"),
    known("ebitda_margin", C::Profitability, &[G::Profitability], ""),
    known("asset_turnover", C::Efficiency, &[G::ActivityEfficiency], "Revenue / Total Assets"),
    known("inventory_turnover", C::Efficiency, &[G::ActivityEfficiency], "Cost of Goods Sold / Average Inventory"),
    known("days_inventory", C::InventoryDays, &[G::ActivityEfficiency], "365 / Inventory Turnover"),
    known("days_receivable", C::ReceivableDays, &[G::ActivityEfficiency], "365 / Receivables Turnover"),
    known("days_payable", C::OtherDays, &[G::ActivityEfficiency], ""),
    known("interest_coverage", C::Coverage, &[], "EBIT / Interest Expense"),
    known("dscr", C::Coverage, &[], "Operating Cash Flow / Total Debt Service"),
    known("cash_coverage", C::General, &[], ""),
    known("ocf_ratio", C::General, &[G::CashFlow], "Operating Cash Flow / Revenue"),
    known("fcf_ratio", C::General, &[], ""),
    known("free_cash_flow", C::General, &[G::CashFlow], ""),
    known("cash_quality_ratio", C::General, &[G::CashFlow], ""),
    known("cash_conversion_cycle", C::General, &[], ""),
    known("fund_flow", C::General, &[G::Structure], ""),
    known("net_margin_ratio", C::Profitability, &[G::Structure], ""),
];

/// Definition for `name`: the explicit entry when known, keyword-inferred otherwise.
pub fn define(name: &str) -> MetricDefinition {
    let key = name.to_lowercase();
    match KNOWN_RATIOS.iter().find(|k| k.name == key) {
        Some(k) => MetricDefinition {
            name: name.to_string(),
            category: k.category,
            groups: k.groups.to_vec(),
            formula: Some(k.formula).filter(|f| !f.is_empty()).map(str::to_string),
        },
        None => MetricDefinition {
            name: name.to_string(),
            category: MetricCategory::infer(name),
            groups: RatioGroup::infer(name),
            formula: None,
        },
    }
}

/// Tagged definitions for a table's ratio columns, in column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
}

impl MetricCatalog {
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            definitions: columns
                .iter()
                .map(|c| c.as_ref())
                .filter(|c| *c != "firm_id" && *c != "year")
                .map(define)
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    /// Ratios listed under `group`, in column order.
    pub fn group(&self, group: RatioGroup) -> Vec<&MetricDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.groups.contains(&group))
            .collect()
    }
}

pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_priority() {
        assert_eq!(MetricCategory::infer("operating_margin"), MetricCategory::Profitability);
        assert_eq!(MetricCategory::infer("Adjusted_Quick_Ratio"), MetricCategory::Liquidity);
        assert_eq!(MetricCategory::infer("net_debt_to_equity"), MetricCategory::Leverage);
        assert_eq!(MetricCategory::infer("receivables_turnover"), MetricCategory::Efficiency);
        assert_eq!(MetricCategory::infer("ebitda_interest_coverage"), MetricCategory::Coverage);
        assert_eq!(MetricCategory::infer("days_inventory"), MetricCategory::InventoryDays);
        assert_eq!(MetricCategory::infer("days_sales_outstanding"), MetricCategory::OtherDays);
        assert_eq!(MetricCategory::infer("altman_z"), MetricCategory::General);
        // profitability wins over leverage when both keywords appear
        assert_eq!(MetricCategory::infer("roe_debt_to_equity_adj"), MetricCategory::Profitability);
    }

    #[test]
    fn test_explicit_tags_override_keywords() {
        // "net_margin_ratio" would also be inferred as profitability, but is listed under structure
        let def = define("net_margin_ratio");
        assert_eq!(def.groups, vec![RatioGroup::Structure]);
        // "cash_coverage" has no coverage keyword and stays general
        assert_eq!(MetricCategory::infer("cash_coverage"), MetricCategory::General);
        assert_eq!(define("cash_coverage").category, MetricCategory::General);
        assert_eq!(define("current_ratio").formula.as_deref(), Some("Current Assets / Current Liabilities"));
        assert!(define("fund_flow").formula.is_none());
    }

    #[test]
    fn test_catalog_groups() {
        let catalog = MetricCatalog::from_columns(&["firm_id", "year", "current_ratio", "roa", "altman_z", "leverage_multiple"]);
        assert_eq!(catalog.definitions().len(), 4);
        assert_eq!(catalog.group(RatioGroup::Liquidity)[0].name, "current_ratio");
        assert_eq!(catalog.group(RatioGroup::Solvency)[0].name, "leverage_multiple");
        assert!(catalog.get("altman_z").unwrap().groups.is_empty());
    }

    #[test]
    fn test_ratio_listed_under_every_matching_group() {
        assert_eq!(define("equity_to_assets").groups, vec![RatioGroup::Solvency, RatioGroup::Structure]);
        assert_eq!(
            RatioGroup::infer("adjusted_equity_to_assets"),
            vec![RatioGroup::Solvency, RatioGroup::Structure]
        );
        assert!(RatioGroup::infer("altman_z").is_empty());

        let catalog = MetricCatalog::from_columns(&["equity_to_assets", "fund_flow"]);
        assert_eq!(catalog.group(RatioGroup::Solvency).len(), 1);
        let structure: Vec<&str> = catalog.group(RatioGroup::Structure).iter().map(|d| d.name.as_str()).collect();
        assert_eq!(structure, vec!["equity_to_assets", "fund_flow"]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("current_ratio"), "Current Ratio");
        assert_eq!(display_name("roa"), "Roa");
        assert_eq!(display_name("ppe_net"), "Ppe Net");
    }
}
