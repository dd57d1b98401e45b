//! View models for the financial statements explorer.
//!
//! Statement columns are grouped into sections by keyword. A column goes to
//! the first section whose keyword list matches; columns matching nothing are
//! collected under "Other".

use std::collections::BTreeSet;

use credit_core::{CompanyInfo, Observation, TableKind, YearTable};
use serde::Serialize;

use crate::catalog::display_name;
use crate::delta::{delta, Delta};

/// Union of the balance sheet and income statement years, ascending.
pub fn observation_years(balance: Option<&YearTable>, income: Option<&YearTable>) -> Vec<i32> {
    let years: BTreeSet<i32> = balance
        .into_iter()
        .chain(income)
        .flat_map(|t| t.years())
        .collect();
    years.into_iter().collect()
}

/// One statement line across the observation years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: String,
    pub label: String,
    pub values: Vec<Observation>,
    /// Latest year against the one before; `None` with fewer than two years.
    pub change: Option<Delta>,
}

impl LineItem {
    fn collect(name: &str, label: String, years: &[i32], value_at: impl Fn(i32) -> Option<f64>) -> Self {
        let values: Vec<Observation> = years
            .iter()
            .map(|year| Observation::new(*year, value_at(*year)))
            .collect();
        let change = match values.as_slice() {
            [.., previous, latest] => Some(delta(latest.value, previous.value)),
            _ => None,
        };
        Self {
            name: name.to_string(),
            label,
            values,
            change,
        }
    }

    pub fn value(&self, year: i32) -> Option<f64> {
        self.values.iter().find(|o| o.year == year).and_then(|o| o.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyVariable {
    NetTurnover,
    NonCurrentAssetsTotal,
    CapitalAndReservesTotal,
    Liabilities,
    ProfitAfterTax,
    OperatingResult,
}

impl KeyVariable {
    pub const ALL: [KeyVariable; 6] = [
        KeyVariable::NetTurnover,
        KeyVariable::NonCurrentAssetsTotal,
        KeyVariable::CapitalAndReservesTotal,
        KeyVariable::Liabilities,
        KeyVariable::ProfitAfterTax,
        KeyVariable::OperatingResult,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            KeyVariable::NetTurnover => "Net Turnover",
            KeyVariable::NonCurrentAssetsTotal => "Non-Current Assets Total",
            KeyVariable::CapitalAndReservesTotal => "Capital and Reserves Total",
            KeyVariable::Liabilities => "Liabilities",
            KeyVariable::ProfitAfterTax => "Profit after Tax",
            KeyVariable::OperatingResult => "Operating Result",
        }
    }

    /// Column identifier used in view output.
    pub fn key(&self) -> &'static str {
        match self {
            KeyVariable::NetTurnover => "revenue",
            KeyVariable::NonCurrentAssetsTotal => "ppe_net+other_noncurrent_assets",
            KeyVariable::CapitalAndReservesTotal => "equity_end",
            KeyVariable::Liabilities => "total_liabilities",
            KeyVariable::ProfitAfterTax => "net_income",
            KeyVariable::OperatingResult => "ebit",
        }
    }

    /// Absent table or column reads as missing.
    pub fn value(&self, balance: Option<&YearTable>, income: Option<&YearTable>, year: i32) -> Option<f64> {
        let from = |table: Option<&YearTable>, column: &str| table.and_then(|t| t.cell(column, year));
        match self {
            KeyVariable::NetTurnover => from(income, "revenue"),
            KeyVariable::NonCurrentAssetsTotal => {
                // both parts required
                Some(from(balance, "ppe_net")? + from(balance, "other_noncurrent_assets")?)
            }
            KeyVariable::CapitalAndReservesTotal => from(balance, "equity_end"),
            KeyVariable::Liabilities => from(balance, "total_liabilities"),
            KeyVariable::ProfitAfterTax => from(income, "net_income"),
            KeyVariable::OperatingResult => from(income, "ebit"),
        }
    }
}

pub fn key_variables(balance: Option<&YearTable>, income: Option<&YearTable>) -> Vec<LineItem> {
    let years = observation_years(balance, income);
    KeyVariable::ALL
        .iter()
        .map(|var| LineItem::collect(var.key(), var.label().to_string(), &years, |y| var.value(balance, income, y)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSection {
    pub title: String,
    pub lines: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementView {
    pub kind: TableKind,
    pub years: Vec<i32>,
    pub sections: Vec<StatementSection>,
}

impl StatementView {
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

type SectionRules = &'static [(&'static str, &'static [&'static str])];

const BALANCE_SHEET_SECTIONS: SectionRules = &[
    (
        "Assets",
        &[
            "cash",
            "receivable",
            "inventory",
            "other_current_assets",
            "current_assets",
            "ppe_net",
            "other_noncurrent",
            "non_current_assets",
            "total_assets",
        ],
    ),
    (
        "Liabilities",
        &[
            "short_term_debt",
            "accounts_payable",
            "other_current_liabilities",
            "current_liabilities",
            "long_term_debt",
            "total_liabilities",
        ],
    ),
    (
        "Equity",
        &["equity_end", "capital", "reserves", "retained_earnings", "total_equity"],
    ),
];

const CASH_FLOW_SECTIONS: SectionRules = &[
    ("Operating Cash Flow", &["operating", "ocf", "working"]),
    ("Investing Cash Flow", &["investing", "icapex", "capex"]),
    ("Financing Cash Flow", &["financing", "dividend", "stock"]),
];

/// Income statement lines are ordered by the first keyword they contain.
const INCOME_ORDER: &[&str] = &[
    "revenue", "sales", "turnover",
    "cost", "cogs",
    "gross",
    "operating", "ebit",
    "interest",
    "tax",
    "net", "profit", "earnings",
];

const OTHER_SECTION: &str = "Other";

fn line_for(table: &YearTable, column: &str, years: &[i32]) -> LineItem {
    LineItem::collect(column, display_name(column), years, |y| table.cell(column, y))
}

fn sectioned(table: &YearTable, years: &[i32], rules: SectionRules) -> Vec<StatementSection> {
    let mut buckets: Vec<Vec<LineItem>> = vec![Vec::new(); rules.len() + 1];
    for column in table.columns() {
        let lower = column.to_lowercase();
        let slot = rules
            .iter()
            .position(|(_, keys)| keys.iter().any(|k| lower.contains(k)))
            .unwrap_or(rules.len());
        buckets[slot].push(line_for(table, column, years));
    }

    rules
        .iter()
        .map(|(title, _)| *title)
        .chain(std::iter::once(OTHER_SECTION))
        .zip(buckets)
        .filter(|(_, lines)| !lines.is_empty())
        .map(|(title, lines)| StatementSection {
            title: title.to_string(),
            lines,
        })
        .collect()
}

fn income_rank(column: &str) -> usize {
    let lower = column.to_lowercase();
    INCOME_ORDER
        .iter()
        .position(|k| lower.contains(k))
        .unwrap_or(INCOME_ORDER.len())
}

/// Balance sheet, income statement or cash flow view over `years`.
///
/// Returns `None` for table kinds that are not statements.
pub fn statement_view(kind: TableKind, table: &YearTable, years: &[i32]) -> Option<StatementView> {
    let sections = match kind {
        TableKind::BalanceSheet => sectioned(table, years, BALANCE_SHEET_SECTIONS),
        TableKind::CashFlow => sectioned(table, years, CASH_FLOW_SECTIONS),
        TableKind::IncomeStatement => {
            let mut columns: Vec<&String> = table.columns().iter().collect();
            // stable: ties keep column order
            columns.sort_by_key(|c| income_rank(c));
            let lines: Vec<LineItem> = columns.into_iter().map(|c| line_for(table, c, years)).collect();
            if lines.is_empty() {
                Vec::new()
            } else {
                vec![StatementSection {
                    title: "Income Statement".to_string(),
                    lines,
                }]
            }
        }
        _ => return None,
    };
    Some(StatementView {
        kind,
        years: years.to_vec(),
        sections,
    })
}

/// Non-current against current assets for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssetStructure {
    pub year: i32,
    pub non_current: Option<f64>,
    pub current: Option<f64>,
}

const NON_CURRENT_PARTS: [&str; 2] = ["ppe_net", "other_noncurrent_assets"];
const CURRENT_PARTS: [&str; 4] = ["cash", "receivables", "inventory", "other_current_assets"];

/// Sum of the parts that are present; `None` when none are.
fn sum_present(table: &YearTable, year: i32, parts: &[&str]) -> Option<f64> {
    parts
        .iter()
        .filter_map(|p| table.cell(p, year))
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

pub fn asset_structure(balance: Option<&YearTable>, years: &[i32]) -> Vec<AssetStructure> {
    years
        .iter()
        .map(|year| AssetStructure {
            year: *year,
            non_current: balance.and_then(|t| sum_present(t, *year, &NON_CURRENT_PARTS)),
            current: balance.and_then(|t| sum_present(t, *year, &CURRENT_PARTS)),
        })
        .collect()
}

/// Non-empty company fields other than the firm id, in source order.
pub fn company_profile(info: Option<&CompanyInfo>) -> Vec<(String, String)> {
    info.map(|i| {
        i.fields
            .iter()
            .filter(|(k, v)| k != "firm_id" && !v.trim().is_empty())
            .map(|(k, v)| (display_name(k), v.trim().to_string()))
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::ChangeDirection;
    use approx::assert_relative_eq;
    use credit_core::YearRow;

    fn balance() -> YearTable {
        YearTable::new(
            "balance_sheet",
            vec![
                "cash".into(),
                "receivables".into(),
                "other_current_liabilities".into(),
                "ppe_net".into(),
                "other_noncurrent_assets".into(),
                "equity_end".into(),
                "total_liabilities".into(),
                "goodwill".into(),
            ],
            vec![
                YearRow::new(2021)
                    .with("cash", Some(100.0))
                    .with("ppe_net", Some(500.0))
                    .with("other_noncurrent_assets", Some(50.0))
                    .with("equity_end", Some(400.0))
                    .with("total_liabilities", Some(0.0)),
                YearRow::new(2022)
                    .with("cash", Some(120.0))
                    .with("receivables", Some(80.0))
                    .with("ppe_net", Some(520.0))
                    .with("other_noncurrent_assets", None)
                    .with("equity_end", Some(440.0))
                    .with("total_liabilities", Some(250.0)),
            ],
        )
        .unwrap()
    }

    fn income() -> YearTable {
        YearTable::new(
            "income_info",
            vec!["net_income".into(), "tax_expense".into(), "ebit".into(), "revenue".into(), "depreciation".into()],
            vec![
                YearRow::new(2022).with("revenue", Some(1200.0)).with("net_income", Some(90.0)).with("ebit", Some(150.0)),
                YearRow::new(2023).with("revenue", Some(1500.0)).with("net_income", Some(72.0)).with("ebit", Some(150.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_observation_years_union() {
        let (b, i) = (balance(), income());
        assert_eq!(observation_years(Some(&b), Some(&i)), vec![2021, 2022, 2023]);
        assert_eq!(observation_years(None, Some(&i)), vec![2022, 2023]);
        assert!(observation_years(None, None).is_empty());
    }

    #[test]
    fn test_key_variables() {
        let (b, i) = (balance(), income());
        let vars = key_variables(Some(&b), Some(&i));
        assert_eq!(vars.len(), 6);

        let turnover = &vars[0];
        assert_eq!(turnover.label, "Net Turnover");
        assert_eq!(turnover.value(2021), None);
        let change = turnover.change.unwrap();
        assert_relative_eq!(change.percent_change.unwrap(), 25.0, epsilon = 1e-9);

        // 2022 lacks other_noncurrent_assets, so the total is missing
        let non_current = &vars[1];
        assert_eq!(non_current.value(2021), Some(550.0));
        assert_eq!(non_current.value(2022), None);

        // balance sheet has no 2023 row: latest-vs-previous is undefined
        assert!(!vars[3].change.unwrap().is_defined());

        let operating = &vars[5];
        assert_eq!(operating.change.unwrap().direction, ChangeDirection::Flat);
    }

    #[test]
    fn test_key_variables_with_missing_tables() {
        let vars = key_variables(None, None);
        assert!(vars.iter().all(|v| v.values.is_empty() && v.change.is_none()));
    }

    #[test]
    fn test_balance_sheet_sections() {
        let b = balance();
        let view = statement_view(TableKind::BalanceSheet, &b, &b.years()).unwrap();
        let titles: Vec<&str> = view.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Assets", "Liabilities", "Equity", "Other"]);
        assert_eq!(view.line_count(), 8);

        let liabilities = &view.sections[1];
        let names: Vec<&str> = liabilities.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["other_current_liabilities", "total_liabilities"]);

        // zero prior value: absolute change only
        let total = &liabilities.lines[1];
        assert_eq!(total.change.unwrap().absolute_change, Some(250.0));
        assert_eq!(total.change.unwrap().percent_change, None);
        assert_eq!(view.sections[3].lines[0].label, "Goodwill");
    }

    #[test]
    fn test_income_statement_order() {
        let i = income();
        let view = statement_view(TableKind::IncomeStatement, &i, &i.years()).unwrap();
        let names: Vec<&str> = view.sections[0].lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["revenue", "ebit", "tax_expense", "net_income", "depreciation"]);
        assert!(statement_view(TableKind::Ratios, &i, &[]).is_none());
    }

    #[test]
    fn test_cash_flow_sections() {
        let cf = YearTable::new(
            "cash_flow",
            vec!["operating_cash_flow".into(), "capex".into(), "dividends_paid".into(), "fx_effect".into()],
            vec![YearRow::new(2023).with("operating_cash_flow", Some(210.0))],
        )
        .unwrap();
        let view = statement_view(TableKind::CashFlow, &cf, &cf.years()).unwrap();
        let titles: Vec<&str> = view.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Operating Cash Flow", "Investing Cash Flow", "Financing Cash Flow", "Other"]
        );
        // single year: no change column
        assert!(view.sections[0].lines[0].change.is_none());
    }

    #[test]
    fn test_asset_structure_sums_present_parts() {
        let b = balance();
        let rows = asset_structure(Some(&b), &[2021, 2022, 2023]);
        assert_eq!(rows[0].non_current, Some(550.0));
        assert_eq!(rows[0].current, Some(100.0));
        assert_eq!(rows[1].non_current, Some(520.0));
        assert_eq!(rows[1].current, Some(200.0));
        assert_eq!(rows[2].non_current, None);
        assert!(asset_structure(None, &[2021])[0].current.is_none());
    }

    #[test]
    fn test_company_profile() {
        let info = CompanyInfo {
            firm_id: Some("F-001".into()),
            fields: vec![
                ("firm_id".into(), "F-001".into()),
                ("company_name".into(), "Acme Ltd".into()),
                ("sector".into(), "  ".into()),
            ],
        };
        assert_eq!(company_profile(Some(&info)), vec![("Company Name".to_string(), "Acme Ltd".to_string())]);
        assert!(company_profile(None).is_empty());
    }
}
