use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AggregateStats, CompanyInfo, FirmRecord, YearTable};

/// The seven input tables and the file each one is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    CreditScore,
    Aggregates,
    Ratios,
    CompanyInfo,
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl TableKind {
    pub const ALL: [TableKind; 7] = [
        TableKind::CreditScore,
        TableKind::Aggregates,
        TableKind::Ratios,
        TableKind::CompanyInfo,
        TableKind::BalanceSheet,
        TableKind::IncomeStatement,
        TableKind::CashFlow,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TableKind::CreditScore => "credit_score",
            TableKind::Aggregates => "agg",
            TableKind::Ratios => "ratios",
            TableKind::CompanyInfo => "company_info",
            TableKind::BalanceSheet => "balance_sheet",
            TableKind::IncomeStatement => "income_info",
            TableKind::CashFlow => "cash_flow",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TableKind::CreditScore => "df_credit_score.csv",
            TableKind::Aggregates => "df_agg.csv",
            TableKind::Ratios => "df_ratios.csv",
            TableKind::CompanyInfo => "company_info_sub.csv",
            TableKind::BalanceSheet => "balance_sheet_sub.csv",
            TableKind::IncomeStatement => "income_info_sub.csv",
            TableKind::CashFlow => "cash_flow_sub.csv",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Read-only snapshot of every input table for one analysis session.
///
/// Any table may be absent; engines treat an absent table the same as a
/// missing metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabularStore {
    pub credit_score: Option<FirmRecord>,
    pub aggregates: Option<AggregateStats>,
    pub ratios: Option<YearTable>,
    pub company_info: Option<CompanyInfo>,
    pub balance_sheet: Option<YearTable>,
    pub income_statement: Option<YearTable>,
    pub cash_flow: Option<YearTable>,
}

impl TabularStore {
    pub fn current_firm_id(&self) -> String {
        self.credit_score
            .as_ref()
            .map(|r| r.firm_id.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn statement(&self, kind: TableKind) -> Option<&YearTable> {
        match kind {
            TableKind::Ratios => self.ratios.as_ref(),
            TableKind::BalanceSheet => self.balance_sheet.as_ref(),
            TableKind::IncomeStatement => self.income_statement.as_ref(),
            TableKind::CashFlow => self.cash_flow.as_ref(),
            _ => None,
        }
    }

    pub fn is_loaded(&self, kind: TableKind) -> bool {
        match kind {
            TableKind::CreditScore => self.credit_score.is_some(),
            TableKind::Aggregates => self.aggregates.is_some(),
            TableKind::CompanyInfo => self.company_info.is_some(),
            other => self.statement(other).is_some(),
        }
    }
}
