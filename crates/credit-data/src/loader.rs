use std::fs::File;
use std::path::{Path, PathBuf};

use credit_core::{TableKind, TabularStore};
use tracing::{error, info, warn};

use crate::parse::{parse_aggregates, parse_company_info, parse_credit_score, parse_year_table};
use crate::LoadResult;

pub const DEFAULT_DATA_PATH: &str = "./data/";

/// Reads the seven input CSV files from one directory.
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_path: PathBuf,
}

impl DataLoader {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        self.data_path.join(kind.file_name())
    }

    /// Load every table. A missing or unreadable file leaves its table
    /// absent; this never fails as a whole.
    pub fn load(&self) -> TabularStore {
        let store = TabularStore {
            credit_score: self.load_table(TableKind::CreditScore, parse_credit_score),
            aggregates: self.load_table(TableKind::Aggregates, parse_aggregates),
            ratios: self.load_table(TableKind::Ratios, |f| parse_year_table("ratios", f)),
            company_info: self.load_table(TableKind::CompanyInfo, parse_company_info),
            balance_sheet: self.load_table(TableKind::BalanceSheet, |f| parse_year_table("balance_sheet", f)),
            income_statement: self.load_table(TableKind::IncomeStatement, |f| parse_year_table("income_info", f)),
            cash_flow: self.load_table(TableKind::CashFlow, |f| parse_year_table("cash_flow", f)),
        };

        let loaded = TableKind::ALL.iter().filter(|k| store.is_loaded(**k)).count();
        info!(
            "Loaded {}/{} tables from {} (firm {})",
            loaded,
            TableKind::ALL.len(),
            self.data_path.display(),
            store.current_firm_id()
        );
        store
    }

    fn load_table<T>(&self, kind: TableKind, parse: impl FnOnce(File) -> LoadResult<T>) -> Option<T> {
        let path = self.path_for(kind);
        if !path.exists() {
            warn!("File {} not found at {}", kind.file_name(), path.display());
            return None;
        }

        match File::open(&path).map_err(Into::into).and_then(parse) {
            Ok(table) => {
                tracing::debug!("Loaded {} from {}", kind, path.display());
                Some(table)
            }
            Err(e) => {
                error!("Error loading {}: {}", kind.file_name(), e);
                None
            }
        }
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("credit-data-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_directory_yields_empty_store() {
        let loader = DataLoader::new(scratch_dir("empty"));
        let store = loader.load();
        assert!(TableKind::ALL.iter().all(|k| !store.is_loaded(*k)));
        assert_eq!(store.current_firm_id(), "Unknown");
    }

    #[test]
    fn test_partial_load_skips_bad_files() {
        let dir = scratch_dir("partial");
        fs::write(dir.join("df_ratios.csv"), "firm_id,year,current_ratio\nF-9,2021,1.8\nF-9,2022,2.3\n").unwrap();
        fs::write(dir.join("balance_sheet_sub.csv"), "firm_id,cash\nF-9,10\n").unwrap();
        fs::write(dir.join("company_info_sub.csv"), "firm_id,company_name\nF-9,Acme\n").unwrap();

        let store = DataLoader::new(&dir).load();
        assert!(store.is_loaded(TableKind::Ratios));
        assert!(store.is_loaded(TableKind::CompanyInfo));
        // no year column
        assert!(!store.is_loaded(TableKind::BalanceSheet));
        assert!(!store.is_loaded(TableKind::CreditScore));
        assert_eq!(store.ratios.unwrap().latest_year(), Some(2022));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_paths() {
        let loader = DataLoader::default();
        assert_eq!(loader.path_for(TableKind::CashFlow), Path::new("./data/").join("cash_flow_sub.csv"));
    }
}
