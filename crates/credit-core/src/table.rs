use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::stats::finite;
use crate::{CreditError, CreditResult};

/// A single (year, value) observation. `value` is `None` when missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(year: i32, value: Option<f64>) -> Self {
        Self { year, value: finite(value) }
    }
}

/// One row of a year-keyed table (ratios or a financial statement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub year: i32,
    #[serde(default)]
    pub firm_id: Option<String>,
    pub values: HashMap<String, Option<f64>>,
}

impl YearRow {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            firm_id: None,
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: Option<f64>) -> Self {
        self.values.insert(column.to_string(), finite(value));
        self
    }
}

/// Column-oriented table with one row per year, ascending.
///
/// Used for the ratio series and the three financial statements. The column
/// list is the schema: asking for a column outside it is a caller error, while
/// a column inside it with no value for a year is simply missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTable {
    name: String,
    columns: Vec<String>,
    rows: BTreeMap<i32, YearRow>,
}

impl YearTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<YearRow>) -> CreditResult<Self> {
        let name = name.into();
        let mut by_year = BTreeMap::new();
        for row in rows {
            let year = row.year;
            if by_year.insert(year, row).is_some() {
                return Err(CreditError::DuplicateYear { table: name, year });
            }
        }
        Ok(Self {
            name,
            columns,
            rows: by_year,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value columns in schema order (`year` and `firm_id` excluded).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observation years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.rows.keys().copied().collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rows.keys().next_back().copied()
    }

    /// The two most recent years as `(latest, previous)`.
    pub fn latest_pair(&self) -> Option<(i32, i32)> {
        let mut years = self.rows.keys().rev();
        match (years.next(), years.next()) {
            (Some(latest), Some(previous)) => Some((*latest, *previous)),
            _ => None,
        }
    }

    pub fn row(&self, year: i32) -> Option<&YearRow> {
        self.rows.get(&year)
    }

    pub fn firm_id(&self) -> Option<&str> {
        self.rows.values().find_map(|r| r.firm_id.as_deref())
    }

    fn require(&self, column: &str) -> CreditResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(CreditError::MetricNotFound(format!("{} in {}", column, self.name)))
        }
    }

    /// Value of `column` in `year`. A year without a row is missing, not an error.
    pub fn value(&self, column: &str, year: i32) -> CreditResult<Option<f64>> {
        self.require(column)?;
        Ok(self.cell(column, year))
    }

    /// Same as [`YearTable::value`] but treats an unknown column as missing.
    pub fn cell(&self, column: &str, year: i32) -> Option<f64> {
        self.rows
            .get(&year)
            .and_then(|r| r.values.get(column).copied().flatten())
            .and_then(|v| finite(Some(v)))
    }

    /// Full series for `column`, one observation per year.
    pub fn series(&self, column: &str) -> CreditResult<Vec<Observation>> {
        self.require(column)?;
        Ok(self
            .rows
            .keys()
            .map(|year| Observation::new(*year, self.cell(column, *year)))
            .collect())
    }

    /// Number of years with a present value for `column`.
    pub fn valid_points(&self, column: &str) -> usize {
        self.rows
            .keys()
            .filter(|year| self.cell(column, **year).is_some())
            .count()
    }
}

/// The three precomputed aggregates per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Mean,
    StdDev,
    Trend,
}

impl StatKind {
    pub const ALL: [StatKind; 3] = [StatKind::Mean, StatKind::StdDev, StatKind::Trend];

    pub fn suffix(&self) -> &'static str {
        match self {
            StatKind::Mean => "_mean",
            StatKind::StdDev => "_std",
            StatKind::Trend => "_trend",
        }
    }

    pub fn column_for(&self, metric: &str) -> String {
        format!("{}{}", metric, self.suffix())
    }
}

/// Single-row table of `<metric>_mean`, `<metric>_std`, `<metric>_trend`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(default)]
    pub firm_id: Option<String>,
    columns: Vec<String>,
    values: HashMap<String, Option<f64>>,
}

impl AggregateStats {
    pub fn new(firm_id: Option<String>, cells: Vec<(String, Option<f64>)>) -> Self {
        let columns = cells.iter().map(|(c, _)| c.clone()).collect();
        let values = cells.into_iter().map(|(c, v)| (c, finite(v))).collect();
        Self {
            firm_id,
            columns,
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `None` when the column is absent from the schema, `Some(None)` when it
    /// exists but holds no value.
    pub fn lookup(&self, metric: &str, kind: StatKind) -> Option<Option<f64>> {
        self.values.get(&kind.column_for(metric)).copied()
    }

    /// Whether any of the three aggregate columns exist for `metric`.
    pub fn knows(&self, metric: &str) -> bool {
        StatKind::ALL.iter().any(|k| self.lookup(metric, *k).is_some())
    }

    /// Base metric names in first-seen column order.
    pub fn metrics(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for column in &self.columns {
            if column == "firm_id" {
                continue;
            }
            let base = StatKind::ALL
                .iter()
                .find_map(|k| column.strip_suffix(k.suffix()));
            if let Some(base) = base {
                if !seen.iter().any(|m| m == base) {
                    seen.push(base.to_string());
                }
            }
        }
        seen
    }
}
