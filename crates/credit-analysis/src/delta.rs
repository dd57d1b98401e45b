//! Year-over-year change for any numeric field.
//!
//! The engine is metric-agnostic: ratios, statement lines and aggregates all
//! go through [`delta`]. A missing input yields an undefined change, and a
//! zero prior value yields an undefined percentage (including 0 → 0).

use credit_core::stats::finite;
use credit_core::{CreditResult, YearTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDirection {
    Up,
    Down,
    Flat,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub absolute_change: Option<f64>,
    pub percent_change: Option<f64>,
    pub direction: ChangeDirection,
}

impl Delta {
    pub fn undefined() -> Self {
        Self {
            absolute_change: None,
            percent_change: None,
            direction: ChangeDirection::Undefined,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.direction != ChangeDirection::Undefined
    }
}

/// Change from `previous` to `current`.
pub fn delta(current: Option<f64>, previous: Option<f64>) -> Delta {
    let (current, previous) = match (finite(current), finite(previous)) {
        (Some(c), Some(p)) => (c, p),
        _ => return Delta::undefined(),
    };

    // overflow to ±inf has no meaningful change
    let absolute = match finite(Some(current - previous)) {
        Some(a) => a,
        None => return Delta::undefined(),
    };
    let percent = if previous == 0.0 {
        None
    } else {
        finite(Some(absolute / previous * 100.0))
    };

    let direction = if absolute > 0.0 {
        ChangeDirection::Up
    } else if absolute < 0.0 {
        ChangeDirection::Down
    } else {
        ChangeDirection::Flat
    };

    Delta {
        absolute_change: Some(absolute),
        percent_change: percent,
        direction,
    }
}

/// A value in a given year compared with an earlier year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearOverYear {
    pub year: i32,
    pub previous_year: i32,
    pub value: Option<f64>,
    pub previous_value: Option<f64>,
    pub delta: Delta,
}

/// Change of `metric` between two years of a table. An absent table yields an
/// undefined change; a column outside the table schema is an error.
pub fn year_over_year(
    table: Option<&YearTable>,
    metric: &str,
    year: i32,
    previous_year: i32,
) -> CreditResult<YearOverYear> {
    let (value, previous_value) = match table {
        Some(t) => (t.value(metric, year)?, t.value(metric, previous_year)?),
        None => (None, None),
    };
    Ok(YearOverYear {
        year,
        previous_year,
        value,
        previous_value,
        delta: delta(value, previous_value),
    })
}

/// Change between the two most recent years of the table, if it has two.
pub fn latest_change(table: Option<&YearTable>, metric: &str) -> CreditResult<Option<YearOverYear>> {
    match table.and_then(|t| t.latest_pair()) {
        Some((latest, previous)) => year_over_year(table, metric, latest, previous).map(Some),
        None => {
            if let Some(t) = table {
                // still surface schema errors on short tables
                t.series(metric)?;
            }
            Ok(None)
        }
    }
}
