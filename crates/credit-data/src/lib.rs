//! CSV loading for the credit dashboard's input tables.
//!
//! Every table is optional: a file that is absent or fails to parse is
//! logged and left out of the [`credit_core::TabularStore`].

pub mod error;
pub mod loader;
pub mod parse;

pub use error::*;
pub use loader::*;
pub use parse::{
    is_missing, parse_aggregates, parse_company_info, parse_credit_score, parse_year_table, GENAI_COLUMN, MISSING_TOKENS,
    REQUIRED_CREDIT_COLUMNS,
};
