use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreditError {
    /// Aspect weights failed validation. Raised once at construction time.
    #[error("Invalid aspect weights: {0}")]
    InvalidWeights(String),

    /// The metric name is not part of any loaded table schema.
    #[error("Metric not found: {0}")]
    MetricNotFound(String),

    #[error("Missing columns in {table}: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("Duplicate year {year} in {table}")]
    DuplicateYear { table: String, year: i32 },

    #[error("Unknown aspect: {0}")]
    UnknownAspect(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type CreditResult<T> = Result<T, CreditError>;
