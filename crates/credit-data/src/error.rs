use credit_core::CreditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Data(#[from] CreditError),
}

pub type LoadResult<T> = Result<T, LoadError>;
