// Error types for queries and the CSV loader

use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by the read-only query layer
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Investor with ID {0} not found")]
    InvestorNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Errors that abort a load. Nothing is committed when one of these is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: invalid date added '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        line: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("commitment references unknown investor '{0}'")]
    UnknownInvestor(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
