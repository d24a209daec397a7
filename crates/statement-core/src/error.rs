use thiserror::Error;

use crate::types::StatementKind;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Unknown scale unit: {0}")]
    UnknownScaleUnit(String),

    #[error("Missing row '{row}' in {statement}")]
    MissingRow { statement: StatementKind, row: String },

    #[error("Duplicate row '{row}' in {statement}")]
    DuplicateRow { statement: StatementKind, row: String },

    #[error("Invalid period label '{label}' in {statement}")]
    InvalidPeriod { statement: StatementKind, label: String },

    #[error("Row '{row}' in {statement} has {found} values, expected {expected}")]
    RaggedRow {
        statement: StatementKind,
        row: String,
        expected: usize,
        found: usize,
    },

    #[error("Metric table has {found} {what}, expected {expected}")]
    MetricShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Periods of {statement} do not match the balance sheet periods")]
    PeriodMismatch { statement: StatementKind },

    #[error("Stock split adjustment is not supported ({0} splits on record)")]
    UnsupportedSplitAdjustment(usize),

    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("No {what} found for {ticker}")]
    NotFound { ticker: String, what: String },

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
