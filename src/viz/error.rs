use thiserror::Error;

/// Errors raised when an answer cannot be shaped into the requested chart
#[derive(Debug, Error, PartialEq)]
pub enum VizError {
    /// The answer has fewer columns than the chart needs (label + value for a pie)
    #[error("{chart} chart needs at least {needed} columns, response has {found}")]
    TooFewColumns {
        chart: &'static str,
        needed: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, VizError>;
