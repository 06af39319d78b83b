//! Error types for log parsing and statistics

use thiserror::Error;

/// Errors raised while extracting samples from a benchmark log
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: invalid timestamp '{value}'")]
    InvalidTimestamp { line: usize, value: String },

    #[error("line {line}: missing field {field}")]
    MissingField { line: usize, field: usize },

    #[error("line {line}: no throughput value in '{text}'")]
    MissingThroughput { line: usize, text: String },

    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: timestamp {timestamp} is earlier than the previous sample")]
    OutOfOrder { line: usize, timestamp: String },

    #[error("line {line}: unknown size unit '{unit}'")]
    UnknownUnit { line: usize, unit: String },
}

impl ParseError {
    /// 1-based line number the error refers to
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidTimestamp { line, .. }
            | Self::MissingField { line, .. }
            | Self::MissingThroughput { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::OutOfOrder { line, .. }
            | Self::UnknownUnit { line, .. } => *line,
        }
    }
}

/// Errors for statistical computations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("confidence level must be in (0, 1), got {0}")]
    InvalidConfidence(f64),

    #[error("bootstrap iterations must be positive")]
    NoIterations,

    #[error("statistics backend failed: {0}")]
    Backend(String),
}

/// Errors for trial tables and their CSV form
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("CSV line {line}: {message}")]
    Csv { line: usize, message: String },
}
