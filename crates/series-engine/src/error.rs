//! Error types for series-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid anchor: {0}")]
    InvalidAnchor(String),

    #[error("Iteration exhausted")]
    Exhausted,
}

pub type Result<T> = std::result::Result<T, SeriesError>;
