use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
