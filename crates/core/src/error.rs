use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Aggregate data access failed: {0}")]
    DataAccess(#[source] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
