pub mod error;
pub mod types;

pub use error::{InsightError, InsightResult};
pub use types::{CorrelationPoint, CorrelationResult, DateRange, Granularity, StrengthLabel};
