//! Correlation analytics engine — assembles day-aligned series for two
//! dashboard metrics and computes their statistical relationship with a
//! plain-language interpretation.

pub mod catalog;
pub mod engine;
pub mod interpret;
pub mod provider;
pub mod resolver;
pub mod series;
pub mod stats;

pub use catalog::{MetricCatalog, MetricDefinition, MetricFormat};
pub use engine::CorrelationEngine;
pub use provider::{AggregateProvider, DailySum, MemoryAggregateProvider};
pub use resolver::SourceKey;
pub use series::SeriesAssembler;
