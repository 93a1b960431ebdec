//! Correlation query coordinator — one request/response cycle: assemble
//! the series, run the statistics over the usable subset, and attach the
//! plain-language interpretation.

use std::sync::Arc;

use insight_core::{CorrelationPoint, CorrelationResult, DateRange, Granularity, InsightResult};
use tracing::info;
use uuid::Uuid;

use crate::catalog::MetricCatalog;
use crate::interpret;
use crate::provider::AggregateProvider;
use crate::series::SeriesAssembler;
use crate::stats;

/// Zero-padding days are dropped from the statistics only when at least
/// this many points carry signal; otherwise all points are used.
pub const MIN_NONZERO_POINTS: usize = 3;

pub struct CorrelationEngine {
    catalog: MetricCatalog,
    assembler: SeriesAssembler,
}

impl CorrelationEngine {
    pub fn new(provider: Arc<dyn AggregateProvider>) -> Self {
        Self {
            catalog: MetricCatalog::standard(),
            assembler: SeriesAssembler::new(provider),
        }
    }

    /// The published metric catalog, for callers validating keys up front.
    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Run one correlation query. Well-formed requests always produce a
    /// complete result, even for degenerate series; only date validation
    /// (done at `DateRange` construction) and provider failures error out.
    pub async fn query(
        &self,
        tenant: Uuid,
        metric_x: &str,
        metric_y: &str,
        range: DateRange,
        granularity: Granularity,
    ) -> InsightResult<CorrelationResult> {
        let points = self
            .assembler
            .assemble(tenant, metric_x, metric_y, range, granularity)
            .await?;

        // Days where both metrics were zero are usually sync gaps or
        // pre-launch padding; they dilute genuine signal. Drop them when
        // enough live points remain, otherwise keep everything: a
        // low-confidence result beats an empty one.
        let active: Vec<CorrelationPoint> = points
            .iter()
            .filter(|p| p.x != 0.0 || p.y != 0.0)
            .copied()
            .collect();
        let usable = if active.len() >= MIN_NONZERO_POINTS {
            active
        } else {
            points.clone()
        };

        let xs: Vec<f64> = usable.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = usable.iter().map(|p| p.y).collect();

        let pearson_r = round_to(stats::pearson(&xs, &ys), 4);
        let (slope, intercept) = stats::linear_regression(&xs, &ys);
        let slope = round_to(slope, 4);
        let intercept = round_to(intercept, 4);
        let p_value = round_to(stats::approximate_p_value(pearson_r, xs.len()), 6);
        let interpretation = stats::classify(pearson_r);
        let interpretation_text = interpret::interpret(
            &self.catalog,
            metric_x,
            metric_y,
            pearson_r,
            slope,
            interpretation,
            &points,
            xs.len(),
        );

        metrics::counter!("correlation.queries").increment(1);
        metrics::histogram!("correlation.points").record(points.len() as f64);
        info!(
            metric_x,
            metric_y,
            points = points.len(),
            used = xs.len(),
            r = pearson_r,
            "correlation query served"
        );

        Ok(CorrelationResult {
            points,
            pearson_r,
            p_value,
            slope,
            intercept,
            interpretation,
            interpretation_text,
        })
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
