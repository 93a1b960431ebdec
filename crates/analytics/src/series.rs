//! Time series assembler — builds the aligned (x, y) series for a metric
//! pair by fetching each declared source aggregate and evaluating both
//! metric expressions against every day on the date spine.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use insight_core::{CorrelationPoint, DateRange, Granularity, InsightError, InsightResult};
use tokio::task::JoinSet;
use tracing::debug;
use uuid::Uuid;

use crate::provider::AggregateProvider;
use crate::resolver::{self, DayValues, SourceKey};

pub struct SeriesAssembler {
    provider: Arc<dyn AggregateProvider>,
}

impl SeriesAssembler {
    pub fn new(provider: Arc<dyn AggregateProvider>) -> Self {
        Self { provider }
    }

    /// Assemble one point per spine bucket, ascending and gap-free. Under
    /// day granularity the spine is every calendar day in the range
    /// inclusive; under week granularity consecutive days are bucketed by
    /// ISO week, source sums added within each bucket, and the bucket
    /// labeled with its first in-range day.
    pub async fn assemble(
        &self,
        tenant: Uuid,
        metric_x: &str,
        metric_y: &str,
        range: DateRange,
        granularity: Granularity,
    ) -> InsightResult<Vec<CorrelationPoint>> {
        let x = resolver::resolve(metric_x);
        let y = resolver::resolve(metric_y);
        let needs: HashSet<SourceKey> = x.needs.iter().chain(y.needs.iter()).copied().collect();

        debug!(
            metric_x,
            metric_y,
            sources = needs.len(),
            days = range.num_days(),
            "assembling correlation series"
        );

        let by_source = self.fetch_all(tenant, &needs, range).await?;

        let points = match granularity {
            Granularity::Day => range
                .days()
                .map(|day| {
                    let values = values_for_day(&by_source, day);
                    CorrelationPoint {
                        date: day,
                        x: (x.eval)(&values),
                        y: (y.eval)(&values),
                    }
                })
                .collect(),
            Granularity::Week => {
                let mut points = Vec::new();
                let mut bucket_start: Option<NaiveDate> = None;
                let mut bucket_sums = DayValues::new();
                for day in range.days() {
                    if let Some(start) = bucket_start {
                        if day.iso_week() != start.iso_week() {
                            points.push(CorrelationPoint {
                                date: start,
                                x: (x.eval)(&bucket_sums),
                                y: (y.eval)(&bucket_sums),
                            });
                            bucket_start = Some(day);
                            bucket_sums = DayValues::new();
                        }
                    } else {
                        bucket_start = Some(day);
                    }
                    for (&source, by_day) in &by_source {
                        if let Some(&value) = by_day.get(&day) {
                            *bucket_sums.entry(source).or_insert(0.0) += value;
                        }
                    }
                }
                if let Some(start) = bucket_start {
                    points.push(CorrelationPoint {
                        date: start,
                        x: (x.eval)(&bucket_sums),
                        y: (y.eval)(&bucket_sums),
                    });
                }
                points
            }
        };

        Ok(points)
    }

    /// One fetch per needed source, all concurrent, joined before any
    /// per-day evaluation runs. A failed fetch fails the whole assembly.
    async fn fetch_all(
        &self,
        tenant: Uuid,
        needs: &HashSet<SourceKey>,
        range: DateRange,
    ) -> InsightResult<HashMap<SourceKey, HashMap<NaiveDate, f64>>> {
        let mut tasks = JoinSet::new();
        for &source in needs {
            let provider = Arc::clone(&self.provider);
            tasks.spawn(async move {
                let rows = provider.fetch_daily(tenant, source, range).await?;
                Ok::<_, anyhow::Error>((source, rows))
            });
        }

        let mut by_source = HashMap::with_capacity(needs.len());
        while let Some(joined) = tasks.join_next().await {
            let (source, rows) = joined
                .map_err(|e| InsightError::DataAccess(anyhow::Error::new(e)))?
                .map_err(InsightError::DataAccess)?;
            let by_day: HashMap<NaiveDate, f64> =
                rows.into_iter().map(|r| (r.date, r.value)).collect();
            by_source.insert(source, by_day);
        }
        Ok(by_source)
    }
}

fn values_for_day(
    by_source: &HashMap<SourceKey, HashMap<NaiveDate, f64>>,
    day: NaiveDate,
) -> DayValues {
    by_source
        .iter()
        .map(|(&source, by_day)| (source, by_day.get(&day).copied().unwrap_or(0.0)))
        .collect()
}
