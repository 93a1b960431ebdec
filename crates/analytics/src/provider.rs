//! Aggregate data provider — the engine's only upstream data dependency.
//!
//! The engine asks for per-day sums of a named source, scoped to a tenant
//! and date range. How the sums are produced (batch scan, materialized
//! view) is the provider's business; the engine only relies on day-grouped,
//! zero-filled-by-absence semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use insight_core::DateRange;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolver::SourceKey;

/// One summed value for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySum {
    pub date: NaiveDate,
    pub value: f64,
}

/// Tenant-scoped read access to pre-aggregated daily sums.
///
/// Implementations return one row per calendar day that has data; days
/// without rows are simply absent and the assembler treats absence as zero.
/// Failures propagate as-is — the engine never retries or degrades.
#[async_trait]
pub trait AggregateProvider: Send + Sync {
    async fn fetch_daily(
        &self,
        tenant: Uuid,
        source: SourceKey,
        range: DateRange,
    ) -> anyhow::Result<Vec<DailySum>>;
}

/// In-memory provider for tests and local development.
#[derive(Default)]
pub struct MemoryAggregateProvider {
    rows: Mutex<HashMap<(Uuid, SourceKey), Vec<DailySum>>>,
}

impl MemoryAggregateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant: Uuid, source: SourceKey, date: NaiveDate, value: f64) {
        self.rows
            .lock()
            .expect("provider mutex poisoned")
            .entry((tenant, source))
            .or_default()
            .push(DailySum { date, value });
    }
}

#[async_trait]
impl AggregateProvider for MemoryAggregateProvider {
    async fn fetch_daily(
        &self,
        tenant: Uuid,
        source: SourceKey,
        range: DateRange,
    ) -> anyhow::Result<Vec<DailySum>> {
        let rows = self.rows.lock().expect("provider mutex poisoned");
        Ok(rows
            .get(&(tenant, source))
            .map(|sums| {
                sums.iter()
                    .filter(|s| range.contains(s.date))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Provider that always fails; used to exercise error propagation.
pub struct FailingAggregateProvider;

#[async_trait]
impl AggregateProvider for FailingAggregateProvider {
    async fn fetch_daily(
        &self,
        _tenant: Uuid,
        source: SourceKey,
        _range: DateRange,
    ) -> anyhow::Result<Vec<DailySum>> {
        anyhow::bail!("aggregate store unavailable while reading {source:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_provider_scopes_by_tenant_and_range() {
        let provider = MemoryAggregateProvider::new();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

        provider.insert(tenant, SourceKey::MetaSpend, d("2026-01-01"), 10.0);
        provider.insert(tenant, SourceKey::MetaSpend, d("2026-01-09"), 20.0);
        provider.insert(other, SourceKey::MetaSpend, d("2026-01-01"), 99.0);

        let range = DateRange::parse("2026-01-01", "2026-01-05").unwrap();
        let rows = provider
            .fetch_daily(tenant, SourceKey::MetaSpend, range)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 10.0);
    }
}
