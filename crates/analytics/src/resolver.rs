//! Metric resolver — declarative mapping from metric keys to pure
//! expressions over named per-day source aggregates.
//!
//! Each metric declares up front which sources it reads, so the assembler
//! fetches exactly the declared needs instead of building queries ad hoc.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A named upstream aggregate the data provider can sum per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKey {
    MetaSpend,
    GoogleSpend,
    TiktokSpend,
    MetaReportedRevenue,
    GoogleReportedRevenue,
    TiktokReportedRevenue,
    OrderRevenue,
    TrackedRevenue,
    OrderCount,
    Sessions,
}

/// Per-day sums for every source a query needs.
pub type DayValues = HashMap<SourceKey, f64>;

/// A resolved metric: its evaluation function and declared source needs.
#[derive(Clone, Copy)]
pub struct MetricBinding {
    pub eval: fn(&DayValues) -> f64,
    pub needs: &'static [SourceKey],
}

/// Resolve a metric key to its binding. Unknown keys resolve to the
/// constant-zero expression with no needs: the caller is expected to have
/// validated keys against the catalog, and a zero series still renders.
pub fn resolve(key: &str) -> MetricBinding {
    match key {
        "total_spend" => MetricBinding {
            eval: total_spend,
            needs: &[
                SourceKey::MetaSpend,
                SourceKey::GoogleSpend,
                SourceKey::TiktokSpend,
            ],
        },
        "meta_spend" => MetricBinding {
            eval: meta_spend,
            needs: &[SourceKey::MetaSpend],
        },
        "google_spend" => MetricBinding {
            eval: google_spend,
            needs: &[SourceKey::GoogleSpend],
        },
        "tiktok_spend" => MetricBinding {
            eval: tiktok_spend,
            needs: &[SourceKey::TiktokSpend],
        },
        "total_revenue" => MetricBinding {
            eval: total_revenue,
            needs: &[SourceKey::OrderRevenue, SourceKey::TrackedRevenue],
        },
        "orders" => MetricBinding {
            eval: orders,
            needs: &[SourceKey::OrderCount],
        },
        "aov" => MetricBinding {
            eval: aov,
            needs: &[SourceKey::OrderRevenue, SourceKey::OrderCount],
        },
        "total_roas" => MetricBinding {
            eval: total_roas,
            needs: &[
                SourceKey::MetaSpend,
                SourceKey::GoogleSpend,
                SourceKey::TiktokSpend,
                SourceKey::OrderRevenue,
                SourceKey::TrackedRevenue,
            ],
        },
        "meta_roas" => MetricBinding {
            eval: meta_roas,
            needs: &[SourceKey::MetaSpend, SourceKey::MetaReportedRevenue],
        },
        "google_roas" => MetricBinding {
            eval: google_roas,
            needs: &[SourceKey::GoogleSpend, SourceKey::GoogleReportedRevenue],
        },
        "tiktok_roas" => MetricBinding {
            eval: tiktok_roas,
            needs: &[SourceKey::TiktokSpend, SourceKey::TiktokReportedRevenue],
        },
        "cost_per_order" => MetricBinding {
            eval: cost_per_order,
            needs: &[
                SourceKey::MetaSpend,
                SourceKey::GoogleSpend,
                SourceKey::TiktokSpend,
                SourceKey::OrderCount,
            ],
        },
        "sessions" => MetricBinding {
            eval: sessions,
            needs: &[SourceKey::Sessions],
        },
        "conversion_rate" => MetricBinding {
            eval: conversion_rate,
            needs: &[SourceKey::OrderCount, SourceKey::Sessions],
        },
        _ => {
            warn!(metric_key = key, "unknown metric key, resolving to constant zero");
            metrics::counter!("correlation.unknown_metric_key").increment(1);
            MetricBinding {
                eval: zero,
                needs: &[],
            }
        }
    }
}

fn v(d: &DayValues, s: SourceKey) -> f64 {
    d.get(&s).copied().unwrap_or(0.0)
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn spend_sum(d: &DayValues) -> f64 {
    v(d, SourceKey::MetaSpend) + v(d, SourceKey::GoogleSpend) + v(d, SourceKey::TiktokSpend)
}

/// Store-order and pixel-tracked revenue are attributed independently and
/// can disagree; policy is to take the larger figure, not an average.
fn revenue_sum(d: &DayValues) -> f64 {
    v(d, SourceKey::OrderRevenue).max(v(d, SourceKey::TrackedRevenue))
}

fn zero(_: &DayValues) -> f64 {
    0.0
}

fn total_spend(d: &DayValues) -> f64 {
    spend_sum(d)
}

fn meta_spend(d: &DayValues) -> f64 {
    v(d, SourceKey::MetaSpend)
}

fn google_spend(d: &DayValues) -> f64 {
    v(d, SourceKey::GoogleSpend)
}

fn tiktok_spend(d: &DayValues) -> f64 {
    v(d, SourceKey::TiktokSpend)
}

fn total_revenue(d: &DayValues) -> f64 {
    revenue_sum(d)
}

fn orders(d: &DayValues) -> f64 {
    v(d, SourceKey::OrderCount)
}

fn aov(d: &DayValues) -> f64 {
    safe_div(v(d, SourceKey::OrderRevenue), v(d, SourceKey::OrderCount))
}

fn total_roas(d: &DayValues) -> f64 {
    safe_div(revenue_sum(d), spend_sum(d))
}

fn meta_roas(d: &DayValues) -> f64 {
    safe_div(v(d, SourceKey::MetaReportedRevenue), v(d, SourceKey::MetaSpend))
}

fn google_roas(d: &DayValues) -> f64 {
    safe_div(
        v(d, SourceKey::GoogleReportedRevenue),
        v(d, SourceKey::GoogleSpend),
    )
}

fn tiktok_roas(d: &DayValues) -> f64 {
    safe_div(
        v(d, SourceKey::TiktokReportedRevenue),
        v(d, SourceKey::TiktokSpend),
    )
}

fn cost_per_order(d: &DayValues) -> f64 {
    safe_div(spend_sum(d), v(d, SourceKey::OrderCount))
}

fn sessions(d: &DayValues) -> f64 {
    v(d, SourceKey::Sessions)
}

fn conversion_rate(d: &DayValues) -> f64 {
    safe_div(v(d, SourceKey::OrderCount), v(d, SourceKey::Sessions)) * 100.0
}
