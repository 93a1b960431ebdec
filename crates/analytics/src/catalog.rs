//! Metric catalog — the published, read-only registry of dashboard metrics.
//!
//! Built once at startup and never mutated, so it needs no synchronization.
//! Callers use it to validate metric keys and to pick display formatting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Display format of a metric's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    Currency,
    Number,
    Ratio,
    Percentage,
}

/// A published metric: key, human label, and presentation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub key: String,
    pub label: String,
    pub description: String,
    pub category: String,
    pub format: MetricFormat,
}

/// Immutable registry of all published metrics, in stable display order.
pub struct MetricCatalog {
    metrics: Vec<MetricDefinition>,
    by_key: HashMap<String, usize>,
}

impl MetricCatalog {
    /// The standard dashboard catalog.
    pub fn standard() -> Self {
        let metrics = vec![
            def(
                "total_spend",
                "Total Ad Spend",
                "Combined daily ad spend across Meta, Google, and TikTok",
                "spend",
                MetricFormat::Currency,
            ),
            def(
                "meta_spend",
                "Meta Ad Spend",
                "Daily ad spend reported by Meta",
                "spend",
                MetricFormat::Currency,
            ),
            def(
                "google_spend",
                "Google Ad Spend",
                "Daily ad spend reported by Google Ads",
                "spend",
                MetricFormat::Currency,
            ),
            def(
                "tiktok_spend",
                "TikTok Ad Spend",
                "Daily ad spend reported by TikTok",
                "spend",
                MetricFormat::Currency,
            ),
            def(
                "total_revenue",
                "Total Revenue",
                "Daily order revenue; uses the larger of store-order and pixel-tracked revenue",
                "revenue",
                MetricFormat::Currency,
            ),
            def(
                "orders",
                "Orders",
                "Number of orders placed per day",
                "revenue",
                MetricFormat::Number,
            ),
            def(
                "aov",
                "Average Order Value",
                "Order revenue divided by order count",
                "revenue",
                MetricFormat::Currency,
            ),
            def(
                "total_roas",
                "Blended ROAS",
                "Total revenue divided by total ad spend",
                "efficiency",
                MetricFormat::Ratio,
            ),
            def(
                "meta_roas",
                "Meta ROAS",
                "Meta-attributed revenue divided by Meta spend",
                "efficiency",
                MetricFormat::Ratio,
            ),
            def(
                "google_roas",
                "Google ROAS",
                "Google-attributed revenue divided by Google spend",
                "efficiency",
                MetricFormat::Ratio,
            ),
            def(
                "tiktok_roas",
                "TikTok ROAS",
                "TikTok-attributed revenue divided by TikTok spend",
                "efficiency",
                MetricFormat::Ratio,
            ),
            def(
                "cost_per_order",
                "Cost per Order",
                "Total ad spend divided by order count",
                "efficiency",
                MetricFormat::Currency,
            ),
            def(
                "sessions",
                "Store Sessions",
                "Daily visitor sessions on the storefront",
                "engagement",
                MetricFormat::Number,
            ),
            def(
                "conversion_rate",
                "Conversion Rate",
                "Orders as a percentage of sessions",
                "engagement",
                MetricFormat::Percentage,
            ),
        ];

        let by_key = metrics
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key.clone(), i))
            .collect();

        Self { metrics, by_key }
    }

    /// All published metrics, in stable order.
    pub fn list(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    pub fn get(&self, key: &str) -> Option<&MetricDefinition> {
        self.by_key.get(key).map(|&i| &self.metrics[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Display format for a key; unknown keys fall back to plain numbers.
    pub fn format_of(&self, key: &str) -> MetricFormat {
        self.get(key).map(|m| m.format).unwrap_or(MetricFormat::Number)
    }

    /// Human-readable label for a key; unknown keys echo the key itself.
    pub fn label_of(&self, key: &str) -> String {
        self.get(key)
            .map(|m| m.label.clone())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn def(
    key: &str,
    label: &str,
    description: &str,
    category: &str,
    format: MetricFormat,
) -> MetricDefinition {
    MetricDefinition {
        key: key.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let catalog = MetricCatalog::standard();
        let mut seen = std::collections::HashSet::new();
        for m in catalog.list() {
            assert!(seen.insert(m.key.clone()), "duplicate key {}", m.key);
        }
    }

    #[test]
    fn listing_order_is_stable() {
        let a = MetricCatalog::standard();
        let b = MetricCatalog::standard();
        let keys_a: Vec<_> = a.list().iter().map(|m| m.key.clone()).collect();
        let keys_b: Vec<_> = b.list().iter().map(|m| m.key.clone()).collect();
        assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn lookup_and_format() {
        let catalog = MetricCatalog::standard();
        assert!(catalog.contains("total_roas"));
        assert_eq!(catalog.format_of("total_roas"), MetricFormat::Ratio);
        assert_eq!(catalog.format_of("conversion_rate"), MetricFormat::Percentage);
        assert_eq!(catalog.format_of("no_such_metric"), MetricFormat::Number);
        assert_eq!(catalog.label_of("meta_spend"), "Meta Ad Spend");
        assert_eq!(catalog.label_of("no_such_metric"), "no_such_metric");
    }
}
