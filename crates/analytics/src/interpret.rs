//! Interpretation generator — turns the numeric results of a correlation
//! query into a plain-language summary for the dashboard.

use insight_core::{CorrelationPoint, StrengthLabel};

use crate::catalog::{MetricCatalog, MetricFormat};
use crate::stats;

/// `|r|` below this gets no per-increment sentence.
pub const RELATIONSHIP_THRESHOLD: f64 = 0.3;

/// Fewer statistics points than this appends a small-sample caveat.
pub const SMALL_SAMPLE_THRESHOLD: usize = 7;

/// Diminishing-returns heuristic thresholds. Heuristic, not a test: a
/// median split with an independent regression per half.
pub const MIN_POINTS_FOR_DIMINISHING_RETURNS: usize = 10;
pub const MIN_HALF_POINTS: usize = 3;
pub const DIMINISHING_SLOPE_RATIO: f64 = 0.5;

/// Representative X increments per display format.
const CURRENCY_STEP: f64 = 100.0;
const RATIO_STEP: f64 = 0.5;
const PERCENTAGE_STEP: f64 = 1.0;

/// Build the one-string summary: headline, optional per-increment effect,
/// optional diminishing-returns note, optional small-sample caveat.
/// `stats_n` is the number of points the statistics actually used, which
/// can be fewer than `points` when zero-padding days were filtered out.
pub fn interpret(
    catalog: &MetricCatalog,
    metric_x: &str,
    metric_y: &str,
    r: f64,
    slope: f64,
    label: StrengthLabel,
    points: &[CorrelationPoint],
    stats_n: usize,
) -> String {
    let x_label = catalog.label_of(metric_x);
    let y_label = catalog.label_of(metric_y);

    let mut sentences = vec![format!(
        "{} and {} show {} correlation (r = {:.2}).",
        x_label,
        y_label,
        strength_phrase(label),
        r
    )];

    if r.abs() >= RELATIONSHIP_THRESHOLD && slope != 0.0 {
        let x_format = catalog.format_of(metric_x);
        let y_format = catalog.format_of(metric_y);
        let increment = representative_increment(x_format, points);
        let delta = slope * increment;
        let direction = if delta > 0.0 { "increase" } else { "decrease" };
        sentences.push(format!(
            "For every additional {} of {}, {} tends to {} by about {}.",
            format_value(increment, x_format),
            x_label,
            y_label,
            direction,
            format_value(delta, y_format),
        ));
    }

    if let Some(note) = diminishing_returns(catalog, metric_x, metric_y, points) {
        sentences.push(note);
    }

    if stats_n < SMALL_SAMPLE_THRESHOLD {
        sentences.push(format!(
            "Only {stats_n} data points were available for this comparison; a wider date range would give a more reliable estimate."
        ));
    }

    sentences.join(" ")
}

fn strength_phrase(label: StrengthLabel) -> &'static str {
    match label {
        StrengthLabel::StrongPositive => "a strong positive",
        StrengthLabel::ModeratePositive => "a moderate positive",
        StrengthLabel::WeakPositive => "a weak positive",
        StrengthLabel::None => "no meaningful",
        StrengthLabel::WeakNegative => "a weak negative",
        StrengthLabel::ModerateNegative => "a moderate negative",
        StrengthLabel::StrongNegative => "a strong negative",
    }
}

/// Format a value's magnitude per its display format. Sign is always
/// carried by the surrounding wording, never by a leading minus.
pub fn format_value(value: f64, format: MetricFormat) -> String {
    let v = value.abs();
    match format {
        MetricFormat::Currency => format!("${}", group_thousands(v, 2)),
        MetricFormat::Ratio => format!("{v:.2}x"),
        MetricFormat::Percentage => format!("{v:.2}%"),
        MetricFormat::Number => group_thousands(v, 0),
    }
}

fn group_thousands(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

fn representative_increment(format: MetricFormat, points: &[CorrelationPoint]) -> f64 {
    match format {
        MetricFormat::Currency => CURRENCY_STEP,
        MetricFormat::Ratio => RATIO_STEP,
        MetricFormat::Percentage => PERCENTAGE_STEP,
        MetricFormat::Number => {
            let min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            if !min.is_finite() || !max.is_finite() {
                return 1.0;
            }
            ((max - min) / 10.0).round().max(1.0)
        }
    }
}

/// Median-split slope comparison for spend-vs-return pairs: if the upper
/// half's slope is positive but under half the lower half's, name the X
/// value at the split as the approximate point where returns taper off.
fn diminishing_returns(
    catalog: &MetricCatalog,
    metric_x: &str,
    metric_y: &str,
    points: &[CorrelationPoint],
) -> Option<String> {
    if points.len() < MIN_POINTS_FOR_DIMINISHING_RETURNS {
        return None;
    }
    if !is_spend_metric(catalog, metric_x) || !is_return_metric(catalog, metric_y) {
        return None;
    }

    let mut sorted: Vec<CorrelationPoint> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    let split = sorted.len() / 2;
    let (lower, upper) = sorted.split_at(split);
    if lower.len() < MIN_HALF_POINTS || upper.len() < MIN_HALF_POINTS {
        return None;
    }

    let (lower_slope, _) = half_regression(lower);
    let (upper_slope, _) = half_regression(upper);
    if upper_slope > 0.0 && upper_slope < lower_slope * DIMINISHING_SLOPE_RATIO {
        let split_value = format_value(sorted[split].x, catalog.format_of(metric_x));
        let x_label = catalog.label_of(metric_x);
        let y_label = catalog.label_of(metric_y);
        return Some(format!(
            "Returns appear to diminish above roughly {split_value} of daily {x_label}: beyond that level, additional spend has produced proportionally less {y_label}."
        ));
    }
    None
}

fn half_regression(half: &[CorrelationPoint]) -> (f64, f64) {
    let xs: Vec<f64> = half.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = half.iter().map(|p| p.y).collect();
    stats::linear_regression(&xs, &ys)
}

fn is_spend_metric(catalog: &MetricCatalog, key: &str) -> bool {
    catalog.get(key).is_some_and(|m| m.category == "spend")
}

fn is_return_metric(catalog: &MetricCatalog, key: &str) -> bool {
    catalog
        .get(key)
        .is_some_and(|m| m.category == "revenue" || m.key.ends_with("roas"))
}
