//! Statistics engine — pure, deterministic functions: Pearson correlation,
//! ordinary least squares, a two-tailed significance estimate against the
//! Student-t distribution, and strength classification.
//!
//! The significance path needs two special functions, implemented here and
//! tested against reference values: log-gamma via the Lanczos approximation
//! and the regularized incomplete beta function via Lentz's continued
//! fraction. Degenerate inputs return neutral values, never NaN or a panic.

use insight_core::StrengthLabel;

/// Guards `r^2 -> 1` in the t-statistic denominator.
const EPSILON: f64 = 1e-10;

/// Above this many degrees of freedom the t distribution is close enough to
/// normal that the continued fraction is not worth running.
const NORMAL_APPROX_DF: f64 = 100.0;

const BETA_MAX_ITERATIONS: usize = 200;
const BETA_TOLERANCE: f64 = 1e-14;
const FPMIN: f64 = 1e-30;

/// Product-moment correlation of two series. Returns `0.0` when fewer than
/// 3 paired observations exist or either series has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Ordinary least squares of y on x. Returns `(0.0, mean(y))` when fewer
/// than 2 points exist or x has zero variance. Not symmetric in x and y.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return (0.0, 0.0);
    }
    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;
    if n < 2 {
        return (0.0, mean_y);
    }

    let mut cov = 0.0;
    let mut var_x = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        cov += dx * (ys[i] - mean_y);
        var_x += dx * dx;
    }
    if var_x == 0.0 {
        return (0.0, mean_y);
    }
    let slope = cov / var_x;
    (slope, mean_y - slope * mean_x)
}

/// Two-tailed p-value for a correlation `r` over `n` paired observations,
/// against the no-correlation null. Returns `1.0` when `df = n - 2 <= 0`.
pub fn approximate_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let t = r.abs() * (df / (1.0 - r * r + EPSILON)).sqrt();

    let p = if df > NORMAL_APPROX_DF {
        // t -> z continuity correction, then the standard normal tail
        let z = t * (1.0 - 1.0 / (4.0 * df)) / (1.0 + t * t / (2.0 * df)).sqrt();
        2.0 * (1.0 - standard_normal_cdf(z))
    } else {
        let x = df / (df + t * t);
        incomplete_beta(df / 2.0, 0.5, x)
    };
    p.clamp(0.0, 1.0)
}

/// Strength classification by `|r|` thresholds; sign picks the suffix.
pub fn classify(r: f64) -> StrengthLabel {
    let a = r.abs();
    if a < 0.2 {
        return StrengthLabel::None;
    }
    if r > 0.0 {
        if a >= 0.7 {
            StrengthLabel::StrongPositive
        } else if a >= 0.4 {
            StrengthLabel::ModeratePositive
        } else {
            StrengthLabel::WeakPositive
        }
    } else if a >= 0.7 {
        StrengthLabel::StrongNegative
    } else if a >= 0.4 {
        StrengthLabel::ModerateNegative
    } else {
        StrengthLabel::WeakNegative
    }
}

/// Standard normal CDF via the Abramowitz-Stegun 7.1.26 rational
/// approximation of erf (5-term polynomial, |error| < 1.5e-7).
pub fn standard_normal_cdf(z: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    let erf = 1.0 - poly * (-x * x).exp();
    0.5 * (1.0 + sign * erf)
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function, Lanczos approximation (g = 7) with
/// the reflection formula for arguments below 0.5.
pub fn ln_gamma(x: f64) -> f64 {
    use std::f64::consts::PI;
    if x < 0.5 {
        // Γ(x)Γ(1-x) = π / sin(πx)
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut acc = LANCZOS_COEFFS[0];
        for (i, &c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
            acc += c / (x + i as f64);
        }
        let t = x + LANCZOS_G + 0.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
    }
}

/// Regularized incomplete beta function `I_x(a, b)`, clamped to `[0, 1]`.
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    // The continued fraction converges fast only for x below the split
    // point; otherwise use the symmetry I_x(a,b) = 1 - I_{1-x}(b,a).
    if x < (a + 1.0) / (a + b + 2.0) {
        (ln_front.exp() * beta_continued_fraction(a, b, x) / a).clamp(0.0, 1.0)
    } else {
        (1.0 - ln_front.exp() * beta_continued_fraction(b, a, 1.0 - x) / b).clamp(0.0, 1.0)
    }
}

/// Lentz's algorithm for the continued fraction of the incomplete beta.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETA_MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < BETA_TOLERANCE {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_of_a_perfect_line() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
        let (slope, intercept) = linear_regression(&xs, &ys);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!(intercept.abs() < 1e-12);
    }

    #[test]
    fn pearson_is_symmetric_regression_is_not() {
        let xs = [1.0, 2.0, 4.0, 5.0, 9.0, 11.0];
        let ys = [3.0, 2.0, 7.0, 9.0, 12.0, 20.0];
        let r_xy = pearson(&xs, &ys);
        let r_yx = pearson(&ys, &xs);
        assert!((r_xy - r_yx).abs() < 1e-12);

        let fwd = linear_regression(&xs, &ys);
        let rev = linear_regression(&ys, &xs);
        assert!((fwd.0 - rev.0).abs() > 1e-6);
    }

    #[test]
    fn short_series_are_neutral() {
        assert_eq!(pearson(&[1.0, 2.0], &[5.0, 9.0]), 0.0);
        assert_eq!(approximate_p_value(0.99, 2), 1.0);
        let (slope, intercept) = linear_regression(&[4.0], &[10.0]);
        assert_eq!(slope, 0.0);
        assert_eq!(intercept, 10.0);
    }

    #[test]
    fn zero_variance_is_neutral() {
        let flat = [5.0, 5.0, 5.0, 5.0];
        let ys = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(pearson(&flat, &ys), 0.0);
        let (slope, intercept) = linear_regression(&flat, &ys);
        assert_eq!(slope, 0.0);
        assert_eq!(intercept, 2.5);
    }

    #[test]
    fn classify_thresholds_and_signs() {
        assert_eq!(classify(1.0), StrengthLabel::StrongPositive);
        assert_eq!(classify(0.75), StrengthLabel::StrongPositive);
        assert_eq!(classify(0.7), StrengthLabel::StrongPositive);
        assert_eq!(classify(0.5), StrengthLabel::ModeratePositive);
        assert_eq!(classify(0.4), StrengthLabel::ModeratePositive);
        assert_eq!(classify(0.25), StrengthLabel::WeakPositive);
        assert_eq!(classify(0.2), StrengthLabel::WeakPositive);
        assert_eq!(classify(0.05), StrengthLabel::None);
        assert_eq!(classify(0.0), StrengthLabel::None);
        assert_eq!(classify(-0.05), StrengthLabel::None);
        assert_eq!(classify(-0.3), StrengthLabel::WeakNegative);
        assert_eq!(classify(-0.5), StrengthLabel::ModerateNegative);
        assert_eq!(classify(-0.75), StrengthLabel::StrongNegative);
    }

    #[test]
    fn ln_gamma_reference_values() {
        // Γ(1) = 1, Γ(5) = 24, Γ(0.5) = sqrt(π)
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
        // reflection branch: Γ(0.3) ≈ 2.991568987687590
        assert!((ln_gamma(0.3) - 2.991_568_987_687_590_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn incomplete_beta_reference_values() {
        assert!((incomplete_beta(2.0, 2.0, 0.5) - 0.5).abs() < 1e-12);
        // I_x(1, 1) = x
        assert!((incomplete_beta(1.0, 1.0, 0.3) - 0.3).abs() < 1e-12);
        // I_x(1, b) = 1 - (1-x)^b
        let expect = 1.0 - 0.7_f64.powi(3);
        assert!((incomplete_beta(1.0, 3.0, 0.3) - expect).abs() < 1e-12);
        assert_eq!(incomplete_beta(2.0, 3.0, 0.0), 0.0);
        assert_eq!(incomplete_beta(2.0, 3.0, 1.0), 1.0);
    }

    #[test]
    fn incomplete_beta_is_monotonic_in_x() {
        let mut last = 0.0;
        for i in 1..20 {
            let x = i as f64 / 20.0;
            let v = incomplete_beta(2.5, 0.5, x);
            assert!(v >= last);
            assert!((0.0..=1.0).contains(&v));
            last = v;
        }
    }

    #[test]
    fn normal_cdf_reference_values() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((standard_normal_cdf(-1.96) - 0.025).abs() < 1e-3);
        assert!(standard_normal_cdf(8.0) > 0.999_999);
    }

    #[test]
    fn p_value_behaves_like_a_significance_test() {
        // no correlation -> p near 1
        assert!((approximate_p_value(0.0, 20) - 1.0).abs() < 1e-9);
        // strong correlation over a decent sample -> small p
        let strong = approximate_p_value(0.9, 20);
        assert!(strong < 0.001);
        // same r over more data is more significant
        assert!(approximate_p_value(0.5, 40) < approximate_p_value(0.5, 10));
        // r = 0.95, n = 5: t ≈ 5.27 on 3 df, p ≈ 0.0133
        let p = approximate_p_value(0.95, 5);
        assert!((p - 0.0133).abs() < 0.002);
    }

    #[test]
    fn p_value_large_sample_uses_the_normal_branch_smoothly() {
        let p_t = approximate_p_value(0.25, 100); // df = 98, t branch
        let p_z = approximate_p_value(0.25, 105); // df = 103, z branch
        assert!((0.0..=1.0).contains(&p_z));
        // branches agree to well under a percentage point
        assert!((p_t - p_z).abs() < 0.01);
        assert!(p_z < p_t);
    }

    #[test]
    fn p_value_never_leaves_unit_interval() {
        for &r in &[-1.0, -0.99, -0.5, 0.0, 0.5, 0.99, 1.0] {
            for &n in &[0usize, 1, 2, 3, 5, 50, 101, 500] {
                let p = approximate_p_value(r, n);
                assert!((0.0..=1.0).contains(&p), "r={r} n={n} p={p}");
            }
        }
    }
}
