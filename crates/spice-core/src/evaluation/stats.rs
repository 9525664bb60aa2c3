//! Significance statistics over per-item scores.
//!
//! A corpus SPICE score is one number; these helpers say how much to trust
//! it and whether two captioning systems really differ:
//! - Bootstrap confidence interval of the mean per-item F-score
//! - Paired t-test over the items both systems scored
//! - Cohen's d effect size
//!
//! # References
//!
//! - Efron & Tibshirani (1993). "An Introduction to the Bootstrap"
//! - Anderson et al. (2016). "SPICE: Semantic Propositional Image Caption Evaluation"

use serde::Serialize;

/// Mean of a sample with a 95% bootstrap interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BootstrapResult {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl BootstrapResult {
    /// Formats the result as "mean [lower, upper]".
    pub fn format(&self, precision: usize) -> String {
        format!(
            "{:.prec$} [{:.prec$}, {:.prec$}]",
            self.mean,
            self.lower,
            self.upper,
            prec = precision
        )
    }
}

/// Computes a bootstrap 95% confidence interval for the mean.
///
/// Resamples `values` with replacement `n_bootstrap` times and takes the
/// 2.5th and 97.5th percentiles of the resampled means.
///
/// Returns `None` for an empty sample or zero resamples.
///
/// # Example
///
/// ```
/// use spice_core::evaluation::bootstrap_ci;
///
/// let f_scores = [0.42, 0.51, 0.38, 0.47, 0.55];
/// let ci = bootstrap_ci(&f_scores, 1000, 42).unwrap();
/// assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
/// ```
pub fn bootstrap_ci(values: &[f64], n_bootstrap: usize, seed: u64) -> Option<BootstrapResult> {
    if values.is_empty() || n_bootstrap == 0 {
        return None;
    }

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let mut rng = LcgRng::new(seed);

    let mut means: Vec<f64> = (0..n_bootstrap)
        .map(|_| {
            let sum: f64 = (0..n).map(|_| values[rng.next_usize(n)]).sum();
            sum / n as f64
        })
        .collect();
    means.sort_by(f64::total_cmp);

    let last = means.len() - 1;
    let lower_idx = ((n_bootstrap as f64) * 0.025) as usize;
    let upper_idx = ((n_bootstrap as f64) * 0.975) as usize;

    Some(BootstrapResult {
        mean,
        lower: means[lower_idx.min(last)],
        upper: means[upper_idx.min(last)],
    })
}

/// Result of a paired t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTestResult {
    /// Positive when the first system scores higher on average
    pub t_statistic: f64,
    /// Two-tailed p-value
    pub p_value: f64,
    pub df: usize,
}

impl TTestResult {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    pub fn format(&self) -> String {
        let marker = if self.is_significant(0.05) { "*" } else { "" };
        format!(
            "t({})={:.3}, p={:.4}{}",
            self.df, self.t_statistic, self.p_value, marker
        )
    }
}

/// Paired t-test of two systems scored on the same items, in the same order.
///
/// Returns `None` unless both slices have the same length of at least two.
pub fn paired_ttest(system_a: &[f64], system_b: &[f64]) -> Option<TTestResult> {
    if system_a.len() != system_b.len() || system_a.len() < 2 {
        return None;
    }

    let n = system_a.len();
    let df = n - 1;

    let diffs: Vec<f64> = system_a.iter().zip(system_b).map(|(a, b)| a - b).collect();
    let mean_diff = diffs.iter().sum::<f64>() / n as f64;
    let var_diff = diffs.iter().map(|d| (d - mean_diff).powi(2)).sum::<f64>() / df as f64;
    let se = var_diff.sqrt() / (n as f64).sqrt();

    let t = if se > 0.0 { mean_diff / se } else { 0.0 };

    Some(TTestResult {
        t_statistic: t,
        p_value: t_distribution_p_value(t.abs(), df),
        df,
    })
}

/// Cohen's d between two groups (positive if `group_a` is higher).
///
/// Returns 0 when either group has fewer than two values or the pooled
/// deviation is zero.
pub fn cohens_d(group_a: &[f64], group_b: &[f64]) -> f64 {
    let (n_a, n_b) = (group_a.len(), group_b.len());
    if n_a < 2 || n_b < 2 {
        return 0.0;
    }

    let mean_a = group_a.iter().sum::<f64>() / n_a as f64;
    let mean_b = group_b.iter().sum::<f64>() / n_b as f64;
    let ss_a: f64 = group_a.iter().map(|x| (x - mean_a).powi(2)).sum();
    let ss_b: f64 = group_b.iter().map(|x| (x - mean_b).powi(2)).sum();

    let pooled_std = ((ss_a + ss_b) / (n_a + n_b - 2) as f64).sqrt();
    if pooled_std == 0.0 {
        return 0.0;
    }
    (mean_a - mean_b) / pooled_std
}

/// Cohen's conventional label for an effect size.
pub fn interpret_cohens_d(d: f64) -> &'static str {
    let d_abs = d.abs();
    if d_abs < 0.2 {
        "negligible"
    } else if d_abs < 0.5 {
        "small"
    } else if d_abs < 0.8 {
        "medium"
    } else {
        "large"
    }
}

// ============================================================================
// Internal: Seeded LCG
// ============================================================================

/// Linear congruential generator; reproducible resampling for a given seed.
struct LcgRng {
    state: u64,
}

impl LcgRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        // Knuth's MMIX multiplier
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_usize(&mut self, max: usize) -> usize {
        // High bits have the longest period.
        ((self.next() >> 33) as usize) % max
    }
}

// ============================================================================
// Internal: Student's t distribution
// ============================================================================

/// Two-tailed p-value for |t| with `df` degrees of freedom.
///
/// p = I_{df/(df+t²)}(df/2, 1/2); normal approximation above 100 df.
fn t_distribution_p_value(t_abs: f64, df: usize) -> f64 {
    if df > 100 {
        return 2.0 * (1.0 - normal_cdf(t_abs));
    }
    let x = df as f64 / (df as f64 + t_abs * t_abs);
    incomplete_beta(df as f64 / 2.0, 0.5, x)
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz and Stegun 7.1.26.
fn erf(x: f64) -> f64 {
    const A: [f64; 5] = [
        0.254829592,
        -0.284496736,
        1.421413741,
        -1.453152027,
        1.061405429,
    ];
    const P: f64 = 0.3275911;

    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, &a| acc * t + a) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Regularized incomplete beta function I_x(a, b).
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let front =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_cf(a, b, x) / a
    } else {
        1.0 - front * beta_cf(b, a, 1.0 - x) / b
    }
}

/// Lentz's continued fraction for the incomplete beta function.
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 100;
    const EPS: f64 = 1e-10;
    const TINY: f64 = 1e-30;

    let clamp = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / clamp(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let even = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / clamp(1.0 + even * d);
        c = clamp(1.0 + even / c);
        h *= d * c;

        let odd = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / clamp(1.0 + odd * d);
        c = clamp(1.0 + odd / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Lanczos approximation of ln Γ(x).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];

    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let ser = COEFFS
        .iter()
        .enumerate()
        .fold(1.000000000190015, |acc, (i, &c)| acc + c / (x + 1.0 + i as f64));

    -tmp + (2.5066282746310005 * ser / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_ci_brackets_mean() {
        let f_scores = vec![0.18, 0.22, 0.20, 0.25, 0.19, 0.21, 0.23, 0.17, 0.20, 0.24];
        let ci = bootstrap_ci(&f_scores, 1000, 42).unwrap();

        assert!((ci.mean - 0.209).abs() < 1e-9);
        assert!(ci.lower <= ci.mean);
        assert!(ci.upper >= ci.mean);
        let width = ci.upper - ci.lower;
        assert!(width > 0.005 && width < 0.05, "width {width}");
    }

    #[test]
    fn test_bootstrap_ci_is_reproducible() {
        let f_scores = [0.1, 0.4, 0.35, 0.8, 0.05];
        assert_eq!(bootstrap_ci(&f_scores, 500, 7), bootstrap_ci(&f_scores, 500, 7));
    }

    #[test]
    fn test_bootstrap_ci_single_value() {
        let ci = bootstrap_ci(&[0.6], 100, 42).unwrap();
        assert!((ci.mean - 0.6).abs() < 1e-12);
        assert!((ci.lower - 0.6).abs() < 1e-12);
        assert!((ci.upper - 0.6).abs() < 1e-12);
        assert_eq!(ci.format(2), "0.60 [0.60, 0.60]");
    }

    #[test]
    fn test_bootstrap_ci_empty() {
        assert!(bootstrap_ci(&[], 100, 42).is_none());
        assert!(bootstrap_ci(&[0.5], 0, 42).is_none());
    }

    #[test]
    fn test_paired_ttest_significant() {
        let system = vec![0.30, 0.32, 0.28, 0.31, 0.29, 0.33, 0.27, 0.30];
        let baseline = vec![0.20, 0.22, 0.17, 0.21, 0.19, 0.23, 0.18, 0.20];

        let result = paired_ttest(&system, &baseline).unwrap();
        assert!(result.is_significant(0.001), "{}", result.format());
        assert!(result.t_statistic > 0.0);
        assert_eq!(result.df, 7);
    }

    #[test]
    fn test_paired_ttest_not_significant() {
        let system = vec![0.15, 0.17, 0.16, 0.14, 0.15];
        let baseline = vec![0.14, 0.16, 0.17, 0.15, 0.16];

        let result = paired_ttest(&system, &baseline).unwrap();
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_paired_ttest_rejects_unpaired_input() {
        assert!(paired_ttest(&[0.1, 0.2], &[0.1]).is_none());
        assert!(paired_ttest(&[0.1], &[0.2]).is_none());
    }

    #[test]
    fn test_cohens_d() {
        let a = vec![0.9, 0.92, 0.88, 0.91, 0.89];
        let b = vec![0.5, 0.52, 0.48, 0.51, 0.49];
        let d = cohens_d(&a, &b);
        assert!(d > 2.0);
        assert_eq!(interpret_cohens_d(d), "large");
        assert_eq!(cohens_d(&[0.5], &b), 0.0);
    }

    #[test]
    fn test_cohens_d_interpretation() {
        assert_eq!(interpret_cohens_d(0.1), "negligible");
        assert_eq!(interpret_cohens_d(0.3), "small");
        assert_eq!(interpret_cohens_d(0.6), "medium");
        assert_eq!(interpret_cohens_d(-0.9), "large");
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 0.001);
        assert!((normal_cdf(1.96) - 0.975).abs() < 0.01);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 0.01);
    }
}
