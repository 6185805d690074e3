use std::fmt;
use std::str::FromStr;

use log::*;
use statrs::distribution::{
    ContinuousCDF,
    Normal,
};

use crate::data_structs::typedef::DensityType;

/// Confidence level used when none is configured.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Interval estimator for a binomial proportion.
///
/// Both methods keep reasonable coverage near the 0 and 1 boundaries
/// where the plain Wald interval collapses, which is the norm rather
/// than the exception for per-site methylation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CiMethod {
    #[default]
    AgrestiCoull,
    Wilson,
}

impl FromStr for CiMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agresti-coull" | "agresti_coull" | "ac" => Ok(Self::AgrestiCoull),
            "wilson" => Ok(Self::Wilson),
            other => Err(format!("unknown confidence interval method: {}", other)),
        }
    }
}

impl fmt::Display for CiMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::AgrestiCoull => write!(f, "agresti-coull"),
            Self::Wilson => write!(f, "wilson"),
        }
    }
}

/// Two-sided standard normal quantile for a confidence level, e.g.
/// ≈1.96 for 95%. Falls back to [`DEFAULT_CONFIDENCE`] on levels
/// outside (0, 1).
pub fn z_score(confidence: f64) -> f64 {
    let confidence = if confidence > 0.0 && confidence < 1.0 {
        confidence
    }
    else {
        warn!(
            "Confidence level {} outside (0, 1), falling back to {}",
            confidence, DEFAULT_CONFIDENCE
        );
        DEFAULT_CONFIDENCE
    };
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.inverse_cdf(0.5 + confidence / 2.0)
}

/// Agresti-Coull interval: add `z²/2` pseudo-successes and `z²`
/// pseudo-trials, then apply the Wald formula around the adjusted
/// centre.
pub fn agresti_coull(
    successes: u64,
    trials: u64,
    z: f64,
) -> (DensityType, DensityType) {
    let z2 = z * z;
    let n_adj = trials as f64 + z2;
    let p_adj = (successes as f64 + z2 / 2.0) / n_adj;
    let half = z * (p_adj * (1.0 - p_adj) / n_adj).sqrt();
    (p_adj - half, p_adj + half)
}

/// Wilson score interval for the same adjusted centre, with the score
/// test's exact half-width.
pub fn wilson(
    successes: u64,
    trials: u64,
    z: f64,
) -> (DensityType, DensityType) {
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let centre = p + z2 / (2.0 * n);
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt();
    ((centre - half) / denom, (centre + half) / denom)
}

/// Confidence interval on `successes / trials`, clamped to `[0, 1]`.
/// Zero trials carry no information and yield the vacuous `(0, 1)`.
pub fn binomial_ci(
    successes: u64,
    trials: u64,
    z: f64,
    method: CiMethod,
) -> (DensityType, DensityType) {
    if trials == 0 {
        warn!("Confidence interval requested for zero trials");
        return (0.0, 1.0);
    }
    let (lower, upper) = match method {
        CiMethod::AgrestiCoull => agresti_coull(successes, trials, z),
        CiMethod::Wilson => wilson(successes, trials, z),
    };
    (lower.clamp(0.0, 1.0), upper.clamp(0.0, 1.0))
}

/// Fraction with the degenerate zero-denominator case mapped to the 0
/// sentinel instead of NaN.
pub fn safe_frac(
    numerator: u64,
    denominator: u64,
) -> DensityType {
    if denominator == 0 {
        0.0
    }
    else {
        numerator as DensityType / denominator as DensityType
    }
}
