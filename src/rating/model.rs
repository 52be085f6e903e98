//! Logistic (ELO-style) rating model
//!
//! Pure functions mapping two competitors to a win probability and to the
//! rating change one of them should receive after a result.
//!
//! The primary estimator is the asymmetric logistic form
//! `1 / (1 + 10^((r_b - r_a) / spread_a))`, which only uses the first
//! competitor's spread. A normal-overlap estimator is kept alongside it and can be
//! selected per replay through [`ProbabilityEstimator`].

use crate::error::{RatingError, Result};
use crate::rating::competitor::Competitor;
use crate::utils::normal_cdf;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Probability that `a` beats `b`, scaled by `a`'s spread only
pub fn expected_win_probability(a: &Competitor, b: &Competitor) -> f64 {
    1.0 / (1.0 + 10f64.powf((b.rating() - a.rating()) / a.spread()))
}

/// Probability that `a` beats `b` when both ratings are treated as independent
/// normal distributions: `P(X_a - X_b > 0)`.
pub fn expected_win_probability_normal(a: &Competitor, b: &Competitor) -> f64 {
    let mean = a.rating() - b.rating();
    let std_dev = (a.spread().powi(2) + b.spread().powi(2)).sqrt();

    // 1 - Phi((0 - mean) / sd)
    1.0 - normal_cdf(-mean / std_dev)
}

/// Multiplier for a margin of victory; absent or zero margins leave the delta unscaled
pub fn margin_multiplier(margin: Option<f64>) -> f64 {
    match margin {
        Some(m) if m != 0.0 && m.is_finite() => m.abs().ln_1p(),
        _ => 1.0,
    }
}

/// Dampening factor in (0, 2) that shrinks gains for a favourite with a large
/// rating gap and boosts those of an underdog
pub fn autocorrelation_multiplier(a: &Competitor, b: &Competitor, scale: Option<f64>) -> f64 {
    match scale {
        Some(scale) => 2.0 / (1.0 + ((a.rating() - b.rating()) / scale).exp()),
        None => 1.0,
    }
}

/// Signed rating change for `a` after a result against `b`.
///
/// `outcome` is 1 for a win and 0 for a loss from `a`'s side. The opponent's change
/// is not the negation of this value when k-factors or spreads differ, so callers
/// compute it with a second call.
pub fn rating_delta(
    a: &Competitor,
    b: &Competitor,
    outcome: f64,
    margin: Option<f64>,
    autocorr_scale: Option<f64>,
) -> Result<f64> {
    if outcome != 0.0 && outcome != 1.0 {
        return Err(RatingError::InvalidOutcome { outcome }.into());
    }

    let base = (outcome - expected_win_probability(a, b)) * a.kfactor();
    Ok(base * margin_multiplier(margin) * autocorrelation_multiplier(a, b, autocorr_scale))
}

/// Named win-probability estimators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityEstimator {
    /// Asymmetric logistic curve, see [`expected_win_probability`]
    #[default]
    Logistic,
    /// Normal-distribution overlap, see [`expected_win_probability_normal`]
    NormalOverlap,
}

impl ProbabilityEstimator {
    pub fn predict(&self, a: &Competitor, b: &Competitor) -> f64 {
        match self {
            ProbabilityEstimator::Logistic => expected_win_probability(a, b),
            ProbabilityEstimator::NormalOverlap => expected_win_probability_normal(a, b),
        }
    }
}

impl std::fmt::Display for ProbabilityEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbabilityEstimator::Logistic => write!(f, "logistic"),
            ProbabilityEstimator::NormalOverlap => write!(f, "normal_overlap"),
        }
    }
}

impl FromStr for ProbabilityEstimator {
    type Err = RatingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "logistic" => Ok(ProbabilityEstimator::Logistic),
            "normal_overlap" | "normal" => Ok(ProbabilityEstimator::NormalOverlap),
            other => Err(RatingError::ConfigurationError {
                message: format!("Unknown probability estimator: {}", other),
            }),
        }
    }
}
