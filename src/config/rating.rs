//! Rating system configuration

use crate::error::{RatingError, Result};
use crate::rating::model::ProbabilityEstimator;
use serde::{Deserialize, Serialize};

/// Parameters fixed for the lifetime of a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned to competitors on first encounter
    pub initial_rating: f64,
    /// Logistic curve width ("sd") for new competitors
    pub default_spread: f64,
    /// Sensitivity ("k-factor") for new competitors
    pub default_kfactor: f64,
    /// First identifier minted for participants without one
    pub synthetic_id_start: u64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            default_spread: 400.0,
            default_kfactor: 180.0,
            synthetic_id_start: 2_000_001,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.initial_rating.is_finite() {
            return Err(RatingError::ConfigurationError {
                message: "Initial rating must be finite".to_string(),
            }
            .into());
        }

        if !(self.default_spread.is_finite() && self.default_spread > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Default spread must be positive".to_string(),
            }
            .into());
        }

        if !(self.default_kfactor.is_finite() && self.default_kfactor > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Default k-factor must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Options that may change from one replay to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Scale deltas by ln(1 + |margin|) when a match carries a margin
    pub margin_of_victory: bool,
    /// Auto-correlation scale, typically 1500-2500
    pub autocorr_scale: Option<f64>,
    /// Minimum number of prior matches before a prediction is scored
    pub cold_start_threshold: usize,
    /// Estimator used for the recorded match prediction
    pub estimator: ProbabilityEstimator,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            margin_of_victory: false,
            autocorr_scale: None,
            cold_start_threshold: 0,
            estimator: ProbabilityEstimator::Logistic,
        }
    }
}

impl ReplayOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(scale) = self.autocorr_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(RatingError::ConfigurationError {
                    message: "Auto-correlation scale must be positive".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Margin to feed the model for a given match margin
    pub fn effective_margin(&self, margin: Option<f64>) -> Option<f64> {
        if self.margin_of_victory {
            margin
        } else {
            None
        }
    }
}
