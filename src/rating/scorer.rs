//! Prediction scoring

use crate::error::{RatingError, Result};

/// Mean squared difference between predicted probabilities and realized outcomes.
/// Lower is better.
pub fn brier_score(predictions: &[f64], outcomes: &[f64]) -> Result<f64> {
    if predictions.is_empty() {
        return Err(RatingError::EmptyInput {
            reason: "No predictions to score".to_string(),
        }
        .into());
    }
    if predictions.len() != outcomes.len() {
        return Err(RatingError::EmptyInput {
            reason: format!(
                "{} predictions but {} outcomes",
                predictions.len(),
                outcomes.len()
            ),
        }
        .into());
    }

    let total: f64 = predictions
        .iter()
        .zip(outcomes)
        .map(|(p, o)| (p - o).powi(2))
        .sum();

    Ok(total / predictions.len() as f64)
}
