//! Competitor state tracked by the ledger
//!
//! A competitor's rating changes only through [`Competitor::apply_delta`], which
//! also appends to the rating history, so the last history entry always equals
//! the current rating.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;

/// A rated player (or a virtual doubles team)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    id: PlayerId,
    name: String,
    rating: f64,
    spread: f64,
    kfactor: f64,
    rating_history: Vec<f64>,
}

impl Competitor {
    pub const DEFAULT_RATING: f64 = 1500.0;
    pub const DEFAULT_SPREAD: f64 = 400.0;
    pub const DEFAULT_KFACTOR: f64 = 180.0;

    /// Create a competitor with default rating, spread and k-factor
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self::with_params(
            id,
            name,
            Self::DEFAULT_RATING,
            Self::DEFAULT_SPREAD,
            Self::DEFAULT_KFACTOR,
        )
    }

    pub fn with_params(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        rating: f64,
        spread: f64,
        kfactor: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            spread,
            kfactor,
            rating_history: vec![rating],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn kfactor(&self) -> f64 {
        self.kfactor
    }

    pub fn rating_history(&self) -> &[f64] {
        &self.rating_history
    }

    /// Number of matches processed so far
    pub fn matches_played(&self) -> usize {
        self.rating_history.len() - 1
    }

    /// Shift the rating by `delta` and record the new value in the history
    pub fn apply_delta(&mut self, delta: f64) {
        self.rating += delta;
        self.rating_history.push(self.rating);
    }
}

impl From<&Competitor> for EloRating {
    fn from(competitor: &Competitor) -> Self {
        Self {
            rating: competitor.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_competitor_defaults() {
        let player = Competitor::new("17", "Axelsen");
        assert_eq!(player.id(), "17");
        assert_eq!(player.name(), "Axelsen");
        assert_eq!(player.rating(), 1500.0);
        assert_eq!(player.spread(), 400.0);
        assert_eq!(player.kfactor(), 180.0);
        assert_eq!(player.rating_history(), &[1500.0]);
        assert_eq!(player.matches_played(), 0);
    }

    #[test]
    fn test_apply_delta_appends_history() {
        let mut player = Competitor::new("17", "Axelsen");
        player.apply_delta(90.0);
        player.apply_delta(-30.5);

        assert_eq!(player.rating(), 1559.5);
        assert_eq!(player.rating_history(), &[1500.0, 1590.0, 1559.5]);
        assert_eq!(player.matches_played(), 2);
        assert_eq!(player.rating_history().last(), Some(&player.rating()));
    }

    #[test]
    fn test_elo_rating_conversion() {
        let mut player = Competitor::with_params("1", "A", 1620.0, 350.0, 32.0);
        player.apply_delta(5.0);

        let elo: EloRating = (&player).into();
        assert_eq!(elo.rating, 1625.0);
    }
}
