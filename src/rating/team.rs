//! Doubles team projection
//!
//! Two competitors playing together are rated as one virtual competitor. The team
//! delta that comes out of the model is then shared back between the two members.

use crate::rating::competitor::Competitor;
use crate::utils::rating_difference;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Separator used when building a team's id and name from its members
pub const TEAM_SEPARATOR: &str = "_";

/// How a team delta was shared between two members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaSplit {
    pub first: f64,
    pub second: f64,
    /// Share given to the first member
    pub share: f64,
    /// The share exponent overflowed and was clamped
    pub degraded: bool,
}

/// Virtual competitor representing a doubles pairing. Never registered in a ledger.
pub struct TeamProjection;

impl TeamProjection {
    /// Combine two competitors into a single team rating.
    ///
    /// The combined spread assumes the members' skills are independent and ignores
    /// any correlation between teammates.
    pub fn combine(p1: &Competitor, p2: &Competitor) -> Competitor {
        let rating = (p1.rating() + p2.rating()) / 2.0;
        let spread = (p1.spread().powi(2) + p2.spread().powi(2)).sqrt();
        let kfactor = (p1.kfactor() + p2.kfactor()) / 2.0;

        Competitor::with_params(
            format!("{}{}{}", p1.id(), TEAM_SEPARATOR, p2.id()),
            format!("{}{}{}", p1.name(), TEAM_SEPARATOR, p2.name()),
            rating,
            spread,
            kfactor,
        )
    }

    /// Share `team_delta` between the two members with a logistic weight.
    ///
    /// `share1 = 1 / (1 + e^((r1 - r2) / s1))`. When the exponential overflows the
    /// first member's share is clamped to 0 and the split is flagged as degraded.
    pub fn split_delta(p1: &Competitor, p2: &Competitor, team_delta: f64) -> DeltaSplit {
        let exponent = ((p1.rating() - p2.rating()) / p1.spread()).exp();

        let (share, degraded) = if exponent.is_finite() {
            (1.0 / (1.0 + exponent), false)
        } else {
            warn!(
                first = p1.name(),
                first_rating = p1.rating(),
                second = p2.name(),
                second_rating = p2.rating(),
                gap = rating_difference(p1.rating(), p2.rating()),
                "Doubles share overflowed, assigning full delta to second member"
            );
            (0.0, true)
        };

        DeltaSplit {
            first: share * team_delta,
            second: (1.0 - share) * team_delta,
            share,
            degraded,
        }
    }
}
