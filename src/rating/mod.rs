//! Sequential ELO rating engine
//!
//! This module provides the logistic rating model, competitor state, doubles
//! team projection, the replay ledger, and prediction scoring.

pub mod competitor;
pub mod ledger;
pub mod model;
pub mod scorer;
pub mod team;

// Re-export commonly used types
pub use competitor::Competitor;
pub use ledger::{
    replay_by_category, DoublesResult, EvaluationRow, EvaluationTable, MatchFailure,
    RatingLedger, ReplaySummary, SinglesResult, SlotResult,
};
pub use model::{
    expected_win_probability, expected_win_probability_normal, rating_delta,
    ProbabilityEstimator,
};
pub use scorer::brier_score;
pub use team::{DeltaSplit, TeamProjection};
