//! Elo Ledger - sequential ELO ratings for singles and doubles match histories
//!
//! This crate replays chronologically ordered match results through a logistic
//! rating model, projects doubles pairs onto a single team rating, and scores
//! the model's predictions with the Brier score.

pub mod config;
pub mod error;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use rating::{Competitor, EvaluationRow, EvaluationTable, RatingLedger, TeamProjection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
