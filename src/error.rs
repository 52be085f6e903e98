//! Error types for the rating ledger
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate. Domain failures are raised as [`RatingError`] and can be
//! recovered from an [`anyhow::Error`] with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid outcome {outcome}: allowed values are 1 (win) and 0 (loss)")]
    InvalidOutcome { outcome: f64 },

    #[error("Unresolved participant in slot {slot}: {reason}")]
    UnresolvedParticipant { slot: String, reason: String },

    #[error("Participant {player_id} appears more than once in the same match")]
    DuplicateParticipant { player_id: String },

    #[error("Empty input: {reason}")]
    EmptyInput { reason: String },

    #[error("Matches out of chronological order at index {index}")]
    UnorderedMatches { index: usize },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
