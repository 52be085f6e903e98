//! Configuration management for the elo-ledger tool
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for rating replays.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use rating::{RatingConfig, ReplayOptions};
