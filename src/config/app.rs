//! Main application configuration
//!
//! This module defines the primary configuration structures for the elo-ledger
//! tool, including environment variable and TOML file loading and validation.

use crate::config::rating::{RatingConfig, ReplayOptions};
use crate::rating::model::ProbabilityEstimator;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub replay: ReplayOptions,
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "elo-ledger".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(rating) = env::var("DEFAULT_RATING") {
            self.rating.initial_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_RATING value: {}", rating))?;
        }
        if let Ok(spread) = env::var("DEFAULT_SPREAD") {
            self.rating.default_spread = spread
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_SPREAD value: {}", spread))?;
        }
        if let Ok(kfactor) = env::var("DEFAULT_KFACTOR") {
            self.rating.default_kfactor = kfactor
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_KFACTOR value: {}", kfactor))?;
        }
        if let Ok(start) = env::var("SYNTHETIC_ID_START") {
            self.rating.synthetic_id_start = start
                .parse()
                .map_err(|_| anyhow!("Invalid SYNTHETIC_ID_START value: {}", start))?;
        }

        // Replay settings
        if let Ok(mov) = env::var("MARGIN_OF_VICTORY") {
            self.replay.margin_of_victory = mov
                .parse()
                .map_err(|_| anyhow!("Invalid MARGIN_OF_VICTORY value: {}", mov))?;
        }
        if let Ok(scale) = env::var("AUTOCORR_SCALE") {
            self.replay.autocorr_scale = Some(
                scale
                    .parse()
                    .map_err(|_| anyhow!("Invalid AUTOCORR_SCALE value: {}", scale))?,
            );
        }
        if let Ok(threshold) = env::var("COLD_START_THRESHOLD") {
            self.replay.cold_start_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("Invalid COLD_START_THRESHOLD value: {}", threshold))?;
        }
        if let Ok(estimator) = env::var("ESTIMATOR") {
            self.replay.estimator = estimator.parse::<ProbabilityEstimator>()?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;
    config.replay.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.replay.cold_start_threshold, 0);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_rating_section() {
        let mut config = AppConfig::default();
        config.rating.default_spread = -1.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let raw = r#"
            [rating]
            default_kfactor = 32.0

            [replay]
            margin_of_victory = true
            autocorr_scale = 2200.0
            cold_start_threshold = 3
            estimator = "normal_overlap"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.rating.default_kfactor, 32.0);
        assert_eq!(config.rating.default_spread, 400.0);
        assert!(config.replay.margin_of_victory);
        assert_eq!(config.replay.autocorr_scale, Some(2200.0));
        assert_eq!(config.replay.cold_start_threshold, 3);
        assert_eq!(config.replay.estimator, ProbabilityEstimator::NormalOverlap);
        assert_eq!(config.service.name, "elo-ledger");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("elo-ledger-{}.toml", std::process::id()));
        std::fs::write(&path, "[service]\nlog_level = \"debug\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.rating, RatingConfig::default());
    }

    #[test]
    fn test_from_missing_file() {
        let path = Path::new("/nonexistent/elo-ledger.toml");
        assert!(AppConfig::from_file(path).is_err());
    }
}
