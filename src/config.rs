//! Tunable constants of the eligibility projection.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for [`crate::eligibility::Projector`].
///
/// Loaded from TOML; missing keys fall back to their defaults.
///
/// ```toml
/// min_historical_threshold = 5
/// average_working_days_per_week = 5.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Classes that must already have been conducted before the observed
    /// class rate is trusted over the theoretical weekly schedule.
    #[serde(default = "default_min_historical_threshold")]
    pub min_historical_threshold: u32,

    /// Class days in an average week: 5 weekdays plus 2 of 4 Saturdays.
    #[serde(default = "default_average_working_days_per_week")]
    pub average_working_days_per_week: f64,
}

fn default_min_historical_threshold() -> u32 {
    5
}

fn default_average_working_days_per_week() -> f64 {
    5.5
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            min_historical_threshold: default_min_historical_threshold(),
            average_working_days_per_week: default_average_working_days_per_week(),
        }
    }
}

impl ProjectionConfig {
    pub fn with_min_historical_threshold(mut self, threshold: u32) -> Self {
        self.min_historical_threshold = threshold;
        self
    }

    pub fn with_average_working_days_per_week(mut self, days: f64) -> Self {
        self.average_working_days_per_week = days;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let days = self.average_working_days_per_week;
        if !days.is_finite() || days <= 0.0 {
            return Err(ConfigError::InvalidAverageWorkingDays(days));
        }
        Ok(())
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
