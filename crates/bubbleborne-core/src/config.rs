//! Simulation configuration.
//!
//! [`SimulationConfig`] aggregates the tuning of every subsystem. All structs
//! use `#[serde(default)]`, so a JSON document only needs to name the values it
//! overrides:
//!
//! ```
//! use bubbleborne_core::config::SimulationConfig;
//!
//! let config = SimulationConfig::from_json_str(r#"{ "bubble": { "float_speed": 3.0 } }"#).unwrap();
//! assert_eq!(config.bubble.float_speed, 3.0);
//! assert_eq!(config.bubble.max_velocity, 5.0);
//! ```

use std::path::Path;

use froth::WorldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioConfig;
use crate::bubble::BubbleConfig;
use crate::fields::{InfluenceConfig, PullConfig};
use crate::hunter::HunterConfig;

/// Default fixed timestep (50 Hz).
pub const FIXED_DT: f32 = 1.0 / 50.0;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON for [`SimulationConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be positive, got {value}"),
        })
    }
}

/// Fails unless `value` is finite and not negative.
pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be zero or positive, got {value}"),
        })
    }
}

/// Fails unless `value` lies in `(0, 1]`.
pub(crate) fn ensure_unit_fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be in (0, 1], got {value}"),
        })
    }
}

/// Complete configuration of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds per tick.
    pub fixed_dt: f32,
    /// Physics world settings.
    pub world: WorldConfig,
    /// Bubble tuning.
    pub bubble: BubbleConfig,
    /// Hunter influence field.
    pub influence: InfluenceConfig,
    /// Hunter pull field.
    pub pull: PullConfig,
    /// Hunter movement.
    pub hunter: HunterConfig,
    /// Audio channel pool.
    pub audio: AudioConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            world: WorldConfig::default(),
            bubble: BubbleConfig::default(),
            influence: InfluenceConfig::default(),
            pull: PullConfig::default(),
            hunter: HunterConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`SimulationConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("fixed_dt", self.fixed_dt)?;
        self.bubble.validate()?;
        self.influence.validate()?;
        self.pull.validate()?;
        self.hunter.validate()?;
        self.audio.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_document_gives_defaults() {
        let config = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = SimulationConfig::default();
        config.bubble = BubbleConfig::minimal();
        config.pull.max_speed = 7.5;
        let json = serde_json::to_string(&config).unwrap();
        let back = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = SimulationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_timestep_rejected() {
        let err = SimulationConfig::from_json_str(r#"{ "fixed_dt": -0.1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "fixed_dt", .. }));
    }

    #[test]
    fn nested_error_names_field() {
        let err =
            SimulationConfig::from_json_str(r#"{ "bubble": { "min_size": 0.0 } }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for `bubble.min_size`: must be positive, got 0"
        );
    }

    #[test]
    fn bullet_tuning_nests_under_hunter() {
        let config = SimulationConfig::from_json_str(
            r#"{ "hunter": { "shoot_cooldown": 0.25, "bullet": { "speed": 12.0 } } }"#,
        )
        .unwrap();
        assert!((config.hunter.shoot_cooldown - 0.25).abs() < f32::EPSILON);
        assert!((config.hunter.bullet.speed - 12.0).abs() < f32::EPSILON);
        assert!((config.hunter.bullet.lifetime - 3.0).abs() < f32::EPSILON);

        let err = SimulationConfig::from_json_str(r#"{ "hunter": { "bullet": { "radius": 0.0 } } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "hunter.bullet.radius", .. }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
