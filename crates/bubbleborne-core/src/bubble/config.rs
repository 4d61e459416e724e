//! Bubble tuning and the two behaviour profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ensure_non_negative, ensure_positive, ensure_unit_fraction, ConfigError};

/// Collider radius as a fraction of the bubble's current size.
pub const COLLISION_RADIUS_FACTOR: f32 = 0.45;

/// Which behaviour set a bubble runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BubbleProfile {
    /// Animated shrink, corner escape, influence and pull awareness.
    #[default]
    Extended,
    /// Instant shrink, no corner logic, modifiers ignored.
    Minimal,
}

impl BubbleProfile {
    /// Whether the bubble detects and escapes corners.
    #[must_use]
    pub const fn detects_corners(self) -> bool {
        matches!(self, Self::Extended)
    }

    /// Whether shrinking is animated instead of applied at once.
    #[must_use]
    pub const fn animates_shrink(self) -> bool {
        matches!(self, Self::Extended)
    }

    /// Whether the influenced/pulled flags slow floatation and soften damping.
    #[must_use]
    pub const fn honours_modifiers(self) -> bool {
        matches!(self, Self::Extended)
    }
}

impl fmt::Display for BubbleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extended => write!(f, "Extended"),
            Self::Minimal => write!(f, "Minimal"),
        }
    }
}

/// Phase timings of the death sequence, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathTiming {
    /// Scale-up phase.
    pub grow_duration: f32,
    /// Scale multiplier reached at the end of the grow phase.
    pub grow_scale: f32,
    /// Pause at peak scale.
    pub peak_hold: f32,
    /// Scale-down-to-zero phase.
    pub collapse_duration: f32,
    /// Pause at zero scale before teardown.
    pub settle: f32,
    /// Delay between the session notification and destruction.
    pub teardown_delay: f32,
}

impl Default for DeathTiming {
    fn default() -> Self {
        Self {
            grow_duration: 0.3,
            grow_scale: 1.5,
            peak_hold: 0.2,
            collapse_duration: 0.5,
            settle: 0.1,
            teardown_delay: 0.2,
        }
    }
}

impl DeathTiming {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("bubble.death.grow_duration", self.grow_duration)?;
        ensure_positive("bubble.death.grow_scale", self.grow_scale)?;
        ensure_non_negative("bubble.death.peak_hold", self.peak_hold)?;
        ensure_non_negative("bubble.death.collapse_duration", self.collapse_duration)?;
        ensure_non_negative("bubble.death.settle", self.settle)?;
        ensure_non_negative("bubble.death.teardown_delay", self.teardown_delay)?;
        Ok(())
    }
}

/// Tuning for a single bubble.
///
/// The default is the extended profile; [`BubbleConfig::minimal`] is the
/// simplified preset.
///
/// # Example
///
/// ```
/// use bubbleborne_core::bubble::{BubbleConfig, BubbleProfile};
///
/// let config = BubbleConfig::minimal();
/// assert_eq!(config.profile, BubbleProfile::Minimal);
/// assert_eq!(config.push_guard, Some(0.5));
/// assert!(BubbleConfig::default().push_guard.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Behaviour profile.
    pub profile: BubbleProfile,

    // Motion
    /// Target upward speed when nothing is overhead.
    pub float_speed: f32,
    /// Rate (per second) at which vertical velocity approaches the float speed.
    pub float_approach_rate: f32,
    /// Speed cap applied every tick.
    pub max_velocity: f32,
    /// Horizontal velocity multiplier per tick.
    pub damping_force: f32,
    /// Horizontal velocity multiplier per tick while influenced or pulled.
    pub influenced_damping_force: f32,
    /// Force along the wall while escaping a corner.
    pub slide_force: f32,
    /// Force out of a corner.
    pub corner_escape_force: f32,
    /// Maximum angle in degrees between two contact normals that counts as a corner.
    pub corner_detection_angle: f32,
    /// Impulse applied when the player touches the bubble.
    pub push_force: f32,
    /// Speed above which the bubble reports movement on an axis.
    pub movement_threshold: f32,

    // Size
    /// Size at spawn, in world units.
    pub initial_size: f32,
    /// Fraction of the initial size lost per hit.
    pub shrink_amount: f32,
    /// Smallest size the bubble survives, in world units.
    pub min_size: f32,
    /// Duration of the animated shrink.
    pub shrink_duration: f32,

    // Body
    /// Body mass.
    pub mass: f32,
    /// Linear drag of the body.
    pub linear_drag: f32,

    /// Seconds after a player push during which pushes and hits are ignored.
    pub push_guard: Option<f32>,

    /// Death sequence timings.
    pub death: DeathTiming,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self::extended()
    }
}

impl BubbleConfig {
    /// The canonical profile.
    #[must_use]
    pub fn extended() -> Self {
        Self {
            profile: BubbleProfile::Extended,
            float_speed: 2.0,
            float_approach_rate: 2.0,
            max_velocity: 5.0,
            damping_force: 0.98,
            influenced_damping_force: 0.9,
            slide_force: 8.0,
            corner_escape_force: 15.0,
            corner_detection_angle: 90.0,
            push_force: 5.0,
            movement_threshold: 0.1,
            initial_size: 1.0,
            shrink_amount: 0.2,
            min_size: 0.5,
            shrink_duration: 0.3,
            mass: 1.0,
            linear_drag: 0.5,
            push_guard: None,
            death: DeathTiming::default(),
        }
    }

    /// The simplified profile with a short invulnerability window after a push.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            profile: BubbleProfile::Minimal,
            push_guard: Some(0.5),
            ..Self::extended()
        }
    }

    /// Collider radius for a given size fraction.
    #[must_use]
    pub fn collision_radius(&self, size_fraction: f32) -> f32 {
        self.initial_size * size_fraction * COLLISION_RADIUS_FACTOR
    }

    /// Cosine of the corner detection angle.
    #[must_use]
    pub fn corner_cos(&self) -> f32 {
        self.corner_detection_angle.to_radians().cos()
    }

    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("bubble.float_speed", self.float_speed)?;
        ensure_positive("bubble.float_approach_rate", self.float_approach_rate)?;
        ensure_positive("bubble.max_velocity", self.max_velocity)?;
        ensure_unit_fraction("bubble.damping_force", self.damping_force)?;
        ensure_unit_fraction("bubble.influenced_damping_force", self.influenced_damping_force)?;
        ensure_non_negative("bubble.slide_force", self.slide_force)?;
        ensure_non_negative("bubble.corner_escape_force", self.corner_escape_force)?;
        if !(0.0..=180.0).contains(&self.corner_detection_angle) {
            return Err(ConfigError::InvalidValue {
                field: "bubble.corner_detection_angle",
                reason: format!("must be in [0, 180], got {}", self.corner_detection_angle),
            });
        }
        ensure_non_negative("bubble.push_force", self.push_force)?;
        ensure_non_negative("bubble.movement_threshold", self.movement_threshold)?;
        ensure_positive("bubble.initial_size", self.initial_size)?;
        ensure_positive("bubble.shrink_amount", self.shrink_amount)?;
        ensure_positive("bubble.min_size", self.min_size)?;
        if self.min_size > self.initial_size {
            return Err(ConfigError::InvalidValue {
                field: "bubble.min_size",
                reason: format!(
                    "must not exceed initial_size ({} > {})",
                    self.min_size, self.initial_size
                ),
            });
        }
        ensure_positive("bubble.shrink_duration", self.shrink_duration)?;
        ensure_positive("bubble.mass", self.mass)?;
        ensure_non_negative("bubble.linear_drag", self.linear_drag)?;
        if let Some(guard) = self.push_guard {
            ensure_positive("bubble.push_guard", guard)?;
        }
        self.death.validate()
    }
}
