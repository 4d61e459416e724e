//! Hunter bullets.
//!
//! A bullet flies in a straight line at a fixed speed. The first body it
//! touches spends it; if that body is an enemy, the enemy is destroyed too.
//! Bullets that touch nothing expire after their lifetime.
//!
//! # Example
//!
//! ```
//! use bubbleborne_core::projectile::{Bullet, BulletConfig};
//! use froth::BodyId;
//! use glam::Vec2;
//!
//! let config = BulletConfig::default();
//! let mut bullet = Bullet::new(BodyId::new(1), Vec2::X, &config);
//! assert_eq!(bullet.velocity(), Vec2::new(20.0, 0.0));
//! assert!(!bullet.advance(1.0));
//! assert!(bullet.advance(2.0));
//! ```

use froth::{BodyCategory, BodyId, PhysicsEngine};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bubble::TIMER_EPSILON;
use crate::config::{ensure_positive, ConfigError};

/// Bullet tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Flight speed.
    pub speed: f32,
    /// Collider radius.
    pub radius: f32,
    /// Seconds before an untouched bullet is removed.
    pub lifetime: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            radius: 0.15,
            lifetime: 3.0,
        }
    }
}

impl BulletConfig {
    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("hunter.bullet.speed", self.speed)?;
        ensure_positive("hunter.bullet.radius", self.radius)?;
        ensure_positive("hunter.bullet.lifetime", self.lifetime)
    }
}

/// What a bullet did when it touched something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    /// The bullet is spent; the other body is untouched.
    Spent,
    /// The bullet is spent and took the enemy with it.
    Destroyed(BodyId),
}

/// A bullet in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    body: BodyId,
    velocity: Vec2,
    remaining: f32,
}

impl Bullet {
    /// Creates a bullet travelling along `direction`, which is normalized.
    #[must_use]
    pub fn new(body: BodyId, direction: Vec2, config: &BulletConfig) -> Self {
        Self {
            body,
            velocity: direction.normalize_or_zero() * config.speed,
            remaining: config.lifetime,
        }
    }

    /// Physics body.
    #[must_use]
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// Launch velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Seconds left before expiry.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Counts down the lifetime. Returns true once it has run out.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= TIMER_EPSILON
    }

    /// Resolves touching `other`. The bullet is spent either way.
    #[must_use]
    pub fn impact(&self, other: BodyId, engine: &dyn PhysicsEngine) -> Impact {
        match engine.category(other) {
            Some(BodyCategory::Enemy) => Impact::Destroyed(other),
            _ => Impact::Spent,
        }
    }
}
