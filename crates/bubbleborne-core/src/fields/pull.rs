//! Pull field: drags nearby bubbles toward the actor while engaged.

use std::collections::BTreeMap;

use froth::{BodyId, CategoryMask, PhysicsEngine};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bubble::motion::clamp_speed;
use crate::bubble::Bubble;
use crate::config::{ensure_non_negative, ensure_positive, ConfigError};

/// Pull field tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullConfig {
    /// Query radius around the actor.
    pub radius: f32,
    /// Pull speed at the edge of the radius.
    pub force: f32,
    /// Cap on the velocity the field sets.
    pub max_speed: f32,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            force: 10.0,
            max_speed: 5.0,
        }
    }
}

impl PullConfig {
    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-positive radius or
    /// maximum speed, or a negative force.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("pull.radius", self.radius)?;
        ensure_non_negative("pull.force", self.force)?;
        ensure_positive("pull.max_speed", self.max_speed)
    }
}

/// Active force emitter attached to an actor.
///
/// While engaged (and enabled), every living bubble within the radius has its
/// velocity **set** to `direction · force · clamp01(distance / radius)`, capped
/// at `max_speed`, and is flagged pulled. Releasing the pull, or disabling the
/// field, re-queries the radius and clears the flag on every bubble found.
#[derive(Debug, Clone)]
pub struct PullField {
    config: PullConfig,
    pulling: bool,
    enabled: bool,
}

impl PullField {
    /// Creates an enabled, idle field.
    #[must_use]
    pub fn new(config: PullConfig) -> Self {
        Self {
            config,
            pulling: false,
            enabled: true,
        }
    }

    /// Field tuning.
    #[must_use]
    pub const fn config(&self) -> &PullConfig {
        &self.config
    }

    /// Whether the pull input is held and the field is enabled.
    #[must_use]
    pub const fn is_pulling(&self) -> bool {
        self.pulling && self.enabled
    }

    /// Whether the field is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handles a press of the pull input. Returns true if the field engaged.
    pub fn press(&mut self) -> bool {
        if !self.enabled || self.pulling {
            return false;
        }
        self.pulling = true;
        debug!(radius = self.config.radius, "pull engaged");
        true
    }

    /// Handles a release of the pull input and returns how many bubbles
    /// were released.
    pub fn release(
        &mut self,
        actor: BodyId,
        bubbles: &mut BTreeMap<BodyId, Bubble>,
        engine: &dyn PhysicsEngine,
    ) -> usize {
        self.pulling = false;
        let released = self.release_pass(actor, bubbles, engine);
        debug!(released, "pull released");
        released
    }

    /// Enables or disables the field. Disabling releases like an input
    /// release around `actor` and returns how many bubbles were released.
    ///
    /// Without an actor the toggle still takes effect; nothing is released.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        actor: Option<BodyId>,
        bubbles: &mut BTreeMap<BodyId, Bubble>,
        engine: &dyn PhysicsEngine,
    ) -> usize {
        self.enabled = enabled;
        if enabled {
            return 0;
        }
        match actor {
            Some(actor) => self.release(actor, bubbles, engine),
            None => {
                self.pulling = false;
                debug!("pull disabled without an actor");
                0
            }
        }
    }

    fn release_pass(
        &self,
        actor: BodyId,
        bubbles: &mut BTreeMap<BodyId, Bubble>,
        engine: &dyn PhysicsEngine,
    ) -> usize {
        let Some(center) = engine.position(actor) else {
            return 0;
        };
        let mut released = 0;
        for id in engine.overlap_circle(center, self.config.radius, CategoryMask::BUBBLE) {
            if let Some(bubble) = bubbles.get_mut(&id) {
                bubble.set_pulled(false);
                released += 1;
            }
        }
        released
    }

    /// Applies one tick of pull toward `actor` and returns how many bubbles
    /// were pulled. Does nothing unless engaged.
    pub fn apply(
        &mut self,
        actor: BodyId,
        bubbles: &mut BTreeMap<BodyId, Bubble>,
        engine: &mut dyn PhysicsEngine,
    ) -> usize {
        if !self.is_pulling() {
            return 0;
        }
        let Some(center) = engine.position(actor) else {
            return 0;
        };

        let mut pulled = 0;
        for id in engine.overlap_circle(center, self.config.radius, CategoryMask::BUBBLE) {
            let Some(bubble) = bubbles.get_mut(&id) else {
                continue;
            };
            let Some(position) = engine.position(id) else {
                continue;
            };
            if !bubble.state().is_alive() {
                continue;
            }

            let offset = center - position;
            let factor = (offset.length() / self.config.radius).clamp(0.0, 1.0);
            let direction = offset.normalize_or_zero();
            if direction != Vec2::ZERO {
                let velocity =
                    clamp_speed(direction * self.config.force * factor, self.config.max_speed);
                engine.set_velocity(id, velocity);
            }
            bubble.set_pulled(true);
            pulled += 1;
        }
        pulled
    }
}
