//! The hunter: the player actor that carries the influence and pull fields.
//!
//! Movement approaches a target velocity at a fixed rate rather than applying
//! forces, so the hunter stops crisply when input is released. Away from the
//! ground the rate is scaled down by `air_control`.
//!
//! The hunter also shoots. A shot goes along the move input when there is
//! one, otherwise along the facing, and the gun then cools down for
//! `shoot_cooldown` seconds.

use std::fmt;

use froth::{BodyCategory, BodyId, Contact, PhysicsEngine, MAX_CONTACTS};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bubble::TIMER_EPSILON;
use crate::collaborators::{AnimationTrigger, Animator};
use crate::config::{ensure_non_negative, ensure_positive, ensure_unit_fraction, ConfigError};
use crate::projectile::BulletConfig;

/// Input magnitude below which the hunter decelerates instead of accelerating.
const INPUT_EPSILON: f32 = 0.01;

/// Speed above which the hunter counts as moving, and horizontal speed above
/// which it turns to face its motion.
const MOTION_THRESHOLD: f32 = 0.1;

/// Input magnitude above which shots follow the input instead of the facing.
const AIM_THRESHOLD: f32 = 0.1;

/// Hunter tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    /// Top speed at full input.
    pub move_speed: f32,
    /// Rate toward the target velocity while input is held.
    pub acceleration: f32,
    /// Rate toward rest while no input is held.
    pub deceleration: f32,
    /// Rate multiplier while not touching terrain, in `(0, 1]`.
    pub air_control: f32,
    /// Linear drag of the hunter's body.
    pub linear_drag: f32,
    /// Collider radius.
    pub radius: f32,
    /// Body mass.
    pub mass: f32,
    /// Seconds between shots.
    pub shoot_cooldown: f32,
    /// Tuning of the bullets the hunter fires.
    pub bullet: BulletConfig,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            acceleration: 50.0,
            deceleration: 30.0,
            air_control: 0.7,
            linear_drag: 3.0,
            radius: 0.5,
            mass: 1.0,
            shoot_cooldown: 0.5,
            bullet: BulletConfig::default(),
        }
    }
}

impl HunterConfig {
    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("hunter.move_speed", self.move_speed)?;
        ensure_positive("hunter.acceleration", self.acceleration)?;
        ensure_positive("hunter.deceleration", self.deceleration)?;
        ensure_unit_fraction("hunter.air_control", self.air_control)?;
        ensure_positive("hunter.radius", self.radius)?;
        ensure_positive("hunter.mass", self.mass)?;
        ensure_non_negative("hunter.linear_drag", self.linear_drag)?;
        ensure_non_negative("hunter.shoot_cooldown", self.shoot_cooldown)?;
        self.bullet.validate()
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Player actor state.
pub struct Hunter {
    body: BodyId,
    config: HunterConfig,
    input: Vec2,
    alive: bool,
    /// `1.0` facing right, `-1.0` facing left.
    facing: f32,
    /// Seconds until the gun can fire again.
    cooldown: f32,
    animator: Option<Box<dyn Animator>>,
}

impl fmt::Debug for Hunter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hunter")
            .field("body", &self.body)
            .field("input", &self.input)
            .field("alive", &self.alive)
            .field("facing", &self.facing)
            .field("cooldown", &self.cooldown)
            .field("animator", &self.animator.is_some())
            .finish_non_exhaustive()
    }
}

impl Hunter {
    /// Creates a living hunter for an existing body, facing right with the
    /// gun ready.
    #[must_use]
    pub fn new(body: BodyId, config: HunterConfig) -> Self {
        Self {
            body,
            config,
            input: Vec2::ZERO,
            alive: true,
            facing: 1.0,
            cooldown: 0.0,
            animator: None,
        }
    }

    /// Attaches an animation driver.
    #[must_use]
    pub fn with_animator(mut self, animator: Box<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Physics body.
    #[must_use]
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// Hunter tuning.
    #[must_use]
    pub const fn config(&self) -> &HunterConfig {
        &self.config
    }

    /// Current move input.
    #[must_use]
    pub const fn input(&self) -> Vec2 {
        self.input
    }

    /// Whether the hunter is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Horizontal facing: `1.0` right, `-1.0` left.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Seconds until the gun can fire again.
    #[must_use]
    pub const fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Sets the move input, clamped to unit length. Ignored once dead.
    pub fn set_move_input(&mut self, input: Vec2) {
        if self.alive {
            self.input = input.clamp_length_max(1.0);
        }
    }

    /// Whether any current contact is with terrain.
    fn is_grounded(&self, engine: &dyn PhysicsEngine) -> bool {
        let mut contacts = [Contact::default(); MAX_CONTACTS];
        let count = engine.contacts(self.body, &mut contacts);
        contacts[..count]
            .iter()
            .filter_map(|contact| contact.other)
            .any(|other| engine.category(other) == Some(BodyCategory::Terrain))
    }

    /// Steers the body toward the input velocity for one fixed step, turns
    /// to face the motion and counts down the gun cooldown.
    pub fn fixed_update(&mut self, dt: f32, engine: &mut dyn PhysicsEngine) {
        if !self.alive {
            return;
        }
        self.cooldown = (self.cooldown - dt).max(0.0);
        let Some(velocity) = engine.velocity(self.body) else {
            return;
        };

        let target = self.input * self.config.move_speed;
        let control = if self.is_grounded(engine) {
            1.0
        } else {
            self.config.air_control
        };
        let rate = if target.length() > INPUT_EPSILON {
            self.config.acceleration
        } else {
            self.config.deceleration
        };

        let velocity = move_towards(velocity, target, rate * control * dt);
        engine.set_velocity(self.body, velocity);

        if velocity.x.abs() > MOTION_THRESHOLD {
            self.facing = velocity.x.signum();
        }
        if let Some(animator) = self.animator.as_mut() {
            animator.set_in_motion(velocity.length() > MOTION_THRESHOLD);
        }
    }

    /// Pulls the trigger. Returns the unit shot direction, or `None` while
    /// dead or cooling down.
    pub fn try_fire(&mut self) -> Option<Vec2> {
        if !self.alive || self.cooldown > TIMER_EPSILON {
            return None;
        }
        let direction = if self.input.length() > AIM_THRESHOLD {
            self.input.normalize()
        } else {
            Vec2::new(self.facing, 0.0)
        };
        self.cooldown = self.config.shoot_cooldown;
        debug!(body = %self.body, ?direction, "hunter fired");
        Some(direction)
    }

    /// Where a shot along `direction` leaves the body: on the collider edge.
    #[must_use]
    pub fn muzzle(&self, direction: Vec2, engine: &dyn PhysicsEngine) -> Option<Vec2> {
        engine
            .position(self.body)
            .map(|center| center + direction * self.config.radius)
    }

    /// Reacts to touching `other`. Returns true if the touch killed the hunter.
    pub fn on_touch(&mut self, other: BodyId, engine: &mut dyn PhysicsEngine) -> bool {
        if !self.alive || !engine.category(other).is_some_and(BodyCategory::is_harmful) {
            return false;
        }
        self.alive = false;
        self.input = Vec2::ZERO;
        engine.set_velocity(self.body, Vec2::ZERO);
        if let Some(animator) = self.animator.as_mut() {
            animator.trigger(AnimationTrigger::IsDying);
        }
        info!(body = %self.body, killer = %other, "hunter died");
        true
    }
}
