//! Bubble entity: motion policy, size and lifecycle.
//!
//! A [`Bubble`] is the gameplay state attached to one physics body. The body
//! itself (position, velocity, collider) lives in the physics engine; the
//! bubble reads and writes it through [`PhysicsEngine`] once per tick.
//!
//! # Per-tick update
//!
//! [`Bubble::fixed_update`] runs, in order:
//!
//! 1. **Corner detection** from the current contact normals
//! 2. **Motion**: corner escape and slide forces, or floatation toward the
//!    target upward speed when nothing is overhead
//! 3. **Damping** of horizontal velocity (skipped in a corner)
//! 4. **Clamp** to the maximum speed
//! 5. **Animation sync** of the per-axis movement flags
//!
//! # Lifecycle
//!
//! ```text
//! Floating ──hit──▶ Shrinking ──done──▶ Floating
//!     │                                    │
//!     └──────── hit below min size ────────┴──▶ Dying ──▶ Dead
//! ```
//!
//! Collision callbacks and [`Bubble::request_shrink`] drive transitions;
//! [`Bubble::advance_animation`] moves the shrink and death timers.

mod config;
mod lifecycle;
pub mod motion;

use std::fmt;

use froth::{BodyCategory, BodyId, CategoryMask, Contact, PhysicsEngine, MAX_CONTACTS};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collaborators::{AnimationTrigger, Animator};

pub use config::{BubbleConfig, BubbleProfile, DeathTiming, COLLISION_RADIUS_FACTOR};
pub use lifecycle::{
    ease_out_cubic, BubbleState, DeathPhase, DeathSequence, LifecycleEvent, ShrinkAnimation,
};
pub(crate) use lifecycle::TIMER_EPSILON;

use motion::{approach, clamp_speed, detect_corner, escape_direction, push_direction, slide_direction};

/// Name fragment of the external death clip.
const DEATH_CLIP: &str = "Death";

/// Result of a shrink request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShrinkOutcome {
    /// Dropped: already shrinking, dying or inside the push guard.
    Ignored,
    /// An animated shrink started.
    Animating {
        /// Size fraction before the hit.
        from: f32,
        /// Target size fraction.
        to: f32,
    },
    /// The size changed immediately.
    Resized {
        /// Size fraction before the hit.
        from: f32,
        /// New size fraction.
        to: f32,
    },
    /// The hit would have crossed the minimum size; the death sequence began.
    Dying,
}

/// How a bubble responded to a collision or trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BubbleReaction {
    /// The player pushed the bubble.
    Pushed {
        /// Unit push direction.
        direction: Vec2,
    },
    /// A hazard or enemy hit the bubble.
    Hit(ShrinkOutcome),
}

/// Gameplay state of one bubble.
pub struct Bubble {
    body: BodyId,
    config: BubbleConfig,
    size_fraction: f32,
    visual_scale: f32,
    state: BubbleState,
    influenced: bool,
    pulled: bool,
    in_corner: bool,
    /// Seconds left in the post-push guard window.
    guard_remaining: f32,
    animator: Option<Box<dyn Animator>>,
}

impl fmt::Debug for Bubble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bubble")
            .field("body", &self.body)
            .field("profile", &self.config.profile)
            .field("size_fraction", &self.size_fraction)
            .field("state", &self.state)
            .field("influenced", &self.influenced)
            .field("pulled", &self.pulled)
            .field("in_corner", &self.in_corner)
            .field("animator", &self.animator.is_some())
            .finish_non_exhaustive()
    }
}

impl Bubble {
    /// Creates a full-size floating bubble for an existing body.
    #[must_use]
    pub fn new(body: BodyId, config: BubbleConfig) -> Self {
        let visual_scale = config.initial_size;
        Self {
            body,
            config,
            size_fraction: 1.0,
            visual_scale,
            state: BubbleState::Floating,
            influenced: false,
            pulled: false,
            in_corner: false,
            guard_remaining: 0.0,
            animator: None,
        }
    }

    /// Registers the bubble's permanent collision filters with the engine.
    ///
    /// Bubbles never respond to background scenery, not even on first touch.
    pub fn attach(&self, engine: &mut dyn PhysicsEngine) {
        engine.ignore_categories(BodyCategory::Bubble, BodyCategory::Background);
    }

    /// Attaches an animation driver.
    #[must_use]
    pub fn with_animator(mut self, animator: Box<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The physics body this bubble drives.
    #[must_use]
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn config(&self) -> &BubbleConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &BubbleState {
        &self.state
    }

    /// Fraction of the initial size currently in effect.
    #[must_use]
    pub const fn size_fraction(&self) -> f32 {
        self.size_fraction
    }

    /// Current size in world units.
    #[must_use]
    pub fn current_size(&self) -> f32 {
        self.config.initial_size * self.size_fraction
    }

    /// Collider radius for the current size.
    #[must_use]
    pub fn collision_radius(&self) -> f32 {
        self.config.collision_radius(self.size_fraction)
    }

    /// Visual scale, which departs from the size during the death sequence.
    #[must_use]
    pub const fn visual_scale(&self) -> f32 {
        self.visual_scale
    }

    /// Whether an influence field touched the bubble this tick.
    #[must_use]
    pub const fn is_influenced(&self) -> bool {
        self.influenced
    }

    /// Whether a pull field holds the bubble.
    #[must_use]
    pub const fn is_pulled(&self) -> bool {
        self.pulled
    }

    /// Whether the last update found the bubble wedged in a corner.
    #[must_use]
    pub const fn is_in_corner(&self) -> bool {
        self.in_corner
    }

    /// Whether the post-push guard window is running.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        self.guard_remaining > 0.0
    }

    /// Sets the influenced modifier.
    pub fn set_influenced(&mut self, influenced: bool) {
        self.influenced = influenced;
    }

    /// Sets the pulled modifier.
    pub fn set_pulled(&mut self, pulled: bool) {
        self.pulled = pulled;
    }

    fn modifiers_active(&self) -> bool {
        self.config.profile.honours_modifiers() && (self.influenced || self.pulled)
    }

    // =========================================================================
    // Per-tick update
    // =========================================================================

    /// Runs the motion policy for one fixed step.
    ///
    /// Does nothing once the death sequence has started.
    pub fn fixed_update(&mut self, dt: f32, engine: &mut dyn PhysicsEngine) {
        if !self.state.is_alive() {
            return;
        }
        self.guard_remaining = (self.guard_remaining - dt).max(0.0);

        let (Some(position), Some(mut velocity)) =
            (engine.position(self.body), engine.velocity(self.body))
        else {
            return;
        };
        let modified = self.modifiers_active();

        // 1. Corner detection
        let mut contacts = [Contact::default(); MAX_CONTACTS];
        let count = engine.contacts(self.body, &mut contacts);
        let mut normals = [Vec2::ZERO; MAX_CONTACTS];
        for (normal, contact) in normals.iter_mut().zip(&contacts[..count]) {
            *normal = contact.normal;
        }
        let normals = &normals[..count];

        let was_in_corner = self.in_corner;
        self.in_corner = self.config.profile.detects_corners()
            && detect_corner(normals, self.config.corner_cos());
        if self.in_corner && !was_in_corner {
            debug!(body = %self.body, contacts = count, "bubble wedged in corner");
        }

        // 2. Motion
        if self.in_corner {
            let escape = escape_direction(normals);
            engine.add_force(self.body, escape * self.config.corner_escape_force);
            engine.add_force(self.body, slide_direction(escape) * self.config.slide_force);
        } else {
            let reach = 2.0 * self.collision_radius();
            let overhead = engine.raycast(
                position,
                Vec2::Y,
                reach,
                CategoryMask::solid(),
                Some(self.body),
            );
            if overhead.is_none() {
                let target = if modified {
                    self.config.float_speed * 0.5
                } else {
                    self.config.float_speed
                };
                velocity.y = approach(velocity.y, target, self.config.float_approach_rate, dt);
            }
        }

        // 3. Damping
        if !self.in_corner {
            velocity.x *= if modified {
                self.config.influenced_damping_force
            } else {
                self.config.damping_force
            };
        }

        // 4. Clamp
        velocity = clamp_speed(velocity, self.config.max_velocity);
        engine.set_velocity(self.body, velocity);

        // 5. Animation sync
        if let Some(animator) = self.animator.as_mut() {
            let threshold = self.config.movement_threshold;
            animator.set_moving(velocity.x.abs() > threshold, velocity.y.abs() > threshold);
        }
    }

    // =========================================================================
    // Collision handling
    // =========================================================================

    /// Reacts to a solid collision that started this step.
    ///
    /// A background contact only reaches here when the bubble was never
    /// attached; the pair is then ignored from the next step on.
    pub fn on_collision_enter(
        &mut self,
        other: BodyId,
        engine: &mut dyn PhysicsEngine,
    ) -> Option<BubbleReaction> {
        if !self.state.is_alive() {
            return None;
        }
        match engine.category(other)? {
            BodyCategory::Background => {
                engine.ignore_collision(self.body, other);
                debug!(body = %self.body, other = %other, "background pair ignored");
                None
            }
            BodyCategory::Player => self
                .push_from(other, engine)
                .map(|direction| BubbleReaction::Pushed { direction }),
            category if category.is_harmful() => {
                Some(BubbleReaction::Hit(self.request_shrink(engine)))
            }
            _ => None,
        }
    }

    /// Reacts to entering a trigger volume.
    pub fn on_trigger_enter(
        &mut self,
        other: BodyId,
        engine: &mut dyn PhysicsEngine,
    ) -> Option<BubbleReaction> {
        if !self.state.is_alive() {
            return None;
        }
        engine
            .category(other)
            .filter(|category| category.is_harmful())
            .map(|_| BubbleReaction::Hit(self.request_shrink(engine)))
    }

    fn push_from(&mut self, actor: BodyId, engine: &mut dyn PhysicsEngine) -> Option<Vec2> {
        if self.is_guarded() {
            debug!(body = %self.body, "push ignored during guard window");
            return None;
        }
        let direction = push_direction(engine.position(self.body)?, engine.position(actor)?);
        engine.set_velocity(self.body, Vec2::ZERO);
        engine.add_impulse(self.body, direction * self.config.push_force);
        if let Some(guard) = self.config.push_guard {
            self.guard_remaining = guard;
        }
        debug!(body = %self.body, dx = direction.x, dy = direction.y, "bubble pushed");
        Some(direction)
    }

    /// Applies one hit of damage.
    ///
    /// Ignored while a shrink is running, during the death sequence and inside
    /// the push guard window. A hit that would take the bubble below the
    /// minimum size starts the death sequence instead of shrinking.
    pub fn request_shrink(&mut self, engine: &mut dyn PhysicsEngine) -> ShrinkOutcome {
        if !matches!(self.state, BubbleState::Floating) || self.is_guarded() {
            return ShrinkOutcome::Ignored;
        }

        let from = self.size_fraction;
        let to = from - self.config.shrink_amount;
        if to * self.config.initial_size < self.config.min_size {
            self.begin_death(engine);
            return ShrinkOutcome::Dying;
        }

        if let Some(animator) = self.animator.as_mut() {
            animator.trigger(AnimationTrigger::TakeDamage);
        }
        debug!(body = %self.body, from, to, "bubble shrinking");

        if self.config.profile.animates_shrink() {
            self.state =
                BubbleState::Shrinking(ShrinkAnimation::new(from, to, self.config.shrink_duration));
            ShrinkOutcome::Animating { from, to }
        } else {
            self.apply_size(to, engine);
            ShrinkOutcome::Resized { from, to }
        }
    }

    fn apply_size(&mut self, fraction: f32, engine: &mut dyn PhysicsEngine) {
        self.size_fraction = fraction;
        self.visual_scale = self.current_size();
        engine.set_circle_radius(self.body, self.collision_radius());
    }

    fn begin_death(&mut self, engine: &mut dyn PhysicsEngine) {
        engine.set_simulated(self.body, false);
        engine.set_collider_enabled(self.body, false);

        let clip_length = self.animator.as_mut().and_then(|animator| {
            animator.trigger(AnimationTrigger::IsDying);
            animator.clip_length(DEATH_CLIP)
        });
        self.state = BubbleState::Dying(DeathSequence::new(self.visual_scale, clip_length));
        self.in_corner = false;
        info!(body = %self.body, size = self.size_fraction, "bubble death sequence started");
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Advances the shrink animation or the death sequence by `dt`.
    pub fn advance_animation(
        &mut self,
        dt: f32,
        engine: &mut dyn PhysicsEngine,
    ) -> Option<LifecycleEvent> {
        match self.state {
            BubbleState::Shrinking(mut anim) => {
                let size = anim.advance(dt);
                self.apply_size(size, engine);
                if anim.is_finished() {
                    self.state = BubbleState::Floating;
                    debug!(body = %self.body, size, "bubble shrink complete");
                    Some(LifecycleEvent::ShrinkCompleted)
                } else {
                    self.state = BubbleState::Shrinking(anim);
                    None
                }
            }
            BubbleState::Dying(mut death) => {
                let event = death.advance(dt, &self.config.death);
                self.visual_scale = death.scale(&self.config.death);
                self.state = if death.is_finished() {
                    info!(body = %self.body, "bubble destroyed");
                    BubbleState::Dead
                } else {
                    BubbleState::Dying(death)
                };
                event
            }
            BubbleState::Floating | BubbleState::Dead => None,
        }
    }
}
