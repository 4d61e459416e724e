//! The physics collaborator interface.
//!
//! Gameplay code talks to the physics engine only through [`PhysicsEngine`].
//! The trait is object safe, so callers can hold `&mut dyn PhysicsEngine` and
//! tests can substitute a scripted engine.
//!
//! # Conventions
//!
//! - Operations on unknown or despawned bodies are no-ops (getters return `None`).
//! - Forces accumulate until the next step; impulses change velocity at once.
//! - Query results are sorted by [`BodyId`] for deterministic iteration.

use glam::Vec2;

use crate::body::BodyId;
use crate::category::{BodyCategory, CategoryMask};
use crate::contact::Contact;
use crate::query::RaycastHit;

/// Force application, contact enumeration and spatial queries.
///
/// # Example
///
/// ```
/// use froth::{BodyCategory, BodyDesc, PhysicsEngine, World, WorldConfig};
/// use glam::Vec2;
///
/// fn nudge(engine: &mut dyn PhysicsEngine, body: froth::BodyId) {
///     engine.add_impulse(body, Vec2::new(0.0, 2.0));
/// }
///
/// let mut world = World::new(WorldConfig::default());
/// let id = world
///     .spawn(BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::ZERO, 0.5))
///     .unwrap();
/// nudge(&mut world, id);
/// assert_eq!(world.velocity(id), Some(Vec2::new(0.0, 2.0)));
/// ```
pub trait PhysicsEngine {
    /// Category of a body.
    fn category(&self, id: BodyId) -> Option<BodyCategory>;

    /// Current position of a body.
    fn position(&self, id: BodyId) -> Option<Vec2>;

    /// Current velocity of a body.
    fn velocity(&self, id: BodyId) -> Option<Vec2>;

    /// Overwrites the velocity of a body.
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);

    /// Adds a continuous force, integrated over the next step.
    fn add_force(&mut self, id: BodyId, force: Vec2);

    /// Applies an instantaneous impulse (`Δv = impulse / mass`).
    fn add_impulse(&mut self, id: BodyId, impulse: Vec2);

    /// Copies the body's current contacts into `out` and returns how many
    /// were written. At most `out.len()` contacts are written.
    fn contacts(&self, id: BodyId, out: &mut [Contact]) -> usize;

    /// Bodies whose collider overlaps the circle, sorted by id.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: CategoryMask) -> Vec<BodyId>;

    /// Nearest hit along a ray. `direction` need not be normalized; a zero
    /// direction never hits.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CategoryMask,
        exclude: Option<BodyId>,
    ) -> Option<RaycastHit>;

    /// Permanently disables collision response between two bodies.
    fn ignore_collision(&mut self, a: BodyId, b: BodyId);

    /// Permanently disables collision response between every body of one
    /// category and every body of another, including bodies spawned later.
    fn ignore_categories(&mut self, a: BodyCategory, b: BodyCategory);

    /// Removes a body from (or returns it to) integration and contacts.
    fn set_simulated(&mut self, id: BodyId, simulated: bool);

    /// Enables or disables the collider of a body.
    fn set_collider_enabled(&mut self, id: BodyId, enabled: bool);

    /// Resizes a circle collider. Ignored for other shapes.
    fn set_circle_radius(&mut self, id: BodyId, radius: f32);
}
