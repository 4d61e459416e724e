//! World: the reference [`PhysicsEngine`] implementation.
//!
//! The world owns every body and advances them with a fixed-step integrator:
//!
//! 1. **Integrate**: `v += (g + F/m)·dt`, `v *= 1/(1 + drag·dt)`, `p += v·dt`
//! 2. **Detect**: scan every collidable pair for overlap (in parallel)
//! 3. **Resolve**: in body-id order, separate overlapping solids, cancel
//!    approaching normal velocity, record contacts and enter events
//!
//! # Determinism
//!
//! Bodies live in a `BTreeMap`, so every iteration is in id order. The pair
//! scan runs on rayon but its output is sorted by `(a, b)` before any
//! mutation, and the only random input (separation direction for coincident
//! centres) comes from a `ChaCha8Rng` seeded from [`WorldConfig::seed`].
//!
//! # Example
//!
//! ```
//! use froth::{BodyCategory, BodyDesc, CollisionKind, World, WorldConfig};
//! use glam::Vec2;
//!
//! let mut world = World::new(WorldConfig::default());
//! let wall = world
//!     .spawn(BodyDesc::static_box(BodyCategory::Terrain, Vec2::new(1.0, 0.0), Vec2::new(0.5, 2.0)))
//!     .unwrap();
//! let ball = world
//!     .spawn(BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::new(0.2, 0.0), 0.45))
//!     .unwrap();
//!
//! world.step(1.0 / 50.0);
//!
//! let events = world.take_events();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].kind, CollisionKind::Collision);
//! assert!(events[0].involves(wall) && events[0].involves(ball));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::body::{Body, BodyDesc, BodyId, BodyKind, Shape};
use crate::category::{BodyCategory, CategoryMask};
use crate::contact::{CollisionEvent, CollisionKind, Contact, MAX_CONTACTS};
use crate::engine::PhysicsEngine;
use crate::error::PhysicsError;
use crate::query::{manifold, ray_shape, shape_overlaps_circle, Manifold, RaycastHit};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a [`World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Constant acceleration applied to every dynamic body.
    pub gravity: Vec2,
    /// Seed for the separation-direction RNG.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            seed: 0,
        }
    }
}

// =============================================================================
// Pair Scan
// =============================================================================

/// Overlapping pair found by the scan, `a < b`.
#[derive(Debug, Clone, Copy)]
struct PairHit {
    a: BodyId,
    b: BodyId,
    trigger: bool,
    manifold: Manifold,
}

fn pair_key(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn category_key(a: BodyCategory, b: BodyCategory) -> (BodyCategory, BodyCategory) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Collision filters consulted before any pair is resolved.
#[derive(Debug, Clone, Default)]
struct PairFilter {
    /// Body pairs, stored as `(low, high)`.
    bodies: BTreeSet<(BodyId, BodyId)>,
    /// Category pairs, stored as `(low, high)`.
    categories: BTreeSet<(BodyCategory, BodyCategory)>,
}

impl PairFilter {
    fn blocks(&self, a: &Body, b: &Body) -> bool {
        self.bodies.contains(&pair_key(a.id, b.id))
            || self.categories.contains(&category_key(a.category, b.category))
    }
}

fn pair_hit(a: &Body, b: &Body, filter: &PairFilter) -> Option<PairHit> {
    if a.kind == BodyKind::Static && b.kind == BodyKind::Static {
        return None;
    }
    if filter.blocks(a, b) {
        return None;
    }
    manifold(a.shape, a.position, b.shape, b.position).map(|manifold| PairHit {
        a: a.id,
        b: b.id,
        trigger: a.is_trigger || b.is_trigger,
        manifold,
    })
}

fn push_contact(contacts: &mut BTreeMap<BodyId, Vec<Contact>>, id: BodyId, contact: Contact) {
    let list = contacts.entry(id).or_default();
    if list.len() < MAX_CONTACTS {
        list.push(contact);
    } else {
        trace!(body = %id, "contact buffer full, dropping contact");
    }
}

// =============================================================================
// World
// =============================================================================

/// Container and integrator for all bodies.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    /// Monotonically increasing body ID counter.
    next_id: u64,
    /// Body storage with deterministic iteration order.
    bodies: BTreeMap<BodyId, Body>,
    /// Body and category pairs that never collide.
    ignored: PairFilter,
    /// Contacts recorded by the last step.
    contacts: BTreeMap<BodyId, Vec<Contact>>,
    /// Pairs touching at the end of the last step.
    touching: BTreeSet<(BodyId, BodyId)>,
    /// Enter events not yet drained.
    events: Vec<CollisionEvent>,
    step_count: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            next_id: 0,
            bodies: BTreeMap::new(),
            ignored: PairFilter::default(),
            contacts: BTreeMap::new(),
            touching: BTreeSet::new(),
            events: Vec::new(),
            step_count: 0,
            rng,
        }
    }

    /// The configuration the world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of completed steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Spawns a body and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError`] if the description fails validation.
    pub fn spawn(&mut self, desc: BodyDesc) -> Result<BodyId, PhysicsError> {
        desc.validate()?;
        let id = BodyId::new(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, Body::from_desc(id, desc));
        Ok(id)
    }

    /// Removes a body together with its contacts, pair state and ignore entries.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if the body does not exist.
    pub fn despawn(&mut self, id: BodyId) -> Result<Body, PhysicsError> {
        let body = self
            .bodies
            .remove(&id)
            .ok_or(PhysicsError::UnknownBody(id))?;
        self.contacts.remove(&id);
        for list in self.contacts.values_mut() {
            list.retain(|c| c.other != Some(id));
        }
        self.touching.retain(|&(a, b)| a != id && b != id);
        self.ignored.bodies.retain(|&(a, b)| a != id && b != id);
        Ok(body)
    }

    /// Looks up a body.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if the body does not exist.
    pub fn body(&self, id: BodyId) -> Result<&Body, PhysicsError> {
        self.bodies.get(&id).ok_or(PhysicsError::UnknownBody(id))
    }

    /// Whether the body exists.
    #[must_use]
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Iterates bodies in id order.
    pub fn bodies_sorted(&self) -> impl Iterator<Item = &Body> + '_ {
        self.bodies.values()
    }

    /// Ids of every body in a category, in id order.
    #[must_use]
    pub fn bodies_in(&self, category: BodyCategory) -> Vec<BodyId> {
        self.bodies
            .values()
            .filter(|b| b.category == category)
            .map(|b| b.id)
            .collect()
    }

    /// Number of bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if the world has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Moves a body without touching its velocity. Contacts refresh on the
    /// next step.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            if position.is_finite() {
                body.position = position;
            }
        }
    }

    /// Whether collision between the pair is disabled.
    #[must_use]
    pub fn is_ignored(&self, a: BodyId, b: BodyId) -> bool {
        if self.ignored.bodies.contains(&pair_key(a, b)) {
            return true;
        }
        match (self.bodies.get(&a), self.bodies.get(&b)) {
            (Some(a), Some(b)) => self.is_category_ignored(a.category, b.category),
            _ => false,
        }
    }

    /// Whether collision between two categories is disabled.
    #[must_use]
    pub fn is_category_ignored(&self, a: BodyCategory, b: BodyCategory) -> bool {
        self.ignored.categories.contains(&category_key(a, b))
    }

    /// Enter events recorded since the last drain, in pair order.
    #[must_use]
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Drains the recorded enter events.
    pub fn take_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances the world by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integrate(dt);
        let hits = self.scan_pairs();
        self.resolve(hits);
        self.step_count += 1;
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for body in self.bodies.values_mut() {
            if body.kind == BodyKind::Static || !body.simulated {
                body.force = Vec2::ZERO;
                continue;
            }
            body.velocity += (gravity + body.force / body.mass) * dt;
            body.velocity *= 1.0 / (1.0 + body.linear_drag * dt);
            body.position += body.velocity * dt;
            body.force = Vec2::ZERO;
        }
    }

    /// Finds every overlapping pair. Read-only, so it runs in parallel.
    fn scan_pairs(&self) -> Vec<PairHit> {
        let candidates: Vec<&Body> = self.bodies.values().filter(|b| b.collides()).collect();
        let candidates = candidates.as_slice();
        let ignored = &self.ignored;

        let mut hits: Vec<PairHit> = (0..candidates.len())
            .into_par_iter()
            .flat_map_iter(move |i| {
                let a = candidates[i];
                candidates[i + 1..]
                    .iter()
                    .filter_map(move |b| pair_hit(a, b, ignored))
            })
            .collect();

        // CRITICAL: resolution order must not depend on thread scheduling
        hits.sort_by_key(|hit| (hit.a, hit.b));
        hits
    }

    fn resolve(&mut self, hits: Vec<PairHit>) {
        let mut contacts = BTreeMap::new();
        let mut touching = BTreeSet::new();

        for hit in hits {
            let normal = match hit.manifold.normal {
                Some(normal) => normal,
                None => Vec2::from_angle(self.rng.gen_range(0.0..TAU)),
            };
            let key = (hit.a, hit.b);
            touching.insert(key);
            if !self.touching.contains(&key) {
                self.events.push(CollisionEvent {
                    kind: if hit.trigger {
                        CollisionKind::Trigger
                    } else {
                        CollisionKind::Collision
                    },
                    a: hit.a,
                    b: hit.b,
                    normal,
                });
            }
            if hit.trigger {
                continue;
            }

            self.separate(hit.a, hit.b, normal, hit.manifold.depth);
            let point = hit.manifold.point;
            push_contact(&mut contacts, hit.a, Contact::new(hit.b, point, -normal));
            push_contact(&mut contacts, hit.b, Contact::new(hit.a, point, normal));
        }

        self.contacts = contacts;
        self.touching = touching;
    }

    /// Pushes the pair apart along `normal` (from `a` toward `b`) and removes
    /// their approaching velocity. Restitution is zero.
    fn separate(&mut self, a: BodyId, b: BodyId, normal: Vec2, depth: f32) {
        let (Some(body_a), Some(body_b)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
            return;
        };
        let (inv_a, inv_b) = (body_a.inverse_mass(), body_b.inverse_mass());
        let total = inv_a + inv_b;
        if total <= 0.0 {
            return;
        }

        let correction = normal * (depth / total);
        let approach = (body_b.velocity - body_a.velocity).dot(normal);
        let impulse = if approach < 0.0 {
            normal * (-approach / total)
        } else {
            Vec2::ZERO
        };

        if let Some(body) = self.bodies.get_mut(&a) {
            body.position -= correction * inv_a;
            body.velocity -= impulse * inv_a;
        }
        if let Some(body) = self.bodies.get_mut(&b) {
            body.position += correction * inv_b;
            body.velocity += impulse * inv_b;
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

// =============================================================================
// PhysicsEngine
// =============================================================================

impl PhysicsEngine for World {
    fn category(&self, id: BodyId) -> Option<BodyCategory> {
        self.bodies.get(&id).map(|b| b.category)
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.position)
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            if body.kind == BodyKind::Dynamic && velocity.is_finite() {
                body.velocity = velocity;
            }
        }
    }

    fn add_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            if body.kind == BodyKind::Dynamic && body.simulated && force.is_finite() {
                body.force += force;
            }
        }
    }

    fn add_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            if body.kind == BodyKind::Dynamic && body.simulated && impulse.is_finite() {
                body.velocity += impulse / body.mass;
            }
        }
    }

    fn contacts(&self, id: BodyId, out: &mut [Contact]) -> usize {
        let Some(list) = self.contacts.get(&id) else {
            return 0;
        };
        let count = list.len().min(out.len());
        out[..count].copy_from_slice(&list[..count]);
        count
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, mask: CategoryMask) -> Vec<BodyId> {
        self.bodies
            .values()
            .filter(|b| b.queryable() && mask.accepts(b.category))
            .filter(|b| shape_overlaps_circle(b.shape, b.position, center, radius))
            .map(|b| b.id)
            .collect()
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CategoryMask,
        exclude: Option<BodyId>,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }

        let mut best: Option<RaycastHit> = None;
        for body in self.bodies.values() {
            if !body.queryable()
                || body.is_trigger
                || !mask.accepts(body.category)
                || exclude == Some(body.id)
            {
                continue;
            }
            let Some((distance, normal)) =
                ray_shape(origin, direction, max_distance, body.shape, body.position)
            else {
                continue;
            };
            if best.map_or(true, |hit| distance < hit.distance) {
                best = Some(RaycastHit {
                    body: body.id,
                    point: origin + direction * distance,
                    distance,
                    normal,
                });
            }
        }
        best
    }

    fn ignore_collision(&mut self, a: BodyId, b: BodyId) {
        if a == b {
            return;
        }
        let key = pair_key(a, b);
        if self.ignored.bodies.insert(key) {
            debug!(a = %key.0, b = %key.1, "collision pair ignored");
        }
    }

    fn ignore_categories(&mut self, a: BodyCategory, b: BodyCategory) {
        let key = category_key(a, b);
        if self.ignored.categories.insert(key) {
            debug!(a = %key.0, b = %key.1, "collision categories ignored");
        }
    }

    fn set_simulated(&mut self, id: BodyId, simulated: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.simulated = simulated;
            if !simulated {
                body.force = Vec2::ZERO;
                self.contacts.remove(&id);
            }
        }
    }

    fn set_collider_enabled(&mut self, id: BodyId, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.collider_enabled = enabled;
            if !enabled {
                self.contacts.remove(&id);
            }
        }
    }

    fn set_circle_radius(&mut self, id: BodyId, radius: f32) {
        if !(radius.is_finite() && radius > 0.0) {
            return;
        }
        if let Some(body) = self.bodies.get_mut(&id) {
            if let Shape::Circle { radius: r } = &mut body.shape {
                *r = radius;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
