//! Influence field: nudges nearby bubbles along the actor's direction of travel.

use std::collections::{BTreeMap, BTreeSet};

use froth::{BodyId, CategoryMask, PhysicsEngine};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bubble::Bubble;
use crate::config::{ensure_non_negative, ensure_positive, ConfigError};

/// Influence field tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Query radius around the actor.
    pub radius: f32,
    /// Force at the actor's position.
    pub strength: f32,
    /// Actor speed below which no force is applied.
    pub stationary_threshold: f32,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            strength: 2.0,
            stationary_threshold: 0.1,
        }
    }
}

impl InfluenceConfig {
    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-positive radius or a
    /// negative strength or threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("influence.radius", self.radius)?;
        ensure_non_negative("influence.strength", self.strength)?;
        ensure_non_negative("influence.stationary_threshold", self.stationary_threshold)
    }
}

/// Passive force emitter attached to an actor.
///
/// Every tick, each living bubble within the radius receives a force along the
/// actor's normalized velocity, scaled by `strength · (1 − distance / radius)`.
/// Bubbles that receive a force are flagged influenced; the flag is cleared on
/// the first tick they no longer do.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
///
/// use bubbleborne_core::bubble::{Bubble, BubbleConfig};
/// use bubbleborne_core::fields::{InfluenceConfig, InfluenceField};
/// use froth::{BodyCategory, BodyDesc, PhysicsEngine, World, WorldConfig};
/// use glam::Vec2;
///
/// let mut world = World::new(WorldConfig::default());
/// let actor = world
///     .spawn(BodyDesc::dynamic_circle(BodyCategory::Player, Vec2::ZERO, 0.5).with_velocity(Vec2::X))
///     .unwrap();
/// let body = world
///     .spawn(BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::new(1.5, 0.0), 0.45))
///     .unwrap();
/// let mut bubbles = BTreeMap::from([(body, Bubble::new(body, BubbleConfig::default()))]);
///
/// let mut field = InfluenceField::new(InfluenceConfig::default());
/// assert_eq!(field.apply(actor, &mut bubbles, &mut world), 1);
/// assert!(bubbles[&body].is_influenced());
/// ```
#[derive(Debug, Clone)]
pub struct InfluenceField {
    config: InfluenceConfig,
    /// Bubbles flagged on the previous tick.
    touched: BTreeSet<BodyId>,
}

impl InfluenceField {
    /// Creates a field with nothing flagged.
    #[must_use]
    pub fn new(config: InfluenceConfig) -> Self {
        Self {
            config,
            touched: BTreeSet::new(),
        }
    }

    /// Field tuning.
    #[must_use]
    pub const fn config(&self) -> &InfluenceConfig {
        &self.config
    }

    /// Bubbles flagged influenced by the last application.
    pub fn influenced(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.touched.iter().copied()
    }

    /// Applies one tick of influence from `actor` and returns how many
    /// bubbles received a force.
    pub fn apply(
        &mut self,
        actor: BodyId,
        bubbles: &mut BTreeMap<BodyId, Bubble>,
        engine: &mut dyn PhysicsEngine,
    ) -> usize {
        let mut touched = BTreeSet::new();

        if let (Some(center), Some(actor_velocity)) = (engine.position(actor), engine.velocity(actor))
        {
            if actor_velocity.length() >= self.config.stationary_threshold {
                let direction = actor_velocity.normalize_or_zero();
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
                    let factor = (1.0 - position.distance(center) / self.config.radius).max(0.0);
                    if factor <= 0.0 || direction == Vec2::ZERO {
                        continue;
                    }
                    engine.add_force(id, direction * self.config.strength * factor);
                    bubble.set_influenced(true);
                    touched.insert(id);
                }
            }
        }

        for id in self.touched.difference(&touched) {
            if let Some(bubble) = bubbles.get_mut(id) {
                bubble.set_influenced(false);
            }
        }
        self.touched = touched;
        self.touched.len()
    }

    /// Clears the influenced flag on every bubble the field flagged.
    pub fn clear(&mut self, bubbles: &mut BTreeMap<BodyId, Bubble>) {
        for id in std::mem::take(&mut self.touched) {
            if let Some(bubble) = bubbles.get_mut(&id) {
                bubble.set_influenced(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use froth::{BodyCategory, BodyDesc, World, WorldConfig};

    use super::*;
    use crate::bubble::BubbleConfig;

    struct Fixture {
        world: World,
        actor: BodyId,
        bubbles: BTreeMap<BodyId, Bubble>,
    }

    fn fixture(actor_velocity: Vec2, bubble_positions: &[Vec2]) -> Fixture {
        let mut world = World::new(WorldConfig::default());
        let actor = world
            .spawn(
                BodyDesc::dynamic_circle(BodyCategory::Player, Vec2::ZERO, 0.5)
                    .with_velocity(actor_velocity),
            )
            .unwrap();
        let mut bubbles = BTreeMap::new();
        for &position in bubble_positions {
            let id = world
                .spawn(BodyDesc::dynamic_circle(BodyCategory::Bubble, position, 0.45))
                .unwrap();
            bubbles.insert(id, Bubble::new(id, BubbleConfig::default()));
        }
        Fixture {
            world,
            actor,
            bubbles,
        }
    }

    fn ids(fixture: &Fixture) -> Vec<BodyId> {
        fixture.bubbles.keys().copied().collect()
    }

    #[test]
    fn stationary_actor_applies_nothing() {
        let mut f = fixture(Vec2::new(0.05, 0.0), &[Vec2::new(1.5, 0.0), Vec2::new(2.5, 0.0)]);
        let mut field = InfluenceField::new(InfluenceConfig::default());
        assert_eq!(field.apply(f.actor, &mut f.bubbles, &mut f.world), 0);

        f.world.step(0.02);
        for id in ids(&f) {
            assert_eq!(f.world.velocity(id), Some(Vec2::ZERO));
            assert!(!f.bubbles[&id].is_influenced());
        }
    }

    #[test]
    fn force_falls_off_with_distance() {
        let mut f = fixture(Vec2::new(0.0, 3.0), &[Vec2::new(1.5, 0.0), Vec2::new(2.4, 0.0)]);
        let mut field = InfluenceField::new(InfluenceConfig::default());
        assert_eq!(field.apply(f.actor, &mut f.bubbles, &mut f.world), 2);
        f.world.step(1.0);

        let ids = ids(&f);
        let near = f.world.velocity(ids[0]).unwrap();
        let far = f.world.velocity(ids[1]).unwrap();
        // Force is along the actor's travel (straight up), not toward it.
        assert!(near.x.abs() < 1e-6 && far.x.abs() < 1e-6);
        // 2 · (1 − 1.5/3) = 1.0 and 2 · (1 − 2.4/3) = 0.4
        assert!((near.y - 1.0).abs() < 1e-5, "near = {near}");
        assert!((far.y - 0.4).abs() < 1e-5, "far = {far}");
    }

    #[test]
    fn collider_at_edge_gets_no_negative_force() {
        // Centre beyond the radius, collider still overlapping it.
        let mut f = fixture(Vec2::X, &[Vec2::new(3.3, 0.0)]);
        let mut field = InfluenceField::new(InfluenceConfig::default());
        assert_eq!(field.apply(f.actor, &mut f.bubbles, &mut f.world), 0);
        f.world.step(1.0);
        let id = ids(&f)[0];
        assert_eq!(f.world.velocity(id), Some(Vec2::ZERO));
        assert!(!f.bubbles[&id].is_influenced());
    }

    #[test]
    fn drifting_to_the_edge_clears_the_flag() {
        let mut f = fixture(Vec2::X, &[Vec2::new(1.0, 0.0)]);
        let id = ids(&f)[0];
        let mut field = InfluenceField::new(InfluenceConfig::default());
        field.apply(f.actor, &mut f.bubbles, &mut f.world);
        assert!(f.bubbles[&id].is_influenced());

        f.world.set_position(id, Vec2::new(3.3, 0.0));
        assert_eq!(field.apply(f.actor, &mut f.bubbles, &mut f.world), 0);
        assert!(!f.bubbles[&id].is_influenced());
    }

    #[test]
    fn zero_threshold_with_still_actor_flags_nothing() {
        let mut f = fixture(Vec2::ZERO, &[Vec2::new(1.0, 0.0)]);
        let id = ids(&f)[0];
        let mut field = InfluenceField::new(InfluenceConfig {
            stationary_threshold: 0.0,
            ..InfluenceConfig::default()
        });
        assert_eq!(field.apply(f.actor, &mut f.bubbles, &mut f.world), 0);
        assert!(!f.bubbles[&id].is_influenced());
    }

    #[test]
    fn flag_clears_when_bubble_leaves() {
        let mut f = fixture(Vec2::X, &[Vec2::new(1.0, 0.0)]);
        let id = ids(&f)[0];
        let mut field = InfluenceField::new(InfluenceConfig::default());

        field.apply(f.actor, &mut f.bubbles, &mut f.world);
        assert!(f.bubbles[&id].is_influenced());
        assert_eq!(field.influenced().collect::<Vec<_>>(), vec![id]);

        f.world.set_velocity(f.actor, Vec2::ZERO);
        field.apply(f.actor, &mut f.bubbles, &mut f.world);
        assert!(!f.bubbles[&id].is_influenced());
    }

    #[test]
    fn clear_resets_flags() {
        let mut f = fixture(Vec2::X, &[Vec2::new(1.0, 0.0)]);
        let id = ids(&f)[0];
        let mut field = InfluenceField::new(InfluenceConfig::default());
        field.apply(f.actor, &mut f.bubbles, &mut f.world);
        field.clear(&mut f.bubbles);
        assert!(!f.bubbles[&id].is_influenced());
        assert_eq!(field.influenced().count(), 0);
    }

    #[test]
    fn invalid_radius_rejected() {
        let config = InfluenceConfig {
            radius: 0.0,
            ..InfluenceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
