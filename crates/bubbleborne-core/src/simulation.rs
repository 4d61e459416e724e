//! Simulation orchestrator with the fixed-step tick loop.
//!
//! The `Simulation` owns the physics world, every bubble, the hunter and its
//! two fields, and the injected collaborators. Each call to
//! [`Simulation::step`] runs one tick in a fixed order:
//!
//! 1. **INPUT**: apply queued pull press/release/enable and fire edges
//! 2. **ACTORS**: hunter movement, then influence and pull fields
//! 3. **BUBBLES**: each bubble's motion policy, in body id order
//! 4. **PHYSICS**: advance the world by `fixed_dt`
//! 5. **DISPATCH**: route collision and trigger events to bullets, bubbles
//!    and hunter
//! 6. **TIMERS**: advance shrink and death animations, remove dead bubbles
//!    and expired bullets
//! 7. **AUDIO**: advance the sound service clock
//!
//! # Determinism
//!
//! Bubbles live in a `BTreeMap` keyed by body id and the world reports events
//! sorted by pair, so two runs with the same configuration and the same input
//! sequence produce identical event logs.
//!
//! # Example
//!
//! ```
//! use bubbleborne_core::config::SimulationConfig;
//! use bubbleborne_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
//! let bubble = sim.spawn_bubble(Vec2::new(0.0, 1.0)).unwrap();
//!
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert!(sim.bubble(bubble).is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use froth::{BodyCategory, BodyDesc, BodyId, CollisionKind, PhysicsEngine, PhysicsError, World};
use glam::Vec2;
use tracing::{debug, info};

use crate::audio::{AudioPool, SoundCue, SoundService};
use crate::bubble::{Bubble, BubbleConfig, BubbleReaction, LifecycleEvent, ShrinkOutcome};
use crate::collaborators::{Animator, Session, SessionTally};
use crate::config::{ConfigError, SimulationConfig};
use crate::events::{EventLog, LoggedEvent, SimEvent};
use crate::fields::{InfluenceField, PullField};
use crate::hunter::Hunter;
use crate::projectile::{Bullet, Impact};

/// Queued edge of the pull or fire input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputEdge {
    PullPressed,
    PullReleased,
    PullEnabled(bool),
    Fire,
}

// =============================================================================
// Simulation
// =============================================================================

/// The bubble simulation.
///
/// Collaborators are injected: a [`Session`] receives death notifications and
/// a [`SoundService`] receives sound cues. By default the simulation uses a
/// private [`SessionTally`] and an [`AudioPool`] built from the configuration.
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    bubbles: BTreeMap<BodyId, Bubble>,
    hunter: Option<Hunter>,
    bullets: BTreeMap<BodyId, Bullet>,
    influence: InfluenceField,
    pull: PullField,
    session: Box<dyn Session>,
    sound: Box<dyn SoundService>,
    events: EventLog,
    /// Edges queued since the last tick, applied in arrival order.
    input: Vec<InputEdge>,
    tick: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("world", &format!("[{} bodies]", self.world.body_count()))
            .field("bubbles", &self.bubbles.len())
            .field("hunter", &self.hunter)
            .field("bullets", &self.bullets.len())
            .field("pull", &self.pull)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates an empty simulation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`SimulationConfig::validate`].
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: World::new(config.world.clone()),
            bubbles: BTreeMap::new(),
            hunter: None,
            bullets: BTreeMap::new(),
            influence: InfluenceField::new(config.influence.clone()),
            pull: PullField::new(config.pull.clone()),
            session: Box::new(SessionTally::default()),
            sound: Box::new(AudioPool::new(&config.audio)),
            events: EventLog::new(),
            input: Vec::new(),
            tick: 0,
            config,
        })
    }

    /// Replaces the session collaborator.
    #[must_use]
    pub fn with_session(mut self, session: Box<dyn Session>) -> Self {
        self.session = session;
        self
    }

    /// Replaces the sound service.
    #[must_use]
    pub fn with_sound(mut self, sound: Box<dyn SoundService>) -> Self {
        self.sound = sound;
        self
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Spawns a bubble with the configured tuning and no animator.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError`] if the body description is invalid.
    pub fn spawn_bubble(&mut self, position: Vec2) -> Result<BodyId, PhysicsError> {
        let config = self.config.bubble.clone();
        self.spawn_bubble_with(position, config, None)
    }

    /// Spawns a bubble with explicit tuning and an optional animator.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError`] if the body description is invalid.
    pub fn spawn_bubble_with(
        &mut self,
        position: Vec2,
        config: BubbleConfig,
        animator: Option<Box<dyn Animator>>,
    ) -> Result<BodyId, PhysicsError> {
        let desc = BodyDesc::dynamic_circle(
            BodyCategory::Bubble,
            position,
            config.collision_radius(1.0),
        )
        .with_mass(config.mass)
        .with_linear_drag(config.linear_drag);
        let id = self.world.spawn(desc)?;

        let mut bubble = Bubble::new(id, config);
        bubble.attach(&mut self.world);
        if let Some(animator) = animator {
            bubble = bubble.with_animator(animator);
        }
        self.bubbles.insert(id, bubble);
        Ok(id)
    }

    /// Spawns the hunter, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError`] if the body description is invalid.
    pub fn spawn_hunter(&mut self, position: Vec2) -> Result<BodyId, PhysicsError> {
        self.spawn_hunter_with(position, None)
    }

    /// Spawns the hunter with an optional animator, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError`] if the body description is invalid.
    pub fn spawn_hunter_with(
        &mut self,
        position: Vec2,
        animator: Option<Box<dyn Animator>>,
    ) -> Result<BodyId, PhysicsError> {
        let config = self.config.hunter.clone();
        let desc = BodyDesc::dynamic_circle(BodyCategory::Player, position, config.radius)
            .with_mass(config.mass)
            .with_linear_drag(config.linear_drag);
        let id = self.world.spawn(desc)?;
        let mut hunter = Hunter::new(id, config);
        if let Some(animator) = animator {
            hunter = hunter.with_animator(animator);
        }
        if let Some(previous) = self.hunter.replace(hunter) {
            self.world.despawn(previous.body())?;
        }
        Ok(id)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Sets the hunter's move input.
    pub fn set_move_input(&mut self, input: Vec2) {
        if let Some(hunter) = self.hunter.as_mut() {
            hunter.set_move_input(input);
        }
    }

    /// Queues a press of the pull input for the next tick.
    pub fn press_pull(&mut self) {
        self.input.push(InputEdge::PullPressed);
    }

    /// Queues a release of the pull input for the next tick.
    pub fn release_pull(&mut self) {
        self.input.push(InputEdge::PullReleased);
    }

    /// Queues enabling or disabling the pull field for the next tick.
    pub fn set_pull_enabled(&mut self, enabled: bool) {
        self.input.push(InputEdge::PullEnabled(enabled));
    }

    /// Queues a press of the fire input for the next tick.
    pub fn fire(&mut self) {
        self.input.push(InputEdge::Fire);
    }

    /// Applies one hit to a bubble, as any hazard would.
    ///
    /// Returns `None` if the bubble does not exist.
    pub fn shrink_bubble(&mut self, id: BodyId) -> Option<ShrinkOutcome> {
        let outcome = self.bubbles.get_mut(&id)?.request_shrink(&mut self.world);
        self.record_reaction(id, BubbleReaction::Hit(outcome));
        Some(outcome)
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Executes one fixed-step tick.
    pub fn step(&mut self) {
        let dt = self.config.fixed_dt;

        // INPUT
        self.apply_input();

        // ACTORS
        if let Some(hunter) = self.hunter.as_mut() {
            hunter.fixed_update(dt, &mut self.world);
            if hunter.is_alive() {
                let actor = hunter.body();
                self.influence.apply(actor, &mut self.bubbles, &mut self.world);
                self.pull.apply(actor, &mut self.bubbles, &mut self.world);
            }
        }

        // BUBBLES
        for bubble in self.bubbles.values_mut() {
            bubble.fixed_update(dt, &mut self.world);
        }

        // PHYSICS
        self.world.step(dt);

        // DISPATCH
        for event in self.world.take_events() {
            for (me, other) in [(event.a, event.b), (event.b, event.a)] {
                self.dispatch_touch(event.kind, me, other);
            }
        }

        // TIMERS
        self.advance_timers(dt);

        // AUDIO
        self.sound.advance(dt);

        self.tick += 1;
    }

    fn apply_input(&mut self) {
        let edges = std::mem::take(&mut self.input);
        let actor = self.hunter.as_ref().filter(|h| h.is_alive()).map(Hunter::body);
        for edge in edges {
            match (edge, actor) {
                (InputEdge::PullPressed, Some(_)) => {
                    if self.pull.press() {
                        self.events.record(self.tick, SimEvent::PullEngaged);
                    }
                }
                (InputEdge::PullReleased, Some(actor)) => {
                    if self.pull.is_pulling() {
                        let released = self.pull.release(actor, &mut self.bubbles, &self.world);
                        self.events.record(self.tick, SimEvent::PullReleased { released });
                    }
                }
                (InputEdge::PullEnabled(enabled), actor) => {
                    let was_pulling = self.pull.is_pulling();
                    let released =
                        self.pull.set_enabled(enabled, actor, &mut self.bubbles, &self.world);
                    if was_pulling && !enabled {
                        self.events.record(self.tick, SimEvent::PullReleased { released });
                    }
                }
                (InputEdge::Fire, Some(_)) => self.fire_bullet(),
                (edge, None) => debug!(?edge, "input dropped without a living hunter"),
            }
        }
    }

    fn fire_bullet(&mut self) {
        let Some(hunter) = self.hunter.as_mut() else {
            return;
        };
        let Some(direction) = hunter.try_fire() else {
            return;
        };
        let Some(muzzle) = hunter.muzzle(direction, &self.world) else {
            return;
        };
        let actor = hunter.body();
        let config = &hunter.config().bullet;
        let desc = BodyDesc::dynamic_circle(BodyCategory::Projectile, muzzle, config.radius)
            .with_velocity(direction * config.speed)
            .as_trigger();
        let id = match self.world.spawn(desc) {
            Ok(id) => id,
            Err(err) => {
                debug!(%err, "bullet could not be spawned");
                return;
            }
        };
        self.world.ignore_collision(id, actor);
        self.bullets.insert(id, Bullet::new(id, direction, config));
        self.events.record(self.tick, SimEvent::ShotFired { bullet: id, direction });
    }

    fn spend_bullet(&mut self, bullet: &Bullet, other: BodyId) {
        let id = bullet.body();
        if let Impact::Destroyed(enemy) = bullet.impact(other, &self.world) {
            self.remove_body(enemy);
            info!(%enemy, bullet = %id, "enemy destroyed");
            self.events.record(self.tick, SimEvent::EnemyDestroyed { enemy, bullet: id });
        }
        self.remove_body(id);
        self.events.record(self.tick, SimEvent::BulletSpent { bullet: id });
    }

    fn remove_body(&mut self, id: BodyId) {
        if let Err(err) = self.world.despawn(id) {
            debug!(body = %id, %err, "body already gone");
        }
    }

    fn dispatch_touch(&mut self, kind: CollisionKind, me: BodyId, other: BodyId) {
        if let Some(bullet) = self.bullets.remove(&me) {
            self.spend_bullet(&bullet, other);
            return;
        }

        if let Some(bubble) = self.bubbles.get_mut(&me) {
            let reaction = match kind {
                CollisionKind::Collision => bubble.on_collision_enter(other, &mut self.world),
                CollisionKind::Trigger => bubble.on_trigger_enter(other, &mut self.world),
            };
            if let Some(reaction) = reaction {
                self.record_reaction(me, reaction);
            }
            return;
        }

        let killed = self
            .hunter
            .as_mut()
            .filter(|hunter| hunter.body() == me)
            .is_some_and(|hunter| hunter.on_touch(other, &mut self.world));
        if killed {
            self.on_hunter_killed(me);
        }
    }

    fn on_hunter_killed(&mut self, actor: BodyId) {
        self.session.on_hunter_died();
        self.events.record(self.tick, SimEvent::HunterDied);
        if self.pull.is_pulling() {
            let released = self.pull.release(actor, &mut self.bubbles, &self.world);
            self.events.record(self.tick, SimEvent::PullReleased { released });
        }
        self.influence.clear(&mut self.bubbles);
    }

    fn advance_timers(&mut self, dt: f32) {
        let mut destroyed = Vec::new();
        for (&id, bubble) in &mut self.bubbles {
            match bubble.advance_animation(dt, &mut self.world) {
                Some(LifecycleEvent::ShrinkCompleted) => {
                    let size = bubble.size_fraction();
                    self.events.record(self.tick, SimEvent::ShrinkCompleted { bubble: id, size });
                }
                Some(LifecycleEvent::TeardownStarted) => {
                    self.session.on_bubble_died(id);
                    self.events.record(self.tick, SimEvent::TeardownStarted { bubble: id });
                }
                Some(LifecycleEvent::Destroyed) => destroyed.push(id),
                None => {}
            }
        }

        for id in destroyed {
            self.bubbles.remove(&id);
            self.remove_body(id);
            self.events.record(self.tick, SimEvent::Destroyed { bubble: id });
        }

        let expired: Vec<BodyId> = self
            .bullets
            .iter_mut()
            .filter_map(|(&id, bullet)| bullet.advance(dt).then_some(id))
            .collect();
        for id in expired {
            self.bullets.remove(&id);
            self.remove_body(id);
            self.events.record(self.tick, SimEvent::BulletExpired { bullet: id });
        }
    }

    fn record_reaction(&mut self, bubble: BodyId, reaction: BubbleReaction) {
        let tick = self.tick;
        match reaction {
            BubbleReaction::Pushed { direction } => {
                self.events.record(tick, SimEvent::Pushed { bubble, direction });
                self.sound.play(SoundCue::BubblePush);
            }
            BubbleReaction::Hit(ShrinkOutcome::Ignored) => {}
            BubbleReaction::Hit(ShrinkOutcome::Animating { from, to }) => {
                self.events.record(tick, SimEvent::ShrinkStarted { bubble, from, to });
                self.sound.play(SoundCue::BubbleHit);
            }
            BubbleReaction::Hit(ShrinkOutcome::Resized { from, to }) => {
                self.events.record(tick, SimEvent::ShrinkStarted { bubble, from, to });
                self.events.record(tick, SimEvent::ShrinkCompleted { bubble, size: to });
                self.sound.play(SoundCue::BubbleHit);
            }
            BubbleReaction::Hit(ShrinkOutcome::Dying) => {
                self.events.record(tick, SimEvent::DeathStarted { bubble });
                self.sound.play(SoundCue::BubblePop);
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Configuration the simulation was built with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The physics world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the physics world, for level geometry.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// A bubble by body id.
    #[must_use]
    pub fn bubble(&self, id: BodyId) -> Option<&Bubble> {
        self.bubbles.get(&id)
    }

    /// Mutable access to a bubble by body id.
    pub fn bubble_mut(&mut self, id: BodyId) -> Option<&mut Bubble> {
        self.bubbles.get_mut(&id)
    }

    /// Every bubble in body id order.
    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> + '_ {
        self.bubbles.values()
    }

    /// Number of bubbles, including those still dying.
    #[must_use]
    pub fn bubble_count(&self) -> usize {
        self.bubbles.len()
    }

    /// The hunter, if spawned.
    #[must_use]
    pub const fn hunter(&self) -> Option<&Hunter> {
        self.hunter.as_ref()
    }

    /// Bullets in flight, in body id order.
    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> + '_ {
        self.bullets.values()
    }

    /// A bullet in flight by body id.
    #[must_use]
    pub fn bullet(&self, id: BodyId) -> Option<&Bullet> {
        self.bullets.get(&id)
    }

    /// The hunter's influence field.
    #[must_use]
    pub const fn influence_field(&self) -> &InfluenceField {
        &self.influence
    }

    /// The hunter's pull field.
    #[must_use]
    pub const fn pull_field(&self) -> &PullField {
        &self.pull
    }

    /// Events not yet drained.
    #[must_use]
    pub fn events(&self) -> &[LoggedEvent] {
        self.events.entries()
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<LoggedEvent> {
        self.events.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_rejected() {
        let config = SimulationConfig {
            fixed_dt: 0.0,
            ..SimulationConfig::default()
        };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn bubble_body_matches_config() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let id = sim.spawn_bubble(Vec2::ZERO).unwrap();
        let body = sim.world().body(id).unwrap();
        assert_eq!(body.category(), BodyCategory::Bubble);
        assert_eq!(body.shape().radius(), Some(0.45));
        assert_eq!(sim.bubble_count(), 1);
    }

    #[test]
    fn respawning_hunter_replaces_body() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let first = sim.spawn_hunter(Vec2::ZERO).unwrap();
        let second = sim.spawn_hunter(Vec2::X).unwrap();
        assert!(!sim.world().contains(first));
        assert_eq!(sim.hunter().map(Hunter::body), Some(second));
    }

    #[test]
    fn pull_input_without_hunter_is_dropped() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.press_pull();
        sim.step();
        assert!(!sim.pull_field().is_pulling());
        assert!(sim.events().is_empty());
    }

    #[test]
    fn fire_without_hunter_is_dropped() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.fire();
        sim.step();
        assert_eq!(sim.bullets().count(), 0);
        assert_eq!(sim.world().body_count(), 0);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn bullet_ignores_its_shooter() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let hunter = sim.spawn_hunter(Vec2::ZERO).unwrap();
        sim.fire();
        sim.step();
        let bullet = sim.bullets().next().unwrap().body();
        assert!(sim.world().is_ignored(bullet, hunter));
    }

    #[test]
    fn pull_toggle_applies_without_hunter() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.set_pull_enabled(false);
        sim.step();
        assert!(!sim.pull_field().is_enabled());

        sim.spawn_hunter(Vec2::ZERO).unwrap();
        sim.press_pull();
        sim.step();
        assert!(!sim.pull_field().is_pulling());
        assert!(sim.events().is_empty());
    }

    #[test]
    fn press_and_release_are_logged() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.spawn_hunter(Vec2::ZERO).unwrap();
        sim.press_pull();
        sim.step();
        sim.release_pull();
        sim.step();
        let events: Vec<_> = sim.take_events().into_iter().map(|e| (e.tick, e.event)).collect();
        assert_eq!(
            events,
            vec![(0, SimEvent::PullEngaged), (1, SimEvent::PullReleased { released: 0 })]
        );
    }

    #[test]
    fn shrink_of_unknown_bubble_is_none() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.shrink_bubble(BodyId::new(99)), None);
    }
}
