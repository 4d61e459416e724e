//! # Bubbleborne Core
//!
//! Gameplay core for Bubbleborne: bubbles that float, get shoved around by a
//! hunter, shrink when hurt and die in a fixed sequence.
//!
//! ## Architecture
//!
//! - **Bubbles** ([`bubble`]): per-tick motion policy, shrink and death lifecycle
//! - **Fields** ([`fields`]): influence and pull forces emitted by an actor
//! - **Hunter** ([`hunter`]): the player actor carrying both fields and a gun
//! - **Projectiles** ([`projectile`]): bullets that destroy enemies on contact
//! - **Collaborators** ([`collaborators`], [`audio`]): animator, session and
//!   sound service, injected rather than global
//! - **Simulation** ([`simulation`]): the fixed-step tick loop tying it together
//!
//! Physics goes through the [`froth::PhysicsEngine`] trait; [`froth::World`] is
//! the reference engine.
//!
//! ## Usage
//!
//! ```
//! use bubbleborne_core::{SimEvent, Simulation, SimulationConfig};
//! use froth::{BodyCategory, BodyDesc};
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
//! let bubble = sim.spawn_bubble(Vec2::new(0.0, 0.5)).unwrap();
//! sim.world_mut()
//!     .spawn(BodyDesc::static_box(BodyCategory::Hazard, Vec2::new(0.0, 1.0), Vec2::new(2.0, 0.2)))
//!     .unwrap();
//!
//! sim.step();
//!
//! assert!(sim.take_events().iter().any(|e| matches!(
//!     e.event,
//!     SimEvent::ShrinkStarted { bubble: hit, .. } if hit == bubble
//! )));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export froth for physics types
pub use froth;

pub mod audio;
pub mod bubble;
pub mod collaborators;
pub mod config;
pub mod events;
pub mod fields;
pub mod hunter;
pub mod projectile;
pub mod simulation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use audio::{AudioConfig, AudioPool, SoundCue, SoundService};
pub use bubble::{Bubble, BubbleConfig, BubbleProfile, BubbleState, ShrinkOutcome};
pub use collaborators::{AnimationTrigger, Animator, AnimatorState, Session, SessionTally};
pub use config::{ConfigError, SimulationConfig, FIXED_DT};
pub use events::{EventLog, LoggedEvent, SimEvent};
pub use fields::{InfluenceConfig, InfluenceField, PullConfig, PullField};
pub use hunter::{Hunter, HunterConfig};
pub use projectile::{Bullet, BulletConfig, Impact};
pub use simulation::Simulation;
