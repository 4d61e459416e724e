//! Force fields attached to an actor.
//!
//! - [`InfluenceField`]: passive, adds a falloff force along the actor's travel
//! - [`PullField`]: active while the pull input is held, sets bubble velocity
//!   toward the actor
//!
//! Both query the physics engine for bubbles inside their radius every tick
//! and update the bubbles' `influenced` / `pulled` flags.

mod influence;
mod pull;

pub use influence::{InfluenceConfig, InfluenceField};
pub use pull::{PullConfig, PullField};
