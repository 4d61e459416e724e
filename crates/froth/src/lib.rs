//! # Froth
//!
//! Deterministic 2D rigid-body substrate for the Bubbleborne simulation.
//!
//! Froth provides the small slice of a physics engine the gameplay core relies
//! on, behind the [`PhysicsEngine`] trait:
//!
//! - **Force integration**: continuous forces, instantaneous impulses, linear drag
//! - **Contacts**: circle/circle and circle/box manifolds, at most
//!   [`MAX_CONTACTS`] retained per body per step
//! - **Queries**: radius overlap and raycasts filtered by [`CategoryMask`]
//! - **Events**: collision-enter and trigger-enter for newly touching pairs
//! - **Pair filtering**: per-pair collision ignore registration
//!
//! ## Quick Start
//!
//! ```
//! use froth::{BodyCategory, BodyDesc, CategoryMask, PhysicsEngine, World, WorldConfig};
//! use glam::Vec2;
//!
//! let mut world = World::new(WorldConfig::default());
//!
//! let floor = world
//!     .spawn(BodyDesc::static_box(BodyCategory::Terrain, Vec2::new(0.0, -1.0), Vec2::new(10.0, 0.5)))
//!     .unwrap();
//! let ball = world
//!     .spawn(BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::new(0.0, 3.0), 0.45))
//!     .unwrap();
//!
//! world.add_force(ball, Vec2::new(0.0, -20.0));
//! world.step(1.0 / 50.0);
//!
//! let nearby = world.overlap_circle(Vec2::ZERO, 5.0, CategoryMask::BUBBLE);
//! assert_eq!(nearby, vec![ball]);
//! assert!(world.raycast(Vec2::new(0.0, 3.0), Vec2::NEG_Y, 10.0, CategoryMask::TERRAIN, None)
//!     .is_some_and(|hit| hit.body == floor));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod body;
pub mod category;
pub mod contact;
pub mod engine;
pub mod error;
pub mod query;
pub mod world;

// Re-exports for convenience
pub use body::{Body, BodyDesc, BodyId, BodyKind, Shape};
pub use category::{BodyCategory, CategoryMask};
pub use contact::{CollisionEvent, CollisionKind, Contact, MAX_CONTACTS};
pub use engine::PhysicsEngine;
pub use error::PhysicsError;
pub use query::RaycastHit;
pub use world::{World, WorldConfig};
