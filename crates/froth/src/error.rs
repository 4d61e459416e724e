//! Error types for body creation and lookup.

use thiserror::Error;

use crate::body::BodyId;

/// Errors reported by the world.
///
/// Per-step operations never fail; these errors only come out of spawning and
/// explicit lookups.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The body does not exist (never spawned, or already despawned).
    #[error("unknown body {0}")]
    UnknownBody(BodyId),
    /// A shape dimension was zero, negative or not finite.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// A dynamic body was given a non-positive or non-finite mass.
    #[error("invalid mass {0}")]
    InvalidMass(f32),
    /// Drag must be finite and non-negative.
    #[error("invalid linear drag {0}")]
    InvalidDrag(f32),
    /// A vector field contained NaN or infinity.
    #[error("non-finite {0}")]
    NonFinite(&'static str),
}
