//! Rigid bodies and their descriptions.
//!
//! A [`BodyDesc`] is the validated-on-spawn description of a body; the
//! [`World`](crate::World) turns it into a [`Body`] with a unique [`BodyId`].

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::category::BodyCategory;
use crate::error::PhysicsError;

/// Unique identifier for a body.
///
/// Body IDs are assigned monotonically by the world and are ordered by their
/// numeric value, which gives every iteration over bodies a deterministic
/// order.
///
/// # Example
///
/// ```
/// use froth::BodyId;
///
/// let a = BodyId::new(1);
/// let b = BodyId::new(2);
/// assert!(a < b);
/// assert_eq!(a.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(u64);

impl BodyId {
    /// Creates a `BodyId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({})", self.0)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Collision shape of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Circle centred on the body position.
    Circle {
        /// Radius in world units
        radius: f32,
    },
    /// Axis-aligned box centred on the body position.
    Box {
        /// Half width and half height
        half_extents: Vec2,
    },
}

impl Shape {
    /// Returns the circle radius, if this is a circle.
    #[must_use]
    pub const fn radius(&self) -> Option<f32> {
        match self {
            Self::Circle { radius } => Some(*radius),
            Self::Box { .. } => None,
        }
    }

    fn validate(&self) -> Result<(), PhysicsError> {
        match self {
            Self::Circle { radius } if !(radius.is_finite() && *radius > 0.0) => {
                Err(PhysicsError::InvalidShape(format!("circle radius {radius}")))
            }
            Self::Box { half_extents }
                if !(half_extents.is_finite() && half_extents.x > 0.0 && half_extents.y > 0.0) =>
            {
                Err(PhysicsError::InvalidShape(format!("box half extents {half_extents}")))
            }
            _ => Ok(()),
        }
    }
}

/// Whether the integrator moves a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by forces, impulses and contact resolution.
    Dynamic,
    /// Never moves; infinite mass during contact resolution.
    Static,
}

/// Description of a body to spawn.
///
/// # Example
///
/// ```
/// use froth::{BodyCategory, BodyDesc};
/// use glam::Vec2;
///
/// let desc = BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::ZERO, 0.45)
///     .with_mass(1.0)
///     .with_linear_drag(0.5);
/// assert_eq!(desc.shape.radius(), Some(0.45));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    /// Gameplay category used for query filtering and event routing.
    pub category: BodyCategory,
    /// Dynamic or static.
    pub kind: BodyKind,
    /// Collision shape.
    pub shape: Shape,
    /// Initial position.
    pub position: Vec2,
    /// Initial velocity.
    pub velocity: Vec2,
    /// Mass (ignored for static bodies).
    pub mass: f32,
    /// Linear drag coefficient per second.
    pub linear_drag: f32,
    /// Triggers report overlap events but never resolve contacts.
    pub is_trigger: bool,
}

impl BodyDesc {
    /// A dynamic circle with unit mass and no drag.
    #[must_use]
    pub fn dynamic_circle(category: BodyCategory, position: Vec2, radius: f32) -> Self {
        Self {
            category,
            kind: BodyKind::Dynamic,
            shape: Shape::Circle { radius },
            position,
            velocity: Vec2::ZERO,
            mass: 1.0,
            linear_drag: 0.0,
            is_trigger: false,
        }
    }

    /// A static axis-aligned box.
    #[must_use]
    pub fn static_box(category: BodyCategory, center: Vec2, half_extents: Vec2) -> Self {
        Self {
            category,
            kind: BodyKind::Static,
            shape: Shape::Box { half_extents },
            position: center,
            velocity: Vec2::ZERO,
            mass: 1.0,
            linear_drag: 0.0,
            is_trigger: false,
        }
    }

    /// A static circle.
    #[must_use]
    pub fn static_circle(category: BodyCategory, center: Vec2, radius: f32) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic_circle(category, center, radius)
        }
    }

    /// Sets the mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the linear drag.
    #[must_use]
    pub fn with_linear_drag(mut self, drag: f32) -> Self {
        self.linear_drag = drag;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Marks the body as a trigger.
    #[must_use]
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Checks the description for values the integrator cannot handle.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError`] for non-finite vectors, non-positive shape
    /// dimensions, non-positive dynamic mass or negative drag.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(PhysicsError::NonFinite("position or velocity"));
        }
        self.shape.validate()?;
        if self.kind == BodyKind::Dynamic && !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if !(self.linear_drag.is_finite() && self.linear_drag >= 0.0) {
            return Err(PhysicsError::InvalidDrag(self.linear_drag));
        }
        Ok(())
    }
}

/// A body living in a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub(crate) id: BodyId,
    pub(crate) category: BodyCategory,
    pub(crate) kind: BodyKind,
    pub(crate) shape: Shape,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) mass: f32,
    pub(crate) linear_drag: f32,
    pub(crate) is_trigger: bool,
    pub(crate) simulated: bool,
    pub(crate) collider_enabled: bool,
    /// Force accumulated since the last step.
    pub(crate) force: Vec2,
}

impl Body {
    pub(crate) fn from_desc(id: BodyId, desc: BodyDesc) -> Self {
        Self {
            id,
            category: desc.category,
            kind: desc.kind,
            shape: desc.shape,
            position: desc.position,
            velocity: desc.velocity,
            mass: desc.mass,
            linear_drag: desc.linear_drag,
            is_trigger: desc.is_trigger,
            simulated: true,
            collider_enabled: true,
            force: Vec2::ZERO,
        }
    }

    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> BodyId {
        self.id
    }

    /// Gameplay category.
    #[must_use]
    pub const fn category(&self) -> BodyCategory {
        self.category
    }

    /// Dynamic or static.
    #[must_use]
    pub const fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Collision shape.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Whether the body is a trigger.
    #[must_use]
    pub const fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Whether the body takes part in the simulation at all.
    #[must_use]
    pub const fn is_simulated(&self) -> bool {
        self.simulated
    }

    /// Whether the collider takes part in contacts and queries.
    #[must_use]
    pub const fn is_collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    /// Inverse mass used by contact resolution. Zero for static or parked bodies.
    pub(crate) fn inverse_mass(&self) -> f32 {
        if self.kind == BodyKind::Dynamic && self.simulated {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Whether the body can currently touch anything.
    pub(crate) fn collides(&self) -> bool {
        self.simulated && self.collider_enabled
    }

    /// Whether the body currently answers overlap and ray queries.
    pub(crate) fn queryable(&self) -> bool {
        self.simulated && self.collider_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod body_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_raw_value() {
            assert!(BodyId::new(3) < BodyId::new(7));
            assert_eq!(BodyId::from(9).as_u64(), 9);
        }

        #[test]
        fn debug_and_display() {
            let id = BodyId::new(12);
            assert_eq!(format!("{id:?}"), "BodyId(12)");
            assert_eq!(format!("{id}"), "12");
        }
    }

    mod desc_validation_tests {
        use super::*;

        #[test]
        fn valid_circle_passes() {
            let desc = BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::ZERO, 0.5);
            assert!(desc.validate().is_ok());
        }

        #[test]
        fn zero_radius_rejected() {
            let desc = BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::ZERO, 0.0);
            assert!(matches!(desc.validate(), Err(PhysicsError::InvalidShape(_))));
        }

        #[test]
        fn flat_box_rejected() {
            let desc =
                BodyDesc::static_box(BodyCategory::Terrain, Vec2::ZERO, Vec2::new(1.0, 0.0));
            assert!(matches!(desc.validate(), Err(PhysicsError::InvalidShape(_))));
        }

        #[test]
        fn non_finite_position_rejected() {
            let desc =
                BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::new(f32::NAN, 0.0), 0.5);
            assert!(matches!(desc.validate(), Err(PhysicsError::NonFinite(_))));
        }

        #[test]
        fn dynamic_zero_mass_rejected() {
            let desc =
                BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::ZERO, 0.5).with_mass(0.0);
            assert!(matches!(desc.validate(), Err(PhysicsError::InvalidMass(_))));
        }

        #[test]
        fn static_mass_is_ignored() {
            let desc = BodyDesc::static_circle(BodyCategory::Terrain, Vec2::ZERO, 0.5)
                .with_mass(0.0);
            assert!(desc.validate().is_ok());
        }

        #[test]
        fn negative_drag_rejected() {
            let desc = BodyDesc::dynamic_circle(BodyCategory::Bubble, Vec2::ZERO, 0.5)
                .with_linear_drag(-1.0);
            assert!(matches!(desc.validate(), Err(PhysicsError::InvalidDrag(_))));
        }
    }

    #[test]
    fn desc_is_serializable() {
        let desc = BodyDesc::static_box(BodyCategory::Terrain, Vec2::ONE, Vec2::splat(2.0));
        let json = serde_json::to_string(&desc).unwrap();
        let back: BodyDesc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }
}
