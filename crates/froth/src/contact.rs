//! Contact samples and collision events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::body::BodyId;

/// Maximum number of contacts retained per body per step.
pub const MAX_CONTACTS: usize = 4;

/// One point of contact on a body.
///
/// The normal is a unit vector pointing from the other body toward the body
/// the contact belongs to, i.e. the direction that pushes it free.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    /// The other body in the contact.
    pub other: Option<BodyId>,
    /// World-space contact point.
    pub point: Vec2,
    /// Unit normal pointing away from the other body.
    pub normal: Vec2,
}

impl Contact {
    /// Creates a contact sample.
    #[must_use]
    pub const fn new(other: BodyId, point: Vec2, normal: Vec2) -> Self {
        Self {
            other: Some(other),
            point,
            normal,
        }
    }
}

/// Whether an event came from a solid collision or a trigger overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Two solid colliders started touching.
    Collision,
    /// A collider started overlapping a trigger.
    Trigger,
}

/// A pair that started touching during the last step.
///
/// Pairs are reported once, on the first step they touch, and again only after
/// they have separated for at least one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Collision or trigger overlap.
    pub kind: CollisionKind,
    /// Lower body id of the pair.
    pub a: BodyId,
    /// Higher body id of the pair.
    pub b: BodyId,
    /// Unit normal pointing from `a` toward `b`.
    pub normal: Vec2,
}

impl CollisionEvent {
    /// Returns the other body of the pair, if `id` is part of it.
    #[must_use]
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether `id` is part of the pair.
    #[must_use]
    pub fn involves(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_returns_partner() {
        let event = CollisionEvent {
            kind: CollisionKind::Collision,
            a: BodyId::new(1),
            b: BodyId::new(4),
            normal: Vec2::X,
        };
        assert_eq!(event.other(BodyId::new(1)), Some(BodyId::new(4)));
        assert_eq!(event.other(BodyId::new(4)), Some(BodyId::new(1)));
        assert_eq!(event.other(BodyId::new(2)), None);
        assert!(event.involves(BodyId::new(4)));
        assert!(!event.involves(BodyId::new(5)));
    }

    #[test]
    fn default_contact_is_empty() {
        let contact = Contact::default();
        assert_eq!(contact.other, None);
        assert_eq!(contact.normal, Vec2::ZERO);
    }
}
