//! Body categories and query masks.
//!
//! Every body carries exactly one [`BodyCategory`]. Queries filter on a
//! [`CategoryMask`], so "everything except the background" is a single mask
//! comparison rather than a string lookup.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Gameplay category of a body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyCategory {
    /// Decorative scenery; bubbles never collide with it.
    Background,
    /// Walls, floors and ceilings.
    Terrain,
    /// The player actor.
    Player,
    /// Static damage sources (spikes, hazard volumes).
    Hazard,
    /// Moving damage sources.
    Enemy,
    /// Floating bubbles.
    Bubble,
    /// Shots fired by the player.
    Projectile,
}

impl BodyCategory {
    /// Returns the single-bit mask for this category.
    #[must_use]
    pub const fn mask(self) -> CategoryMask {
        match self {
            Self::Background => CategoryMask::BACKGROUND,
            Self::Terrain => CategoryMask::TERRAIN,
            Self::Player => CategoryMask::PLAYER,
            Self::Hazard => CategoryMask::HAZARD,
            Self::Enemy => CategoryMask::ENEMY,
            Self::Bubble => CategoryMask::BUBBLE,
            Self::Projectile => CategoryMask::PROJECTILE,
        }
    }

    /// Whether contact with this category damages a bubble.
    #[must_use]
    pub const fn is_harmful(self) -> bool {
        matches!(self, Self::Hazard | Self::Enemy)
    }
}

impl fmt::Display for BodyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "Background"),
            Self::Terrain => write!(f, "Terrain"),
            Self::Player => write!(f, "Player"),
            Self::Hazard => write!(f, "Hazard"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Bubble => write!(f, "Bubble"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

bitflags! {
    /// Set of categories accepted by a query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CategoryMask: u8 {
        /// Background scenery
        const BACKGROUND = 1 << 0;
        /// Terrain
        const TERRAIN = 1 << 1;
        /// Player actor
        const PLAYER = 1 << 2;
        /// Hazards
        const HAZARD = 1 << 3;
        /// Enemies
        const ENEMY = 1 << 4;
        /// Bubbles
        const BUBBLE = 1 << 5;
        /// Player shots
        const PROJECTILE = 1 << 6;
    }
}

impl CategoryMask {
    /// Every category except the background.
    #[must_use]
    pub fn solid() -> Self {
        Self::all().difference(Self::BACKGROUND)
    }

    /// Whether the mask accepts the category.
    #[must_use]
    pub fn accepts(self, category: BodyCategory) -> bool {
        self.contains(category.mask())
    }
}

impl From<BodyCategory> for CategoryMask {
    fn from(category: BodyCategory) -> Self {
        category.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_category_has_distinct_bit() {
        let all = [
            BodyCategory::Background,
            BodyCategory::Terrain,
            BodyCategory::Player,
            BodyCategory::Hazard,
            BodyCategory::Enemy,
            BodyCategory::Bubble,
            BodyCategory::Projectile,
        ];
        let mut seen = CategoryMask::empty();
        for category in all {
            assert!(!seen.intersects(category.mask()), "{category} shares a bit");
            seen |= category.mask();
        }
        assert_eq!(seen, CategoryMask::all());
    }

    #[test]
    fn solid_excludes_background_only() {
        let solid = CategoryMask::solid();
        assert!(!solid.accepts(BodyCategory::Background));
        assert!(solid.accepts(BodyCategory::Terrain));
        assert!(solid.accepts(BodyCategory::Bubble));
        assert!(solid.accepts(BodyCategory::Player));
    }

    #[test]
    fn harmful_categories() {
        assert!(BodyCategory::Hazard.is_harmful());
        assert!(BodyCategory::Enemy.is_harmful());
        assert!(!BodyCategory::Player.is_harmful());
        assert!(!BodyCategory::Projectile.is_harmful());
        assert!(!BodyCategory::Terrain.is_harmful());
    }

    #[test]
    fn mask_is_serializable() {
        let mask = CategoryMask::BUBBLE | CategoryMask::PLAYER;
        let json = serde_json::to_string(&mask).unwrap();
        let back: CategoryMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mask);
    }
}
