//! Pure motion math for bubbles.
//!
//! Nothing here touches the physics engine, so every rule can be tested (and
//! property-tested) in isolation.

use glam::Vec2;

/// Upward bias added to escape and push directions before re-normalizing.
pub const UPWARD_BIAS: Vec2 = Vec2::new(0.0, 0.5);

/// Tolerance on the corner cosine so that the boundary angle counts.
const CORNER_EPSILON: f32 = 1e-6;

/// Whether any unordered pair of contact normals is at most the corner angle
/// apart.
///
/// `corner_cos` is the cosine of the detection angle. Zero-length normals are
/// skipped.
///
/// ```
/// use bubbleborne_core::bubble::motion::detect_corner;
/// use glam::Vec2;
///
/// // Floor and wall meet at exactly 90 degrees.
/// assert!(detect_corner(&[Vec2::Y, Vec2::X], 0.0));
/// // Opposite walls do not form a corner.
/// assert!(!detect_corner(&[Vec2::X, Vec2::NEG_X], 0.0));
/// ```
#[must_use]
pub fn detect_corner(normals: &[Vec2], corner_cos: f32) -> bool {
    for (i, a) in normals.iter().enumerate() {
        let Some(a) = a.try_normalize() else {
            continue;
        };
        for b in &normals[i + 1..] {
            let Some(b) = b.try_normalize() else {
                continue;
            };
            if a.dot(b) >= corner_cos - CORNER_EPSILON {
                return true;
            }
        }
    }
    false
}

/// Unit direction out of a corner: the normalized sum of the contact normals
/// with an upward bias.
///
/// When the normals cancel, the result is straight up.
#[must_use]
pub fn escape_direction(normals: &[Vec2]) -> Vec2 {
    let sum: Vec2 = normals.iter().copied().sum();
    (sum.normalize_or_zero() + UPWARD_BIAS).normalize_or_zero()
}

/// Direction along the confining surface, perpendicular to `escape`.
#[must_use]
pub fn slide_direction(escape: Vec2) -> Vec2 {
    Vec2::new(escape.y, -escape.x)
}

/// Unit direction in which a player pushes a bubble, biased upward.
///
/// Coincident positions push straight up.
#[must_use]
pub fn push_direction(bubble: Vec2, actor: Vec2) -> Vec2 {
    ((bubble - actor).normalize_or_zero() + UPWARD_BIAS).normalize_or_zero()
}

/// Moves `current` toward `target` by the fraction `rate · dt` (capped at 1).
#[must_use]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Caps the magnitude of `velocity` at `max`, keeping its direction.
#[must_use]
pub fn clamp_speed(velocity: Vec2, max: f32) -> Vec2 {
    velocity.clamp_length_max(max)
}
