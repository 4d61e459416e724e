//! Shape intersection tests backing overlap queries, raycasts and contacts.
//!
//! All functions are pure and operate on plain positions and shapes so they
//! can run inside the parallel pair scan.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::body::{BodyId, Shape};

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaycastHit {
    /// Body that was hit.
    pub body: BodyId,
    /// World-space hit point.
    pub point: Vec2,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Surface normal at the hit point.
    pub normal: Vec2,
}

/// Penetration between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Manifold {
    /// Unit normal from the first shape toward the second. `None` when the
    /// centres coincide and no direction can be derived.
    pub normal: Option<Vec2>,
    /// Penetration depth (positive when overlapping).
    pub depth: f32,
    /// Contact point on the surface of the first shape.
    pub point: Vec2,
}

/// Closest point on an axis-aligned box to `point`.
#[must_use]
pub(crate) fn closest_point_on_box(center: Vec2, half_extents: Vec2, point: Vec2) -> Vec2 {
    point.clamp(center - half_extents, center + half_extents)
}

/// Whether a shape at `position` overlaps the circle (`center`, `radius`).
#[must_use]
pub(crate) fn shape_overlaps_circle(shape: Shape, position: Vec2, center: Vec2, radius: f32) -> bool {
    match shape {
        Shape::Circle { radius: r } => position.distance_squared(center) <= (r + radius) * (r + radius),
        Shape::Box { half_extents } => {
            let closest = closest_point_on_box(position, half_extents, center);
            closest.distance_squared(center) <= radius * radius
        }
    }
}

/// Computes the penetration manifold between two shapes.
///
/// Box/box pairs are not supported and never produce a manifold.
#[must_use]
pub(crate) fn manifold(a: Shape, pa: Vec2, b: Shape, pb: Vec2) -> Option<Manifold> {
    match (a, b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pa, ra, pb, rb)
        }
        (Shape::Circle { radius }, Shape::Box { half_extents }) => {
            // Box-to-circle normal, flipped to circle-to-box.
            circle_box(pa, radius, pb, half_extents).map(|m| Manifold {
                normal: m.normal.map(|n| -n),
                depth: m.depth,
                point: m.point,
            })
        }
        (Shape::Box { half_extents }, Shape::Circle { radius }) => {
            circle_box(pb, radius, pa, half_extents)
        }
        (Shape::Box { .. }, Shape::Box { .. }) => None,
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Manifold> {
    let delta = pb - pa;
    let dist_sq = delta.length_squared();
    let reach = ra + rb;
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = (dist > f32::EPSILON).then(|| delta / dist);
    Some(Manifold {
        normal,
        depth: reach - dist,
        point: pa + normal.unwrap_or(Vec2::ZERO) * ra,
    })
}

/// Manifold with the normal pointing from the box toward the circle.
fn circle_box(circle: Vec2, radius: f32, center: Vec2, half_extents: Vec2) -> Option<Manifold> {
    let closest = closest_point_on_box(center, half_extents, circle);
    let delta = circle - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > f32::EPSILON * f32::EPSILON {
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Manifold {
            normal: Some(delta / dist),
            depth: radius - dist,
            point: closest,
        });
    }

    // Circle centre inside the box: push out along the shallowest axis.
    let local = circle - center;
    let gap_x = half_extents.x - local.x.abs();
    let gap_y = half_extents.y - local.y.abs();
    let (normal, gap) = if gap_x < gap_y {
        (Vec2::new(local.x.signum(), 0.0), gap_x)
    } else {
        (Vec2::new(0.0, local.y.signum()), gap_y)
    };
    Some(Manifold {
        normal: Some(normal),
        depth: radius + gap,
        point: circle + normal * gap,
    })
}

/// Distance along a normalized ray to the first intersection with a shape.
///
/// A ray starting inside the shape hits at distance zero.
#[must_use]
pub(crate) fn ray_shape(
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    shape: Shape,
    position: Vec2,
) -> Option<(f32, Vec2)> {
    match shape {
        Shape::Circle { radius } => ray_circle(origin, direction, max_distance, position, radius),
        Shape::Box { half_extents } => {
            ray_box(origin, direction, max_distance, position, half_extents)
        }
    }
}

fn ray_circle(
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    center: Vec2,
    radius: f32,
) -> Option<(f32, Vec2)> {
    let to_origin = origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some((0.0, to_origin.normalize_or_zero()));
    }
    let b = to_origin.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    if t > max_distance {
        return None;
    }
    let point = origin + direction * t;
    Some((t, (point - center).normalize_or_zero()))
}

fn ray_box(
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    center: Vec2,
    half_extents: Vec2,
) -> Option<(f32, Vec2)> {
    let min = center - half_extents;
    let max = center + half_extents;
    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], direction[axis], min[axis], max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
        let mut face = Vec2::ZERO;
        face[axis] = -d.signum();
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            normal = face;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }
    Some((t_enter, normal))
}
