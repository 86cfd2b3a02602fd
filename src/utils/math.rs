//! Additional math helpers layered on top of `glam`.

use glam::Vec2;

/// Tolerance used when comparing distances produced by the narrow phase.
pub const NEARLY_EQUAL_EPSILON: f32 = 0.0005;

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Z component of the 3D cross product of two planar vectors.
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar angular velocity with a lever arm (`ω × r`).
pub fn cross_scalar(w: f32, r: Vec2) -> Vec2 {
    Vec2::new(-w * r.y, w * r.x)
}

pub fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < NEARLY_EQUAL_EPSILON
}

pub fn nearly_equal_vec(a: Vec2, b: Vec2) -> bool {
    a.distance_squared(b) < NEARLY_EQUAL_EPSILON * NEARLY_EQUAL_EPSILON
}

/// Closest point on segment `ab` to `p`, together with the squared distance.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let closest = if len_sq <= f32::EPSILON {
        a
    } else {
        let t = clamp((p - a).dot(ab) / len_sq, 0.0, 1.0);
        a + ab * t
    };
    (closest, p.distance_squared(closest))
}
