//! Separating Axis Theorem narrow phase for circles and convex polygons.
//!
//! Every intersection routine returns the collision normal pointing from the
//! first shape to the second together with the penetration depth along it.
//! Touching shapes (zero depth) are reported as separated.

use glam::Vec2;

use super::contact::ContactManifold;
use crate::{
    core::{rigidbody::RigidBody, shape::Shape},
    utils::math::{nearly_equal, nearly_equal_vec, point_segment_distance},
};

pub fn intersect_circles(
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> Option<(Vec2, f32)> {
    let delta = center_b - center_a;
    let distance = delta.length();
    let radii = radius_a + radius_b;
    if distance >= radii {
        return None;
    }

    // Concentric circles have no preferred axis; push along +X.
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec2::X
    };
    Some((normal, radii - distance))
}

pub fn intersect_polygons(
    vertices_a: &[Vec2],
    center_a: Vec2,
    vertices_b: &[Vec2],
    center_b: Vec2,
) -> Option<(Vec2, f32)> {
    let mut normal = Vec2::ZERO;
    let mut depth = f32::MAX;

    for vertices in [vertices_a, vertices_b] {
        for (i, &v0) in vertices.iter().enumerate() {
            let v1 = vertices[(i + 1) % vertices.len()];
            let edge = v1 - v0;
            let axis = Vec2::new(-edge.y, edge.x).normalize_or_zero();
            if axis == Vec2::ZERO {
                continue;
            }

            let (min_a, max_a) = project_vertices(vertices_a, axis);
            let (min_b, max_b) = project_vertices(vertices_b, axis);
            let axis_depth = overlap(min_a, max_a, min_b, max_b)?;
            if axis_depth < depth {
                depth = axis_depth;
                normal = axis;
            }
        }
    }

    if (center_b - center_a).dot(normal) < 0.0 {
        normal = -normal;
    }
    Some((normal, depth))
}

/// Circle against polygon; the normal points from the circle to the polygon.
pub fn intersect_circle_polygon(
    circle_center: Vec2,
    radius: f32,
    vertices: &[Vec2],
    polygon_center: Vec2,
) -> Option<(Vec2, f32)> {
    let mut normal = Vec2::ZERO;
    let mut depth = f32::MAX;

    let closest = vertices[closest_vertex_index(circle_center, vertices)];
    let vertex_axis = (closest - circle_center).normalize_or_zero();

    let edge_axes = vertices.iter().enumerate().map(|(i, &v0)| {
        let v1 = vertices[(i + 1) % vertices.len()];
        let edge = v1 - v0;
        Vec2::new(-edge.y, edge.x).normalize_or_zero()
    });

    for axis in edge_axes.chain(std::iter::once(vertex_axis)) {
        if axis == Vec2::ZERO {
            continue;
        }
        let (min_a, max_a) = project_vertices(vertices, axis);
        let (min_b, max_b) = project_circle(circle_center, radius, axis);
        let axis_depth = overlap(min_a, max_a, min_b, max_b)?;
        if axis_depth < depth {
            depth = axis_depth;
            normal = axis;
        }
    }

    if (polygon_center - circle_center).dot(normal) < 0.0 {
        normal = -normal;
    }
    Some((normal, depth))
}

fn overlap(min_a: f32, max_a: f32, min_b: f32, max_b: f32) -> Option<f32> {
    if min_a >= max_b || min_b >= max_a {
        return None;
    }
    Some((max_b - min_a).min(max_a - min_b))
}

fn project_vertices(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    vertices.iter().fold((f32::MAX, f32::MIN), |(min, max), v| {
        let projection = v.dot(axis);
        (min.min(projection), max.max(projection))
    })
}

fn project_circle(center: Vec2, radius: f32, axis: Vec2) -> (f32, f32) {
    let projection = center.dot(axis);
    (projection - radius, projection + radius)
}

fn closest_vertex_index(point: Vec2, vertices: &[Vec2]) -> usize {
    vertices
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
        .map(|(index, _)| index)
        .unwrap_or(0)
}

pub fn circle_contact(center_a: Vec2, radius_a: f32, center_b: Vec2) -> Vec2 {
    let direction = (center_b - center_a).normalize_or(Vec2::X);
    center_a + direction * radius_a
}

/// Closest point on the polygon outline to the circle centre.
pub fn circle_polygon_contact(circle_center: Vec2, vertices: &[Vec2]) -> Vec2 {
    let mut best = vertices[0];
    let mut best_distance = f32::MAX;
    for (i, &v0) in vertices.iter().enumerate() {
        let v1 = vertices[(i + 1) % vertices.len()];
        let (point, distance_sq) = point_segment_distance(circle_center, v0, v1);
        if distance_sq < best_distance {
            best_distance = distance_sq;
            best = point;
        }
    }
    best
}

/// One or two contact points between overlapping polygons: the vertices of
/// either polygon lying closest to an edge of the other.
pub fn polygon_contacts(vertices_a: &[Vec2], vertices_b: &[Vec2]) -> ([Vec2; 2], usize) {
    let mut points = [Vec2::ZERO; 2];
    let mut count = 0;
    let mut min_distance = f32::MAX;

    for (points_of, edges_of) in [(vertices_a, vertices_b), (vertices_b, vertices_a)] {
        for &p in points_of {
            for (i, &v0) in edges_of.iter().enumerate() {
                let v1 = edges_of[(i + 1) % edges_of.len()];
                let (closest, distance_sq) = point_segment_distance(p, v0, v1);

                if nearly_equal(distance_sq, min_distance) {
                    if !nearly_equal_vec(closest, points[0]) {
                        points[1] = closest;
                        count = 2;
                    }
                } else if distance_sq < min_distance {
                    min_distance = distance_sq;
                    points[0] = closest;
                    count = 1;
                }
            }
        }
    }

    (points, count)
}

/// Reusable vertex buffers so the per-pair narrow phase never allocates once
/// warmed up.
#[derive(Debug, Default)]
pub struct NarrowPhase {
    vertices_a: Vec<Vec2>,
    vertices_b: Vec<Vec2>,
}

impl NarrowPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs SAT on two bodies, filling `normal` and `depth` on overlap.
    pub fn collide(&mut self, a: &RigidBody, b: &RigidBody, manifold: &mut ContactManifold) -> bool {
        let (Some(shape_a), Some(shape_b)) = (a.shape(), b.shape()) else {
            return false;
        };
        let center_a = a.position();
        let center_b = b.position();

        let hit = match (shape_a, shape_b) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                intersect_circles(center_a, *ra, center_b, *rb)
            }
            (Shape::Circle { radius }, Shape::Polygon(_)) => {
                shape_b.write_transformed_vertices(&b.transform, &mut self.vertices_b);
                intersect_circle_polygon(center_a, *radius, &self.vertices_b, center_b)
            }
            (Shape::Polygon(_), Shape::Circle { radius }) => {
                shape_a.write_transformed_vertices(&a.transform, &mut self.vertices_a);
                intersect_circle_polygon(center_b, *radius, &self.vertices_a, center_a)
                    .map(|(normal, depth)| (-normal, depth))
            }
            (Shape::Polygon(_), Shape::Polygon(_)) => {
                shape_a.write_transformed_vertices(&a.transform, &mut self.vertices_a);
                shape_b.write_transformed_vertices(&b.transform, &mut self.vertices_b);
                intersect_polygons(&self.vertices_a, center_a, &self.vertices_b, center_b)
            }
        };

        match hit {
            Some((normal, depth)) => {
                manifold.normal = normal;
                manifold.depth = depth;
                true
            }
            None => false,
        }
    }

    /// Fills the manifold's contact points from the bodies' current placement.
    pub fn find_contact_points(&mut self, a: &RigidBody, b: &RigidBody, manifold: &mut ContactManifold) {
        let (Some(shape_a), Some(shape_b)) = (a.shape(), b.shape()) else {
            manifold.set_contacts(&[]);
            return;
        };

        match (shape_a, shape_b) {
            (Shape::Circle { radius }, Shape::Circle { .. }) => {
                let point = circle_contact(a.position(), *radius, b.position());
                manifold.set_contacts(&[point]);
            }
            (Shape::Circle { .. }, Shape::Polygon(_)) => {
                shape_b.write_transformed_vertices(&b.transform, &mut self.vertices_b);
                let point = circle_polygon_contact(a.position(), &self.vertices_b);
                manifold.set_contacts(&[point]);
            }
            (Shape::Polygon(_), Shape::Circle { .. }) => {
                shape_a.write_transformed_vertices(&a.transform, &mut self.vertices_a);
                let point = circle_polygon_contact(b.position(), &self.vertices_a);
                manifold.set_contacts(&[point]);
            }
            (Shape::Polygon(_), Shape::Polygon(_)) => {
                shape_a.write_transformed_vertices(&a.transform, &mut self.vertices_a);
                shape_b.write_transformed_vertices(&b.transform, &mut self.vertices_b);
                let (points, count) = polygon_contacts(&self.vertices_a, &self.vertices_b);
                manifold.set_contacts(&points[..count]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(center: Vec2, half: f32) -> Vec<Vec2> {
        vec![
            center + Vec2::new(-half, -half),
            center + Vec2::new(half, -half),
            center + Vec2::new(half, half),
            center + Vec2::new(-half, half),
        ]
    }

    #[test]
    fn overlapping_circles_report_depth_and_normal() {
        let (normal, depth) =
            intersect_circles(Vec2::ZERO, 1.0, Vec2::new(1.5, 0.0), 1.0).expect("overlap");
        assert_abs_diff_eq!(depth, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(normal.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn touching_circles_do_not_collide() {
        assert!(intersect_circles(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn polygon_normal_points_from_a_to_b() {
        let a = square(Vec2::ZERO, 1.0);
        let b = square(Vec2::new(-1.5, 0.2), 1.0);
        let (normal, depth) = intersect_polygons(&a, Vec2::ZERO, &b, Vec2::new(-1.5, 0.2)).unwrap();
        assert_abs_diff_eq!(normal.x, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(depth, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn separated_polygons_do_not_collide() {
        let a = square(Vec2::ZERO, 1.0);
        let b = square(Vec2::new(2.5, 0.0), 1.0);
        assert!(intersect_polygons(&a, Vec2::ZERO, &b, Vec2::new(2.5, 0.0)).is_none());
    }

    #[test]
    fn circle_polygon_uses_vertex_axis_near_corners() {
        let poly = square(Vec2::ZERO, 1.0);
        // Circle just beyond the corner along the diagonal: edge axes overlap,
        // the vertex axis separates.
        let center = Vec2::new(1.6, 1.6);
        assert!(intersect_circle_polygon(center, 0.8, &poly, Vec2::ZERO).is_none());

        let (normal, depth) =
            intersect_circle_polygon(Vec2::new(0.0, 1.5), 1.0, &poly, Vec2::ZERO).unwrap();
        assert_abs_diff_eq!(normal.y, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(depth, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn stacked_boxes_produce_two_contacts() {
        let a = square(Vec2::ZERO, 1.0);
        let b = square(Vec2::new(0.0, 1.9), 1.0);
        let (points, count) = polygon_contacts(&a, &b);
        assert_eq!(count, 2);
        let mut xs = [points[0].x, points[1].x];
        xs.sort_by(f32::total_cmp);
        assert_abs_diff_eq!(xs[0], -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(xs[1], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn circle_polygon_contact_is_on_outline() {
        let poly = square(Vec2::ZERO, 1.0);
        let point = circle_polygon_contact(Vec2::new(0.3, 1.5), &poly);
        assert_abs_diff_eq!(point.x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(point.y, 1.0, epsilon = 1e-6);
    }
}
