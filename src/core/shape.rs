//! Local-space collision geometry and its mass properties.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::{Aabb, MassProperties, Transform};
use crate::error::{PhysicsError, Result};
use crate::utils::math::cross;

/// Enumeration of supported body geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon(ConvexPolygon),
}

/// Validated polygon outline.
///
/// Vertices are convex, wound counter-clockwise and centred on the polygon's
/// centroid, so the owning body's position is its centre of mass. The only
/// way in is [`ConvexPolygon::new`], which serde also goes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct ConvexPolygon {
    vertices: Vec<Vec2>,
}

impl ConvexPolygon {
    /// Re-centres the vertices on their centroid and fixes clockwise input
    /// to counter-clockwise.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::TooFewVertices(vertices.len()));
        }
        let extents = Aabb::from_points(vertices.iter().copied())
            .map(|aabb| aabb.extents())
            .unwrap_or(Vec2::ZERO);
        if !extents.is_finite() {
            return Err(PhysicsError::InvalidDimension(
                "polygon vertices must be finite".into(),
            ));
        }

        // Relative to the bounding box so tiny but well-formed outlines pass.
        let (area, centroid) = signed_area_and_centroid(&vertices);
        if area.abs() <= f32::EPSILON * extents.x * extents.y {
            return Err(PhysicsError::DegeneratePolygon);
        }

        let mut vertices: Vec<Vec2> = vertices.into_iter().map(|v| v - centroid).collect();
        if area < 0.0 {
            vertices.reverse();
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }
}

impl TryFrom<Vec<Vec2>> for ConvexPolygon {
    type Error = PhysicsError;

    fn try_from(vertices: Vec<Vec2>) -> Result<Self> {
        Self::new(vertices)
    }
}

impl From<ConvexPolygon> for Vec<Vec2> {
    fn from(polygon: ConvexPolygon) -> Self {
        polygon.vertices
    }
}

impl Shape {
    pub fn circle(radius: f32) -> Result<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(PhysicsError::InvalidDimension(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        Ok(Shape::Circle { radius })
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self> {
        ConvexPolygon::new(vertices).map(Shape::Polygon)
    }

    pub fn rectangle(width: f32, height: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(PhysicsError::InvalidDimension(format!(
                "rectangle must have positive size, got {width}x{height}"
            )));
        }
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self::polygon(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    pub fn regular_polygon(radius: f32, sides: u32) -> Result<Self> {
        if sides < 3 {
            return Err(PhysicsError::TooFewVertices(sides as usize));
        }
        if radius <= 0.0 || !radius.is_finite() {
            return Err(PhysicsError::InvalidDimension(format!(
                "polygon radius must be positive, got {radius}"
            )));
        }
        let step = TAU / sides as f32;
        Self::polygon(
            (0..sides)
                .map(|i| Vec2::from_angle(step * i as f32) * radius)
                .collect(),
        )
    }

    /// Area, mass and rotational inertia about the centroid.
    pub fn mass_properties(&self, density: f32) -> MassProperties {
        match self {
            Shape::Circle { radius } => {
                let area = PI * radius * radius;
                let mass = density * area;
                MassProperties {
                    area,
                    mass,
                    inertia: 0.5 * mass * radius * radius,
                }
            }
            Shape::Polygon(ConvexPolygon { vertices }) => {
                // Triangle fan around the local origin (the centroid).
                let mut area = 0.0;
                let mut second_moment = 0.0;
                for (i, &p1) in vertices.iter().enumerate() {
                    let p2 = vertices[(i + 1) % vertices.len()];
                    let c = cross(p1, p2);
                    area += 0.5 * c;
                    let intx2 = p1.x * p1.x + p2.x * p1.x + p2.x * p2.x;
                    let inty2 = p1.y * p1.y + p2.y * p1.y + p2.y * p2.y;
                    second_moment += (c / 12.0) * (intx2 + inty2);
                }
                MassProperties {
                    area,
                    mass: density * area,
                    inertia: density * second_moment,
                }
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Shape::Circle { .. } => 0,
            Shape::Polygon(ConvexPolygon { vertices }) => vertices.len(),
        }
    }

    /// Writes world-space polygon vertices into `out`; circles produce none.
    pub fn write_transformed_vertices(&self, transform: &Transform, out: &mut Vec<Vec2>) {
        out.clear();
        if let Shape::Polygon(ConvexPolygon { vertices }) = self {
            let rotation = transform.rotation();
            out.extend(
                vertices
                    .iter()
                    .map(|v| transform.position + rotation.rotate(*v)),
            );
        }
    }

    pub fn transformed_vertices(&self, transform: &Transform) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(self.vertex_count());
        self.write_transformed_vertices(transform, &mut out);
        out
    }

    pub fn aabb(&self, transform: &Transform) -> Aabb {
        match self {
            Shape::Circle { radius } => {
                Aabb::from_center_half_extents(transform.position, Vec2::splat(*radius))
            }
            Shape::Polygon(ConvexPolygon { vertices }) => {
                let rotation = transform.rotation();
                Aabb::from_points(
                    vertices
                        .iter()
                        .map(|v| transform.position + rotation.rotate(*v)),
                )
                .unwrap_or_else(|| Aabb::point(transform.position))
            }
        }
    }

    /// Whether a world-space point lies inside the shape placed at `transform`.
    pub fn contains_point(&self, transform: &Transform, point: Vec2) -> bool {
        match self {
            Shape::Circle { radius } => transform.position.distance_squared(point) <= radius * radius,
            Shape::Polygon(ConvexPolygon { vertices }) => {
                let rotation = transform.rotation();
                let inverse = Vec2::new(rotation.x, -rotation.y);
                let local = inverse.rotate(point - transform.position);
                vertices.iter().enumerate().all(|(i, &p1)| {
                    let p2 = vertices[(i + 1) % vertices.len()];
                    cross(p2 - p1, local - p1) >= 0.0
                })
            }
        }
    }
}

fn signed_area_and_centroid(vertices: &[Vec2]) -> (f32, Vec2) {
    let mut area = 0.0;
    let mut centroid = Vec2::ZERO;
    for (i, &p1) in vertices.iter().enumerate() {
        let p2 = vertices[(i + 1) % vertices.len()];
        let triangle_area = 0.5 * cross(p1, p2);
        area += triangle_area;
        centroid += (p1 + p2) * (triangle_area / 3.0);
    }
    if area != 0.0 {
        centroid /= area;
    }
    (area, centroid)
}
