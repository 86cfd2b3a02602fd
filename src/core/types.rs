use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DENSITY;

/// Position and rotation (radians) of a body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub angle: f32,
}

impl Transform {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            angle,
        }
    }

    /// Unit vector `(cos θ, sin θ)` used to rotate local points.
    pub fn rotation(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Maps a point from shape space into world space.
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.position + self.rotation().rotate(local)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds of a point cloud; `None` when the iterator is empty.
    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::point(first), |aabb, p| Self {
            min: aabb.min.min(p),
            max: aabb.max.max(p),
        }))
    }

    /// Closed-interval overlap test: touching boxes count as overlapping.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn extents(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Mass data derived from a shape and a density.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MassProperties {
    pub area: f32,
    pub mass: f32,
    pub inertia: f32,
}

/// Surface and bulk coefficients of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub density: f32,
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            restitution: 0.2,
            static_friction: 0.6,
            dynamic_friction: 0.4,
        }
    }
}

impl Material {
    pub fn new(density: f32, restitution: f32) -> Self {
        Self {
            density,
            restitution,
            ..Self::default()
        }
    }

    pub fn rubber() -> Self {
        Self {
            density: 1.4,
            restitution: 0.8,
            static_friction: 1.2,
            dynamic_friction: 1.0,
        }
    }

    pub fn steel() -> Self {
        Self {
            density: 7.8,
            restitution: 0.4,
            static_friction: 0.58,
            dynamic_friction: 0.44,
        }
    }

    pub fn ice() -> Self {
        Self {
            density: 0.9,
            restitution: 0.05,
            static_friction: 0.05,
            dynamic_friction: 0.03,
        }
    }

    pub fn with_friction(mut self, static_friction: f32, dynamic_friction: f32) -> Self {
        self.static_friction = static_friction;
        self.dynamic_friction = dynamic_friction;
        self
    }

    /// Coefficients used when two materials touch: the least bouncy surface
    /// wins, friction is averaged.
    pub fn combine(&self, other: &Material) -> PairMaterial {
        PairMaterial {
            restitution: self.restitution.min(other.restitution),
            static_friction: 0.5 * (self.static_friction + other.static_friction),
            dynamic_friction: 0.5 * (self.dynamic_friction + other.dynamic_friction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMaterial {
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}
