use glam::Vec2;

use super::{
    filter::CollisionFilter,
    shape::Shape,
    types::{Aabb, MassProperties, Material, Transform},
};
use crate::{
    collision::grid::{GridBounds, GridEntity},
    utils::{
        allocator::BodyHandle,
        math::{cross, cross_scalar},
    },
};

/// Core rigid body description storing kinematic state and properties.
///
/// Whether a body is static is fixed at construction; a static body always has
/// zero inverse mass and inverse inertia.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub id: BodyHandle,
    pub transform: Transform,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    /// Force accumulated since the last integration.
    pub force: Vec2,
    pub torque: f32,
    /// Fraction of linear velocity removed per step, per axis.
    pub linear_damping: Vec2,
    /// Exponential decay rate of angular velocity.
    pub angular_damping: f32,
    pub material: Material,
    pub filter: CollisionFilter,
    pub is_sensor: bool,
    pub is_active: bool,
    pub user_data: u64,
    shape: Option<Shape>,
    mass_properties: MassProperties,
    inverse_mass: f32,
    inverse_inertia: f32,
    is_static: bool,
    pub(crate) grid_bounds: Option<GridBounds>,
    pub(crate) update_counter: u64,
}

impl RigidBody {
    pub fn new(shape: Option<Shape>, material: Material, is_static: bool) -> Self {
        let mut body = Self {
            id: BodyHandle::NULL,
            transform: Transform::default(),
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            linear_damping: Vec2::ZERO,
            angular_damping: 0.0,
            material,
            filter: CollisionFilter::default(),
            is_sensor: false,
            is_active: true,
            user_data: 0,
            shape: None,
            mass_properties: MassProperties::default(),
            inverse_mass: 0.0,
            inverse_inertia: 0.0,
            is_static,
            grid_bounds: None,
            update_counter: 0,
        };
        body.set_shape(shape);
        body
    }

    pub fn dynamic(shape: Shape) -> Self {
        Self::new(Some(shape), Material::default(), false)
    }

    pub fn fixed(shape: Shape) -> Self {
        Self::new(Some(shape), Material::default(), true)
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.transform.position = Vec2::new(x, y);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.transform.angle = angle;
        self
    }

    pub fn with_velocity(mut self, x: f32, y: f32) -> Self {
        self.linear_velocity = Vec2::new(x, y);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self.recompute_mass();
        self
    }

    pub fn with_filter(mut self, category_bits: u16, mask_bits: u16) -> Self {
        self.filter = CollisionFilter::new(category_bits, mask_bits);
        self
    }

    pub fn with_sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    pub fn with_damping(mut self, linear: Vec2, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// Assigns a new shape and recomputes mass properties from it.
    pub fn set_shape(&mut self, shape: Option<Shape>) {
        self.shape = shape;
        self.recompute_mass();
    }

    fn recompute_mass(&mut self) {
        self.mass_properties = self
            .shape
            .as_ref()
            .map(|shape| shape.mass_properties(self.material.density))
            .unwrap_or_default();

        if self.is_static {
            self.inverse_mass = 0.0;
            self.inverse_inertia = 0.0;
            return;
        }
        self.inverse_mass = inverse_or_zero(self.mass_properties.mass);
        self.inverse_inertia = inverse_or_zero(self.mass_properties.inertia);
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn mass(&self) -> f32 {
        self.mass_properties.mass
    }

    pub fn inertia(&self) -> f32 {
        self.mass_properties.inertia
    }

    pub fn mass_properties(&self) -> MassProperties {
        self.mass_properties
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn inverse_inertia(&self) -> f32 {
        self.inverse_inertia
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn angle(&self) -> f32 {
        self.transform.angle
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.transform.position += delta;
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.transform.angle = angle;
    }

    /// Number of times the world has integrated this body.
    pub fn update_counter(&self) -> u64 {
        self.update_counter
    }

    pub fn grid_bounds(&self) -> Option<GridBounds> {
        self.grid_bounds
    }

    /// World-space bounds, recomputed from the shape on every call.
    pub fn aabb(&self) -> Aabb {
        match &self.shape {
            Some(shape) => shape.aabb(&self.transform),
            None => Aabb::point(self.transform.position),
        }
    }

    /// Semi-implicit Euler step. Forces are scaled by the inverse mass here,
    /// not when they are added.
    pub fn step(&mut self, dt: f32, gravity: Vec2) {
        if self.is_static || !self.is_active {
            return;
        }

        self.linear_velocity += (self.force * self.inverse_mass + gravity) * dt;
        self.angular_velocity += self.torque * self.inverse_inertia * dt;

        self.transform.position += self.linear_velocity * dt;
        self.transform.angle += self.angular_velocity * dt;

        let keep = (Vec2::ONE - self.linear_damping).clamp(Vec2::ZERO, Vec2::ONE);
        self.linear_velocity *= keep;
        self.angular_velocity *= (-self.angular_damping * dt).exp();

        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Adds a force applied at a world-space point, producing torque about the centre.
    pub fn add_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force += force;
        self.torque += cross(point - self.transform.position, force);
    }

    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    pub fn add_impulse(&mut self, impulse: Vec2) {
        if self.is_static {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
    }

    pub fn add_impulse_at_point(&mut self, impulse: Vec2, point: Vec2) {
        if self.is_static {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        self.angular_velocity += cross(point - self.transform.position, impulse) * self.inverse_inertia;
    }

    pub fn add_angular_impulse(&mut self, impulse: f32) {
        if self.is_static {
            return;
        }
        self.angular_velocity += impulse * self.inverse_inertia;
    }

    /// Velocity of the body's material point at `point` (world space).
    pub fn velocity_at_point(&self, point: Vec2) -> Vec2 {
        self.linear_velocity + cross_scalar(self.angular_velocity, point - self.transform.position)
    }
}

impl GridEntity for RigidBody {
    type Key = BodyHandle;

    fn grid_key(&self) -> BodyHandle {
        self.id
    }

    fn grid_aabb(&self) -> Aabb {
        self.aabb()
    }

    fn cached_grid_bounds(&self) -> Option<GridBounds> {
        self.grid_bounds
    }

    fn store_grid_bounds(&mut self, bounds: Option<GridBounds>) {
        self.grid_bounds = bounds;
    }
}

/// Zero stands for infinite mass: only a zero or non-finite value maps there.
fn inverse_or_zero(value: f32) -> f32 {
    let inverse = value.recip();
    if inverse.is_finite() {
        inverse
    } else {
        0.0
    }
}
