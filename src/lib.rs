//! impulse2d – a small 2D rigid-body physics core.
//!
//! Bodies live in a [`PhysicsWorld`] that indexes them in a uniform spatial
//! hash grid, tests candidate pairs with the separating axis theorem, pushes
//! overlapping bodies apart and hands each contact to a pluggable
//! [`CollisionResolver`]. Collision observers can inspect or veto contacts.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    contact::ContactManifold,
    grid::{GridEntity, SpatialHashGrid},
};
pub use config::WorldSettings;
pub use crate::core::{
    filter::CollisionFilter,
    rigidbody::RigidBody,
    shape::{ConvexPolygon, Shape},
    types::{Aabb, MassProperties, Material, Transform},
};
pub use dynamics::{
    callbacks::{CallbackId, CollisionCallback},
    resolver::{CollisionResolver, FrictionResolver, RotationResolver, SimpleResolver},
};
pub use error::{PhysicsError, Result};
pub use utils::{
    allocator::BodyHandle,
    profiling::StepProfile,
    stats::{DebugStatSink, StatsRegistry},
};
pub use world::{PhysicsWorld, WorldState};

/// Fixed-timestep driver that owns an initialized [`PhysicsWorld`].
///
/// Frame times are accumulated and the world is stepped in whole
/// `time_step` increments, each split into `iterations` sub-steps.
pub struct PhysicsEngine {
    world: PhysicsWorld,
    time_step: f32,
    iterations: u32,
    accumulator: f32,
}

impl PhysicsEngine {
    /// Creates and initializes a world using `settings`.
    pub fn new(settings: WorldSettings, time_step: f32) -> Result<Self> {
        if !(time_step > 0.0 && time_step.is_finite()) {
            return Err(PhysicsError::InvalidSettings(format!(
                "time step must be positive, got {time_step}"
            )));
        }
        let mut world = PhysicsWorld::new(settings)?;
        world.initialize()?;
        Ok(Self {
            world,
            time_step,
            iterations: config::DEFAULT_ITERATIONS,
            accumulator: 0.0,
        })
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Adds frame time and runs as many fixed steps as fit. Returns the
    /// number of steps taken.
    pub fn step(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= self.time_step {
            self.accumulator -= self.time_step;
            self.world.step_world(self.time_step, self.iterations);
            steps += 1;
        }
        steps
    }

    /// Leftover frame time as a fraction of one step, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.time_step
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.world.add_body(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.world.body(handle)
    }
}
