use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use log::{debug, info, warn};

use crate::{
    collision::{
        contact::ContactManifold,
        grid::{CellKey, GridEntity, SpatialHashGrid},
        pairs::{PairIndex, PairPool},
        sat::NarrowPhase,
    },
    config::WorldSettings,
    core::{rigidbody::RigidBody, types::Aabb},
    dynamics::{
        callbacks::{CallbackId, CollisionCallback},
        resolver::CollisionResolver,
    },
    error::Result,
    utils::{
        allocator::{Arena, BodyHandle},
        logging::{warn_if_frame_budget_exceeded, ScopedTimer},
        profiling::StepProfile,
        stats::{tags, DebugStatSink},
    },
};

/// Lifecycle of a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldState {
    /// Not initialized, or unloaded; stepping is a no-op.
    Unloaded,
    /// Ready to step; bodies may be added and removed.
    Idle,
    /// Bodies are being integrated and re-indexed; removal is refused.
    Integrating,
}

/// Central simulation container: owns the bodies, the broad-phase grid, the
/// pair pool, the shared manifold, the resolver and the collision observers.
pub struct PhysicsWorld {
    settings: WorldSettings,
    state: WorldState,
    bodies: Arena<RigidBody>,
    order: Vec<BodyHandle>,
    grid: SpatialHashGrid<BodyHandle>,
    pool: PairPool,
    working: Vec<PairIndex>,
    manifold: ContactManifold,
    narrow_phase: NarrowPhase,
    resolver: Option<Box<dyn CollisionResolver>>,
    callbacks: Vec<(CallbackId, Box<dyn CollisionCallback>)>,
    next_callback_id: u32,
    stats: Option<Arc<dyn DebugStatSink>>,
    update_counter: u64,
    scratch_cells: Vec<CellKey>,
    scratch_members: Vec<BodyHandle>,
    seen_pairs: HashSet<(BodyHandle, BodyHandle)>,
    profile: StepProfile,
}

impl PhysicsWorld {
    /// Builds an unloaded world. Call [`initialize`](Self::initialize) before stepping.
    pub fn new(settings: WorldSettings) -> Result<Self> {
        settings.validate()?;
        let grid = SpatialHashGrid::new(
            settings.field_width,
            settings.field_height,
            settings.cells_wide,
            settings.cells_high,
        )?;

        Ok(Self {
            settings,
            state: WorldState::Unloaded,
            bodies: Arena::new(),
            order: Vec::new(),
            grid,
            pool: PairPool::new(),
            working: Vec::new(),
            manifold: ContactManifold::new(),
            narrow_phase: NarrowPhase::new(),
            resolver: None,
            callbacks: Vec::new(),
            next_callback_id: 0,
            stats: None,
            update_counter: 0,
            scratch_cells: Vec::new(),
            scratch_members: Vec::new(),
            seen_pairs: HashSet::new(),
            profile: StepProfile::default(),
        })
    }

    /// Rebuilds the grid from the current settings, registers every stored
    /// body in it and publishes the debug stat tags.
    pub fn initialize(&mut self) -> Result<()> {
        self.settings.validate()?;
        self.grid = SpatialHashGrid::new(
            self.settings.field_width,
            self.settings.field_height,
            self.settings.cells_wide,
            self.settings.cells_high,
        )?;
        self.pool.clear();
        self.working.clear();

        for (_, body) in self.bodies.iter_mut() {
            body.store_grid_bounds(None);
            self.grid.add_entity(body);
        }

        if let Some(stats) = &self.stats {
            for tag in tags::ALL {
                stats.set_int(tag, 0);
            }
            stats.set_caption(tags::RESOLVER, self.resolver_name());
        }

        self.state = WorldState::Idle;
        info!(
            "Physics world initialized: {} bodies, {}x{} grid over {}x{}",
            self.bodies.len(),
            self.settings.cells_wide,
            self.settings.cells_high,
            self.settings.field_width,
            self.settings.field_height
        );
        Ok(())
    }

    /// Empties the grid and pair pool and withdraws the stat tags. Bodies are
    /// kept and re-registered by the next [`initialize`](Self::initialize).
    pub fn unload(&mut self) {
        self.grid.clear();
        self.pool.clear();
        self.working.clear();
        for (_, body) in self.bodies.iter_mut() {
            body.store_grid_bounds(None);
        }
        if let Some(stats) = &self.stats {
            for tag in tags::ALL {
                stats.remove(tag);
            }
        }
        self.state = WorldState::Unloaded;
        debug!("Physics world unloaded");
    }

    pub fn state(&self) -> WorldState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != WorldState::Unloaded
    }

    pub fn bodies_locked(&self) -> bool {
        self.state == WorldState::Integrating
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn gravity(&self) -> Vec2 {
        self.settings.gravity
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.settings.gravity = Vec2::new(x, y);
    }

    /// Swaps the resolver; `None` keeps detection and separation but skips
    /// impulse resolution and the solve callbacks.
    pub fn set_contact_resolver(&mut self, resolver: Option<Box<dyn CollisionResolver>>) {
        self.resolver = resolver;
        if let (Some(stats), true) = (&self.stats, self.is_initialized()) {
            stats.set_caption(tags::RESOLVER, self.resolver_name());
        }
    }

    pub fn contact_resolver(&self) -> Option<&dyn CollisionResolver> {
        self.resolver.as_deref()
    }

    pub fn set_stat_sink(&mut self, sink: Option<Arc<dyn DebugStatSink>>) {
        if let Some(previous) = &self.stats {
            for tag in tags::ALL {
                previous.remove(tag);
            }
        }
        self.stats = sink;
    }

    pub fn add_collision_callback<C>(&mut self, callback: C) -> CallbackId
    where
        C: CollisionCallback + 'static,
    {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub fn remove_collision_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = self.bodies.insert(body);
        if let Some(stored) = self.bodies.get_mut(handle) {
            stored.id = handle;
            if self.state != WorldState::Unloaded {
                self.grid.add_entity(stored);
            }
        }
        self.order.push(handle);
        handle
    }

    /// Removes a body from the world. Refused while bodies are locked; the
    /// caller should retry on a later tick.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies_locked() {
            warn!("Cannot remove body {handle:?} while the world is integrating");
            return false;
        }

        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        self.grid.remove_entity(body);
        self.bodies.remove(handle);
        self.order.retain(|existing| *existing != handle);
        true
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Body at position `index` in insertion order.
    pub fn body_by_index(&self, index: usize) -> Option<&RigidBody> {
        self.order.get(index).and_then(|handle| self.bodies.get(*handle))
    }

    /// All bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> + '_ {
        self.order.iter().filter_map(|handle| self.bodies.get(*handle))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn grid(&self) -> &SpatialHashGrid<BodyHandle> {
        &self.grid
    }

    pub fn pair_pool(&self) -> &PairPool {
        &self.pool
    }

    pub fn last_profile(&self) -> &StepProfile {
        &self.profile
    }

    /// Bodies whose AABB overlaps `aabb`.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        self.grid.query_aabb(aabb, &mut found);
        found.retain(|handle| {
            self.bodies
                .get(*handle)
                .is_some_and(|body| body.aabb().overlaps(aabb))
        });
        found
    }

    /// Bodies whose shape contains `point`.
    pub fn query_point(&self, point: Vec2) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        self.grid.query_aabb(&Aabb::point(point), &mut found);
        found.retain(|handle| {
            self.bodies.get(*handle).is_some_and(|body| {
                body.shape()
                    .is_some_and(|shape| shape.contains_point(&body.transform, point))
            })
        });
        found
    }

    /// Advances the simulation by `time`, split into `total_iterations` equal
    /// sub-steps.
    pub fn step_world(&mut self, time: f32, total_iterations: u32) {
        if self.state == WorldState::Unloaded {
            warn!("step_world called before the physics world was initialized");
            return;
        }
        if total_iterations == 0 {
            warn!("step_world called with zero iterations");
            return;
        }

        let step_start = Instant::now();
        let dt = time / total_iterations as f32;
        self.profile.reset();

        let mut integrate_time = Duration::ZERO;
        let mut broad_phase_time = Duration::ZERO;
        let mut narrow_phase_time = Duration::ZERO;

        for _ in 0..total_iterations {
            self.state = WorldState::Integrating;
            self.working.clear();
            {
                let _timer = ScopedTimer::accumulate("physics::integrate", &mut integrate_time);
                self.integrate_bodies(dt);
            }
            self.state = WorldState::Idle;

            {
                let _timer = ScopedTimer::accumulate("physics::broad_phase", &mut broad_phase_time);
                self.broad_phase();
            }
            self.profile.candidate_pairs += self.working.len();

            {
                let _timer = ScopedTimer::accumulate("physics::narrow_phase", &mut narrow_phase_time);
                self.narrow_phase();
            }
            self.profile.sub_steps += 1;
        }

        self.profile.integrate_time = integrate_time;
        self.profile.broad_phase_time = broad_phase_time;
        self.profile.narrow_phase_time = narrow_phase_time;
        self.profile.total_time = step_start.elapsed();
        self.profile.body_count = self.bodies.len();
        self.profile.active_cells = self.grid.active_cell_keys().len();
        self.profile.pool_allocated = self.pool.allocated();

        self.publish_stats();
        self.profile.report();
        if let Some(budget) = self.settings.frame_budget_ms {
            warn_if_frame_budget_exceeded(self.profile.total_time, budget);
        }
    }

    /// Integrates every body listed in an active cell once and re-indexes it.
    fn integrate_bodies(&mut self, dt: f32) {
        self.update_counter += 1;
        let counter = self.update_counter;
        let gravity = self.settings.gravity;

        self.scratch_cells.clear();
        self.scratch_cells.extend_from_slice(self.grid.active_cell_keys());

        for &cell in &self.scratch_cells {
            self.scratch_members.clear();
            self.scratch_members.extend_from_slice(self.grid.cell(cell));

            for &handle in self.scratch_members.iter().rev() {
                let Some(body) = self.bodies.get_mut(handle) else {
                    continue;
                };
                if body.update_counter == counter {
                    continue;
                }
                body.update_counter = counter;
                body.step(dt, gravity);
                self.grid.update_entity(body);
            }
        }
    }

    /// Collects candidate pairs per active cell into the working list.
    fn broad_phase(&mut self) {
        self.seen_pairs.clear();
        self.scratch_cells.clear();
        self.scratch_cells.extend_from_slice(self.grid.active_cell_keys());

        for &cell in &self.scratch_cells {
            let members = self.grid.cell(cell);
            for (i, &handle_a) in members.iter().enumerate() {
                for &handle_b in &members[i + 1..] {
                    let (Some(a), Some(b)) = (self.bodies.get(handle_a), self.bodies.get(handle_b))
                    else {
                        continue;
                    };
                    if a.is_static() && b.is_static() {
                        continue;
                    }
                    if !a.is_active || !b.is_active {
                        continue;
                    }
                    if !a.aabb().overlaps(&b.aabb()) {
                        continue;
                    }
                    if !a.filter.should_collide(&b.filter) {
                        continue;
                    }
                    if self.settings.dedupe_pairs {
                        let key = (handle_a.min(handle_b), handle_a.max(handle_b));
                        if !self.seen_pairs.insert(key) {
                            continue;
                        }
                    }
                    let index = self.pool.borrow(handle_a, handle_b);
                    self.working.push(index);
                }
            }
        }
    }

    fn narrow_phase(&mut self) {
        for i in 0..self.working.len() {
            let index = self.working[i];
            self.process_pair(index);
            self.pool.give_back(index);
        }
    }

    fn process_pair(&mut self, index: PairIndex) {
        let pair = self.pool.get(index);
        self.manifold.reset(pair.body_a, pair.body_b);

        let Some((a, b)) = self.bodies.get2_mut(pair.body_a, pair.body_b) else {
            return;
        };
        if !self.narrow_phase.collide(a, b, &mut self.manifold) {
            return;
        }
        if !a.filter.should_collide(&b.filter) {
            return;
        }
        self.profile.contacts += 1;

        if a.is_sensor || b.is_sensor {
            self.manifold.enable_resolve_contact = false;
        }
        for (_, callback) in &mut self.callbacks {
            callback.pre_contact(&mut self.manifold);
        }
        if !self.manifold.enable_resolve_contact {
            self.profile.vetoed += 1;
            return;
        }

        separate(a, b, self.manifold.mtv());
        self.narrow_phase.find_contact_points(a, b, &mut self.manifold);
        for (_, callback) in &mut self.callbacks {
            callback.post_contact(&mut self.manifold);
        }

        let Some(resolver) = &self.resolver else {
            return;
        };
        for (_, callback) in &mut self.callbacks {
            callback.pre_solve(&mut self.manifold);
        }
        resolver.resolve_collisions(&mut self.manifold, a, b);
        for (_, callback) in &mut self.callbacks {
            callback.post_solve(&mut self.manifold);
        }
        self.profile.resolved += 1;
    }

    fn resolver_name(&self) -> &'static str {
        self.resolver.as_ref().map_or("none", |resolver| resolver.name())
    }

    fn publish_stats(&self) {
        let Some(stats) = &self.stats else {
            return;
        };
        stats.set_int(tags::BODIES, self.profile.body_count as i64);
        stats.set_int(tags::ACTIVE_CELLS, self.profile.active_cells as i64);
        stats.set_int(tags::PAIRS, self.profile.candidate_pairs as i64);
        stats.set_int(tags::CONTACTS, self.profile.contacts as i64);
        stats.set_int(tags::POOL, self.profile.pool_allocated as i64);
        stats.set_float(tags::STEP_MS, self.profile.total_time.as_secs_f32() * 1000.0);
        stats.set_caption(tags::RESOLVER, self.resolver_name());
    }
}

/// Pushes the bodies apart along `mtv` (which points from A to B). A static
/// partner stays put; otherwise each body takes half.
fn separate(a: &mut RigidBody, b: &mut RigidBody, mtv: Vec2) {
    match (a.is_static(), b.is_static()) {
        (true, true) => {}
        (true, false) => b.translate(mtv),
        (false, true) => a.translate(-mtv),
        (false, false) => {
            a.translate(-mtv * 0.5);
            b.translate(mtv * 0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{filter::CollisionFilter, shape::Shape};

    fn world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(WorldSettings::default().with_gravity(0.0, 0.0)).unwrap();
        world.initialize().unwrap();
        world
    }

    #[test]
    fn removal_is_refused_while_integrating() {
        let mut world = world();
        let handle = world.add_body(RigidBody::dynamic(Shape::circle(1.0).unwrap()));

        world.state = WorldState::Integrating;
        assert!(world.bodies_locked());
        assert!(!world.remove_body(handle));
        assert!(world.body(handle).is_some());

        world.state = WorldState::Idle;
        assert!(world.remove_body(handle));
        assert!(world.body(handle).is_none());
        assert!(world.grid().cells_containing(handle).is_empty());
    }

    #[test]
    fn pairs_filtered_after_collection_are_not_counted() {
        let mut world = world();
        let ball = || RigidBody::dynamic(Shape::circle(1.0).unwrap());
        let a = world.add_body(ball().with_position(5.0, 5.0));
        let b = world.add_body(ball().with_position(6.5, 5.0));

        world.broad_phase();
        assert_eq!(world.working.len(), 1);
        world.body_mut(b).unwrap().filter = CollisionFilter::new(0x0002, 0);
        world.narrow_phase();

        assert_eq!(world.last_profile().contacts, 0);
        assert_eq!(world.body(a).unwrap().position(), Vec2::new(5.0, 5.0));
        assert_eq!(world.body(b).unwrap().position(), Vec2::new(6.5, 5.0));
    }

    #[test]
    fn separation_leaves_static_partner_in_place() {
        let mut ground = RigidBody::fixed(Shape::rectangle(4.0, 1.0).unwrap());
        let mut crate_box = RigidBody::dynamic(Shape::rectangle(1.0, 1.0).unwrap());
        separate(&mut ground, &mut crate_box, Vec2::new(0.0, -0.25));
        assert_eq!(ground.position(), Vec2::ZERO);
        assert_eq!(crate_box.position(), Vec2::new(0.0, -0.25));

        let mut left = RigidBody::dynamic(Shape::circle(1.0).unwrap());
        let mut right = RigidBody::dynamic(Shape::circle(1.0).unwrap()).with_position(1.5, 0.0);
        separate(&mut left, &mut right, Vec2::new(0.5, 0.0));
        assert_eq!(left.position(), Vec2::new(-0.25, 0.0));
        assert_eq!(right.position(), Vec2::new(1.75, 0.0));
    }
}
