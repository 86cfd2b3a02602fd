use impulse2d::collision::grid::{GridBounds, GridEntity, SpatialHashGrid};
use impulse2d::*;

struct Probe {
    key: u32,
    aabb: Aabb,
    cached: Option<GridBounds>,
}

impl Probe {
    fn new(key: u32, center: Vec2, half: Vec2) -> Self {
        Self {
            key,
            aabb: Aabb::from_center_half_extents(center, half),
            cached: None,
        }
    }
}

impl GridEntity for Probe {
    type Key = u32;

    fn grid_key(&self) -> u32 {
        self.key
    }

    fn grid_aabb(&self) -> Aabb {
        self.aabb
    }

    fn cached_grid_bounds(&self) -> Option<GridBounds> {
        self.cached
    }

    fn store_grid_bounds(&mut self, bounds: Option<GridBounds>) {
        self.cached = bounds;
    }
}

/// Small deterministic generator so the sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

fn assert_membership_exact(grid: &SpatialHashGrid<u32>, probes: &[Probe]) {
    for probe in probes {
        let mut expected = grid.cells_overlapping(&probe.aabb);
        expected.sort_unstable();
        let actual = grid.cells_containing(probe.key);
        assert_eq!(actual, expected, "probe {} registered in wrong cells", probe.key);
    }
}

#[test]
fn membership_tracks_aabb_through_random_updates() {
    let mut grid = SpatialHashGrid::new(400.0, 300.0, 8, 6).unwrap();
    let mut rng = Lcg(0x5eed);

    let mut probes: Vec<Probe> = (0..24)
        .map(|key| {
            let center = Vec2::new(rng.range(-20.0, 420.0), rng.range(-20.0, 320.0));
            let half = Vec2::new(rng.range(1.0, 60.0), rng.range(1.0, 60.0));
            Probe::new(key, center, half)
        })
        .collect();
    for probe in &mut probes {
        grid.add_entity(probe);
    }
    assert_membership_exact(&grid, &probes);

    for round in 0..200 {
        let index = (rng.next_f32() * probes.len() as f32) as usize % probes.len();
        let delta = Vec2::new(rng.range(-80.0, 80.0), rng.range(-80.0, 80.0));
        let probe = &mut probes[index];
        probe.aabb = Aabb::new(probe.aabb.min + delta, probe.aabb.max + delta);
        grid.update_entity(probe);

        if round % 50 == 49 {
            let mut removed = probes.swap_remove(index);
            grid.remove_entity(&mut removed);
            assert!(grid.cells_containing(removed.key).is_empty());
        }

        assert_membership_exact(&grid, &probes);
    }
}

#[test]
fn active_cells_are_pruned_once_empty() {
    let mut grid = SpatialHashGrid::new(100.0, 100.0, 10, 10).unwrap();
    let mut probe = Probe::new(7, Vec2::new(15.0, 15.0), Vec2::splat(2.0));
    grid.add_entity(&mut probe);
    let first = grid.cell_key(1, 1);
    assert_eq!(grid.active_cell_keys(), &[first]);

    probe.aabb = Aabb::from_center_half_extents(Vec2::new(85.0, 55.0), Vec2::splat(2.0));
    assert!(grid.update_entity(&mut probe));
    let second = grid.cell_key(8, 5);
    assert_eq!(grid.active_cell_keys(), &[second]);

    // Same cell range: nothing to do.
    probe.aabb = Aabb::from_center_half_extents(Vec2::new(86.0, 56.0), Vec2::splat(2.0));
    assert!(!grid.update_entity(&mut probe));

    grid.remove_entity(&mut probe);
    assert!(grid.active_cell_keys().is_empty());
}

#[test]
fn out_of_field_entities_clamp_to_border_cells() {
    let mut grid = SpatialHashGrid::new(100.0, 100.0, 4, 4).unwrap();
    let mut probe = Probe::new(1, Vec2::new(-500.0, 250.0), Vec2::splat(1.0));
    grid.add_entity(&mut probe);
    assert_eq!(grid.cells_containing(1), vec![grid.cell_key(0, 3)]);
}

#[test]
fn world_keeps_bodies_registered_where_they_are() {
    let settings = WorldSettings::default()
        .with_gravity(0.0, 50.0)
        .with_field(256.0, 256.0, 8, 8);
    let mut world = PhysicsWorld::new(settings).unwrap();
    world.initialize().unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            world.add_body(
                RigidBody::dynamic(Shape::regular_polygon(6.0, 5).unwrap())
                    .with_position(20.0 + i as f32 * 40.0, 10.0)
                    .with_velocity(15.0, 0.0),
            )
        })
        .collect();

    for _ in 0..30 {
        world.step_world(0.1, 2);
        for &handle in &handles {
            let body = world.body(handle).unwrap();
            let mut expected = world.grid().cells_overlapping(&body.aabb());
            expected.sort_unstable();
            assert_eq!(world.grid().cells_containing(handle), expected);
        }
    }
}
