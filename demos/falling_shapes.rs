use std::sync::Arc;

use impulse2d::*;

/// Counts contacts the resolver actually handled.
struct ImpactCounter {
    impacts: Arc<parking_lot::Mutex<u32>>,
}

impl CollisionCallback for ImpactCounter {
    fn post_solve(&mut self, manifold: &mut ContactManifold) {
        if manifold.impulse.length() > 50.0 {
            *self.impacts.lock() += 1;
        }
    }
}

fn main() -> Result<()> {
    let settings = WorldSettings::default()
        .with_gravity(0.0, 98.0)
        .with_field(640.0, 480.0, 10, 8);
    let mut engine = PhysicsEngine::new(settings, 1.0 / 60.0)?.with_iterations(4);

    let stats = Arc::new(StatsRegistry::new());
    let impacts = Arc::new(parking_lot::Mutex::new(0));
    {
        let world = engine.world_mut();
        world.set_stat_sink(Some(stats.clone()));
        world.set_contact_resolver(Some(Box::new(FrictionResolver)));
        world.add_collision_callback(ImpactCounter {
            impacts: Arc::clone(&impacts),
        });
    }

    engine.add_body(RigidBody::fixed(Shape::rectangle(600.0, 20.0)?).with_position(320.0, 460.0));
    engine.add_body(
        RigidBody::fixed(Shape::rectangle(200.0, 10.0)?)
            .with_position(220.0, 300.0)
            .with_angle(0.3),
    );

    let mut tracked = Vec::new();
    for i in 0..24 {
        let x = 120.0 + (i % 8) as f32 * 50.0;
        let y = 40.0 + (i / 8) as f32 * 40.0;
        let (shape, material) = match i % 3 {
            0 => (Shape::circle(12.0)?, Material::rubber()),
            1 => (Shape::rectangle(22.0, 22.0)?, Material::steel()),
            _ => (Shape::regular_polygon(13.0, 5)?, Material::ice()),
        };
        tracked.push(engine.add_body(
            RigidBody::dynamic(shape)
                .with_material(material)
                .with_position(x, y)
                .with_damping(Vec2::splat(0.001), 0.5),
        ));
    }

    for _ in 0..180 {
        engine.step(1.0 / 60.0);
    }

    println!("Simulated {} bodies for 3 seconds", engine.world().body_count());
    for handle in tracked.iter().take(4) {
        if let Some(body) = engine.body(*handle) {
            println!(
                "  body {:?}: position {:?}, angle {:.2}",
                handle,
                body.position(),
                body.angle()
            );
        }
    }
    println!("  hard impacts: {}", impacts.lock());
    println!("  active cells: {:?}", stats.get("physics.active_cells"));
    println!("  last step: {:?}", engine.world().last_profile().total_time);
    Ok(())
}
