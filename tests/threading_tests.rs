use impulse2d::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

#[test]
fn test_physics_world_is_sync_and_send() {
    fn assert_sync_send<T: Sync + Send>() {}
    assert_sync_send::<PhysicsWorld>();
    assert_sync_send::<PhysicsEngine>();
    assert_sync_send::<StatsRegistry>();
}

#[test]
fn test_shared_physics_world_across_threads() {
    let mut world = PhysicsWorld::new(WorldSettings::default()).unwrap();
    world.initialize().unwrap();
    world.set_contact_resolver(Some(Box::new(FrictionResolver)));
    let ball = world.add_body(
        RigidBody::dynamic(Shape::circle(4.0).unwrap()).with_position(200.0, 100.0),
    );

    let stats = Arc::new(StatsRegistry::new());
    world.set_stat_sink(Some(stats.clone()));

    let world = Arc::new(Mutex::new(world));
    let mut handles = vec![];
    for _ in 0..4 {
        let world_clone = Arc::clone(&world);
        handles.push(thread::spawn(move || {
            world_clone.lock().step_world(1.0 / 60.0, 4);
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let world = world.lock();
    assert_eq!(world.body(ball).unwrap().update_counter(), 16);
    assert_eq!(stats.int("physics.bodies"), Some(1));
}
