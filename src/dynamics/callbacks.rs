use crate::collision::contact::ContactManifold;

/// Handle returned by [`PhysicsWorld::add_collision_callback`](crate::world::PhysicsWorld::add_collision_callback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub(crate) u32);

/// Observer notified for every narrow-phase hit that passes filtering.
///
/// Registered callbacks are invoked in registration order. The manifold is the
/// world's shared instance and is reset before the next pair.
pub trait CollisionCallback: Send + Sync {
    /// Runs before separation. Clearing `manifold.enable_resolve_contact`
    /// vetoes separation and resolution for this pair.
    fn pre_contact(&mut self, _manifold: &mut ContactManifold) {}

    /// Runs after separation, once contact points are filled.
    fn post_contact(&mut self, _manifold: &mut ContactManifold) {}

    /// Runs before the resolver, only when one is configured.
    fn pre_solve(&mut self, _manifold: &mut ContactManifold) {}

    /// Runs after the resolver; `manifold.impulse` holds the applied impulse.
    fn post_solve(&mut self, _manifold: &mut ContactManifold) {}
}
