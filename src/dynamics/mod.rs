//! Contact response: impulse resolvers and collision observers.

pub mod callbacks;
pub mod resolver;

pub use callbacks::{CallbackId, CollisionCallback};
pub use resolver::{CollisionResolver, FrictionResolver, RotationResolver, SimpleResolver};
