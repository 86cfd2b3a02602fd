//! Collision detection: spatial hash broad phase, SAT narrow phase, manifolds and pair pooling.

pub mod contact;
pub mod grid;
pub mod pairs;
pub mod sat;

pub use contact::ContactManifold;
pub use grid::{CellKey, GridBounds, GridEntity, SpatialHashGrid};
pub use pairs::{CollisionPair, PairIndex, PairPool};
pub use sat::NarrowPhase;
