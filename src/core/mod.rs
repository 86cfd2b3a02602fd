//! Core types describing bodies, their geometry and material data.

pub mod filter;
pub mod rigidbody;
pub mod shape;
pub mod types;

pub use filter::CollisionFilter;
pub use rigidbody::RigidBody;
pub use shape::{ConvexPolygon, Shape};
pub use types::{Aabb, MassProperties, Material, PairMaterial, Transform};
