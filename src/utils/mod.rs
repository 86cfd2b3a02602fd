//! Utility helpers: math extensions, the body arena, logging, profiling and debug stats.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;
pub mod stats;

pub use allocator::{Arena, BodyHandle};
pub use math::*;
pub use profiling::StepProfile;
pub use stats::{DebugStatSink, StatValue, StatsRegistry};
