//! Global configuration constants and world settings.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Default gravity vector applied in the physics world (screen space, Y-down).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, 9.81];

/// Default width and height of the region covered by the broad-phase grid.
pub const DEFAULT_FIELD_WIDTH: f32 = 1024.0;
pub const DEFAULT_FIELD_HEIGHT: f32 = 1024.0;

/// Default number of grid cells along each axis.
pub const DEFAULT_CELLS_WIDE: u32 = 16;
pub const DEFAULT_CELLS_HIGH: u32 = 16;

/// Upper bound on `cells_wide * cells_high`; the grid allocates every cell up front.
pub const MAX_GRID_CELLS: u64 = 1 << 22;

/// Default number of sub-steps per `step_world` call.
pub const DEFAULT_ITERATIONS: u32 = 4;

/// Default density used when a body does not specify a material.
pub const DEFAULT_DENSITY: f32 = 1.0;

/// Default category/mask bits: category 1, collides with everything.
pub const DEFAULT_CATEGORY_BITS: u16 = 0x0001;
pub const DEFAULT_MASK_BITS: u16 = 0xFFFF;

/// Tunables read once when a world is built or re-initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub gravity: Vec2,
    pub field_width: f32,
    pub field_height: f32,
    pub cells_wide: u32,
    pub cells_high: u32,
    /// Enumerate each body pair at most once per sub-step even when both
    /// bodies share several active cells. Off by default, which keeps the
    /// historical behaviour of resolving such pairs once per shared cell.
    pub dedupe_pairs: bool,
    /// Warn when a single `step_world` call takes longer than this.
    pub frame_budget_ms: Option<f32>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            field_width: DEFAULT_FIELD_WIDTH,
            field_height: DEFAULT_FIELD_HEIGHT,
            cells_wide: DEFAULT_CELLS_WIDE,
            cells_high: DEFAULT_CELLS_HIGH,
            dedupe_pairs: false,
            frame_budget_ms: None,
        }
    }
}

impl WorldSettings {
    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = Vec2::new(x, y);
        self
    }

    pub fn with_field(mut self, width: f32, height: f32, cells_wide: u32, cells_high: u32) -> Self {
        self.field_width = width;
        self.field_height = height;
        self.cells_wide = cells_wide;
        self.cells_high = cells_high;
        self
    }

    pub fn with_dedupe_pairs(mut self, enabled: bool) -> Self {
        self.dedupe_pairs = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.field_width > 0.0 && self.field_height > 0.0) {
            return Err(PhysicsError::InvalidSettings(format!(
                "field must have positive size, got {}x{}",
                self.field_width, self.field_height
            )));
        }
        if self.cells_wide == 0 || self.cells_high == 0 {
            return Err(PhysicsError::InvalidSettings(format!(
                "grid needs at least one cell per axis, got {}x{}",
                self.cells_wide, self.cells_high
            )));
        }
        let cells = u64::from(self.cells_wide) * u64::from(self.cells_high);
        if cells > MAX_GRID_CELLS {
            return Err(PhysicsError::InvalidSettings(format!(
                "grid {}x{} has {cells} cells, limit is {MAX_GRID_CELLS}",
                self.cells_wide, self.cells_high
            )));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidSettings("gravity must be finite".into()));
        }
        Ok(())
    }
}
