//! Uniform spatial hash grid used by the broad phase.
//!
//! The grid covers a bounded field split into `cells_wide × cells_high`
//! cells. Each cell keeps a list of entity keys; entities whose AABB spans a
//! cell border are listed in every cell they touch. Positions outside the field
//! are clamped into the border cells, so every entity always has a home.

use crate::config::MAX_GRID_CELLS;
use crate::core::types::Aabb;
use crate::error::{PhysicsError, Result};

/// Dense cell index: `row * cells_wide + column`.
pub type CellKey = usize;

/// Inclusive range of cell columns and rows covered by an AABB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Contract an entity fulfils to live in a [`SpatialHashGrid`].
///
/// The entity caches the cell range it was last inserted with; the grid uses
/// that cache both to find the cells to remove it from and as a dirty check so
/// slow or resting bodies are not re-inserted every step.
pub trait GridEntity {
    type Key: Copy + PartialEq;

    fn grid_key(&self) -> Self::Key;
    fn grid_aabb(&self) -> Aabb;
    fn cached_grid_bounds(&self) -> Option<GridBounds>;
    fn store_grid_bounds(&mut self, bounds: Option<GridBounds>);

    /// Writes the entity's current cell range into its cache.
    fn fill_entity_bounds(&mut self, grid: &SpatialHashGrid<Self::Key>) {
        let bounds = grid.cell_bounds(&self.grid_aabb());
        self.store_grid_bounds(Some(bounds));
    }

    /// True when the live AABB maps to a different cell range than the cache.
    fn is_grid_cache_old(&self, grid: &SpatialHashGrid<Self::Key>) -> bool {
        self.cached_grid_bounds() != Some(grid.cell_bounds(&self.grid_aabb()))
    }
}

pub struct SpatialHashGrid<T> {
    field_width: f32,
    field_height: f32,
    cells_wide: u32,
    cells_high: u32,
    cell_width: f32,
    cell_height: f32,
    cells: Vec<Vec<T>>,
    active: Vec<CellKey>,
    listed: Vec<bool>,
}

impl<T: Copy + PartialEq> SpatialHashGrid<T> {
    pub fn new(field_width: f32, field_height: f32, cells_wide: u32, cells_high: u32) -> Result<Self> {
        if !(field_width > 0.0 && field_height > 0.0) || cells_wide == 0 || cells_high == 0 {
            return Err(PhysicsError::InvalidSettings(format!(
                "grid {cells_wide}x{cells_high} over {field_width}x{field_height} field"
            )));
        }

        let cell_count = cells_wide
            .checked_mul(cells_high)
            .filter(|&count| u64::from(count) <= MAX_GRID_CELLS)
            .and_then(|count| usize::try_from(count).ok())
            .ok_or_else(|| {
                PhysicsError::InvalidSettings(format!(
                    "grid {cells_wide}x{cells_high} exceeds {MAX_GRID_CELLS} cells"
                ))
            })?;
        Ok(Self {
            field_width,
            field_height,
            cells_wide,
            cells_high,
            cell_width: field_width / cells_wide as f32,
            cell_height: field_height / cells_high as f32,
            cells: (0..cell_count).map(|_| Vec::new()).collect(),
            active: Vec::new(),
            listed: vec![false; cell_count],
        })
    }

    pub fn field_size(&self) -> (f32, f32) {
        (self.field_width, self.field_height)
    }

    pub fn cells_wide(&self) -> u32 {
        self.cells_wide
    }

    pub fn cells_high(&self) -> u32 {
        self.cells_high
    }

    pub fn cell_key(&self, column: u32, row: u32) -> CellKey {
        row as usize * self.cells_wide as usize + column as usize
    }

    fn column_of(&self, x: f32) -> u32 {
        let column = (x / self.cell_width).floor();
        column.clamp(0.0, (self.cells_wide - 1) as f32) as u32
    }

    fn row_of(&self, y: f32) -> u32 {
        let row = (y / self.cell_height).floor();
        row.clamp(0.0, (self.cells_high - 1) as f32) as u32
    }

    pub fn cell_bounds(&self, aabb: &Aabb) -> GridBounds {
        GridBounds {
            min_x: self.column_of(aabb.min.x),
            min_y: self.row_of(aabb.min.y),
            max_x: self.column_of(aabb.max.x),
            max_y: self.row_of(aabb.max.y),
        }
    }

    fn keys_in(&self, bounds: GridBounds) -> impl Iterator<Item = CellKey> + '_ {
        (bounds.min_y..=bounds.max_y).flat_map(move |row| {
            (bounds.min_x..=bounds.max_x).map(move |column| self.cell_key(column, row))
        })
    }

    fn insert_into(&mut self, bounds: GridBounds, key: T) {
        for row in bounds.min_y..=bounds.max_y {
            for column in bounds.min_x..=bounds.max_x {
                let cell = self.cell_key(column, row);
                self.cells[cell].push(key);
                if !self.listed[cell] {
                    self.listed[cell] = true;
                    self.active.push(cell);
                }
            }
        }
    }

    fn remove_from(&mut self, bounds: GridBounds, key: T) {
        for row in bounds.min_y..=bounds.max_y {
            for column in bounds.min_x..=bounds.max_x {
                let cell = self.cell_key(column, row);
                let list = &mut self.cells[cell];
                if let Some(position) = list.iter().position(|k| *k == key) {
                    list.remove(position);
                }
            }
        }
    }

    pub fn add_entity<E: GridEntity<Key = T>>(&mut self, entity: &mut E) {
        entity.fill_entity_bounds(self);
        if let Some(bounds) = entity.cached_grid_bounds() {
            self.insert_into(bounds, entity.grid_key());
        }
    }

    /// Removes the entity from every cell it was registered in.
    pub fn remove_entity<E: GridEntity<Key = T>>(&mut self, entity: &mut E) {
        if let Some(bounds) = entity.cached_grid_bounds() {
            self.remove_from(bounds, entity.grid_key());
        }
        entity.store_grid_bounds(None);
    }

    /// Re-registers the entity if its AABB moved into a different cell range.
    /// Returns whether any cell list changed.
    pub fn update_entity<E: GridEntity<Key = T>>(&mut self, entity: &mut E) -> bool {
        if !entity.is_grid_cache_old(self) {
            return false;
        }

        let key = entity.grid_key();
        if let Some(old) = entity.cached_grid_bounds() {
            self.remove_from(old, key);
        }
        entity.fill_entity_bounds(self);
        if let Some(bounds) = entity.cached_grid_bounds() {
            self.insert_into(bounds, key);
        }
        true
    }

    /// Keys of all non-empty cells. Cells emptied since the last call are
    /// pruned here.
    pub fn active_cell_keys(&mut self) -> &[CellKey] {
        let cells = &self.cells;
        let listed = &mut self.listed;
        self.active.retain(|&key| {
            if cells[key].is_empty() {
                listed[key] = false;
                false
            } else {
                true
            }
        });
        &self.active
    }

    pub fn cell(&self, key: CellKey) -> &[T] {
        self.cells.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Live list for a cell. Removing entries is allowed (iterate in reverse);
    /// new entries must go through [`add_entity`](Self::add_entity) so the
    /// active set stays correct.
    pub fn cell_mut(&mut self, key: CellKey) -> Option<&mut Vec<T>> {
        self.cells.get_mut(key)
    }

    /// Cells that currently list `key`, in key order.
    pub fn cells_containing(&self, key: T) -> Vec<CellKey> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, list)| list.contains(&key))
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Cell keys covered by `aabb`.
    pub fn cells_overlapping(&self, aabb: &Aabb) -> Vec<CellKey> {
        self.keys_in(self.cell_bounds(aabb)).collect()
    }

    /// Appends every entity registered in a cell touched by `aabb` to `out`,
    /// without duplicates.
    pub fn query_aabb(&self, aabb: &Aabb, out: &mut Vec<T>) {
        for cell in self.keys_in(self.cell_bounds(aabb)) {
            for key in &self.cells[cell] {
                if !out.contains(key) {
                    out.push(*key);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        for list in &mut self.cells {
            list.clear();
        }
        self.active.clear();
        self.listed.iter_mut().for_each(|flag| *flag = false);
    }
}
