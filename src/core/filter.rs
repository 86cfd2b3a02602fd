use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CATEGORY_BITS, DEFAULT_MASK_BITS};

/// Category/mask collision filter: "what I am" and "what I collide with".
///
/// A filter with both fields zero means "include all" and passes against
/// anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub category_bits: u16,
    pub mask_bits: u16,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category_bits: DEFAULT_CATEGORY_BITS,
            mask_bits: DEFAULT_MASK_BITS,
        }
    }
}

impl CollisionFilter {
    pub const INCLUDE_ALL: CollisionFilter = CollisionFilter {
        category_bits: 0,
        mask_bits: 0,
    };

    pub fn new(category_bits: u16, mask_bits: u16) -> Self {
        Self {
            category_bits,
            mask_bits,
        }
    }

    pub fn is_include_all(&self) -> bool {
        self.category_bits == 0 && self.mask_bits == 0
    }

    /// Symmetric test; both sides must accept each other.
    pub fn should_collide(&self, other: &CollisionFilter) -> bool {
        if self.is_include_all() || other.is_include_all() {
            return true;
        }
        (self.mask_bits & other.category_bits) != 0 && (self.category_bits & other.mask_bits) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mask_rejects_everything_but_include_all() {
        let wall = CollisionFilter::new(0xFFFF, 0xFFFF);
        let ghost = CollisionFilter::new(0x0001, 0x0000);
        assert!(!wall.should_collide(&ghost));
        assert!(!ghost.should_collide(&wall));
        assert!(ghost.should_collide(&CollisionFilter::INCLUDE_ALL));
    }

    #[test]
    fn filter_requires_both_directions() {
        let player = CollisionFilter::new(0b01, 0b10);
        let enemy = CollisionFilter::new(0b10, 0b01);
        let pickup = CollisionFilter::new(0b100, 0b01);
        assert!(player.should_collide(&enemy));
        assert!(!player.should_collide(&pickup));
    }
}
