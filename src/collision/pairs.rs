//! Reusable candidate pairs produced by the broad phase.

use crate::utils::allocator::BodyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
}

/// Index of a borrowed pair inside its [`PairPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairIndex(usize);

/// Free-list pool of [`CollisionPair`]s.
///
/// Borrowing and returning are O(1) index pops/pushes; the backing storage only
/// grows when every pair is already on loan.
#[derive(Debug, Default)]
pub struct PairPool {
    pairs: Vec<CollisionPair>,
    free: Vec<usize>,
}

impl PairPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let empty = CollisionPair {
            body_a: BodyHandle::NULL,
            body_b: BodyHandle::NULL,
        };
        Self {
            pairs: vec![empty; capacity],
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn borrow(&mut self, body_a: BodyHandle, body_b: BodyHandle) -> PairIndex {
        let pair = CollisionPair { body_a, body_b };
        match self.free.pop() {
            Some(index) => {
                self.pairs[index] = pair;
                PairIndex(index)
            }
            None => {
                self.pairs.push(pair);
                PairIndex(self.pairs.len() - 1)
            }
        }
    }

    pub fn give_back(&mut self, index: PairIndex) {
        debug_assert!(!self.free.contains(&index.0), "pair returned twice");
        self.free.push(index.0);
    }

    pub fn get(&self, index: PairIndex) -> CollisionPair {
        self.pairs[index.0]
    }

    /// Total pairs ever allocated, free or on loan.
    pub fn allocated(&self) -> usize {
        self.pairs.len()
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn borrowed(&self) -> usize {
        self.pairs.len() - self.free.len()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: u32) -> BodyHandle {
        BodyHandle::new(i, 0)
    }

    #[test]
    fn returned_pairs_are_reused() {
        let mut pool = PairPool::new();
        let first = pool.borrow(handle(0), handle(1));
        let second = pool.borrow(handle(2), handle(3));
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.borrowed(), 2);

        pool.give_back(first);
        pool.give_back(second);
        for _ in 0..10 {
            let a = pool.borrow(handle(4), handle(5));
            let b = pool.borrow(handle(6), handle(7));
            assert_eq!(pool.get(b).body_a, handle(6));
            pool.give_back(a);
            pool.give_back(b);
        }
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn preallocated_pool_does_not_grow() {
        let mut pool = PairPool::with_capacity(4);
        let borrowed: Vec<_> = (0..4).map(|i| pool.borrow(handle(i), handle(i + 1))).collect();
        assert_eq!(pool.allocated(), 4);
        borrowed.into_iter().for_each(|index| pool.give_back(index));
        assert_eq!(pool.borrowed(), 0);
    }
}
