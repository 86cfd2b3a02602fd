use glam::Vec2;

use crate::utils::allocator::BodyHandle;

/// Result buffer describing one collision between two bodies.
///
/// A world owns exactly one manifold and resets it for every candidate pair,
/// so callbacks must copy out whatever they want to keep.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Unit vector pointing from body A towards body B.
    pub normal: Vec2,
    pub depth: f32,
    /// Contact points; only the first `contact_count` entries are meaningful.
    pub points: [Vec2; 2],
    pub contact_count: usize,
    /// Total normal impulse applied by the resolver.
    pub impulse: Vec2,
    /// Cleared by a `pre_contact` callback to skip separation and resolution.
    pub enable_resolve_contact: bool,
}

impl Default for ContactManifold {
    fn default() -> Self {
        Self {
            body_a: BodyHandle::NULL,
            body_b: BodyHandle::NULL,
            normal: Vec2::ZERO,
            depth: 0.0,
            points: [Vec2::ZERO; 2],
            contact_count: 0,
            impulse: Vec2::ZERO,
            enable_resolve_contact: true,
        }
    }
}

impl ContactManifold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, body_a: BodyHandle, body_b: BodyHandle) {
        *self = Self {
            body_a,
            body_b,
            ..Self::default()
        };
    }

    pub fn contacts(&self) -> &[Vec2] {
        &self.points[..self.contact_count.min(2)]
    }

    pub fn contact1(&self) -> Vec2 {
        self.points[0]
    }

    pub fn contact2(&self) -> Vec2 {
        self.points[1]
    }

    pub fn set_contacts(&mut self, contacts: &[Vec2]) {
        self.contact_count = contacts.len().min(2);
        self.points[..self.contact_count].copy_from_slice(&contacts[..self.contact_count]);
    }

    /// Minimum translation vector that separates B from A.
    pub fn mtv(&self) -> Vec2 {
        self.normal * self.depth
    }

    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_previous_pair() {
        let mut manifold = ContactManifold::new();
        manifold.depth = 1.0;
        manifold.set_contacts(&[Vec2::ONE, Vec2::X]);
        manifold.enable_resolve_contact = false;

        let a = BodyHandle::new(0, 0);
        let b = BodyHandle::new(1, 0);
        manifold.reset(a, b);

        assert!(manifold.contacts().is_empty());
        assert_eq!(manifold.depth, 0.0);
        assert!(manifold.enable_resolve_contact);
        assert!(manifold.involves(b));
    }
}
