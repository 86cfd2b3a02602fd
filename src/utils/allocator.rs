use serde::{Deserialize, Serialize};

/// Generational handle identifying a body registered with a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub const NULL: BodyHandle = BodyHandle {
        index: u32::MAX,
        generation: 0,
    };

    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::NULL
    }
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

impl<T> Slot<T> {
    fn generation(&self) -> u32 {
        match self {
            Slot::Occupied { generation, .. } | Slot::Vacant { generation } => *generation,
        }
    }
}

/// Generational arena: stable handles, O(1) insert/remove, slot reuse via a free list.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> BodyHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = slot.generation();
            *slot = Slot::Occupied { generation, value };
            return BodyHandle::new(index, generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });
        BodyHandle::new(index, 0)
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation() != handle.generation() || matches!(slot, Slot::Vacant { .. }) {
            return None;
        }

        let next = Slot::Vacant {
            generation: handle.generation().wrapping_add(1),
        };
        match std::mem::replace(slot, next) {
            Slot::Occupied { value, .. } => {
                self.free.push(handle.index);
                self.len -= 1;
                Some(value)
            }
            Slot::Vacant { .. } => None,
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&T> {
        match self.slots.get(handle.index())? {
            Slot::Occupied { generation, value } if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut T> {
        match self.slots.get_mut(handle.index())? {
            Slot::Occupied { generation, value } if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Mutable access to two distinct live entries at once.
    pub fn get2_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (low, high, flipped) = if a.index() < b.index() {
            (a.index(), b.index(), false)
        } else {
            (b.index(), a.index(), true)
        };

        let (left, right) = self.slots.split_at_mut(high);
        let (Slot::Occupied { value: first, .. }, Slot::Occupied { value: second, .. }) =
            (&mut left[low], &mut right[0])
        else {
            return None;
        };

        if flipped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, value } => {
                    Some((BodyHandle::new(index as u32, *generation), value))
                }
                Slot::Vacant { .. } => None,
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, value } => {
                    Some((BodyHandle::new(index as u32, *generation), value))
                }
                Slot::Vacant { .. } => None,
            })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
