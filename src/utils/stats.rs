//! Debug-statistics sink the world can push counters to.
//!
//! The physics core only ever writes to a sink; nothing read back from it
//! feeds into the simulation.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// Tag names the world publishes.
pub mod tags {
    pub const BODIES: &str = "physics.bodies";
    pub const ACTIVE_CELLS: &str = "physics.active_cells";
    pub const PAIRS: &str = "physics.pairs";
    pub const CONTACTS: &str = "physics.contacts";
    pub const POOL: &str = "physics.pair_pool";
    pub const STEP_MS: &str = "physics.step_ms";
    pub const RESOLVER: &str = "physics.resolver";

    pub const ALL: [&str; 7] = [BODIES, ACTIVE_CELLS, PAIRS, CONTACTS, POOL, STEP_MS, RESOLVER];
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f32),
    Caption(String),
}

/// Receiver for named debug counters, e.g. an on-screen overlay.
pub trait DebugStatSink: Send + Sync {
    fn set_int(&self, tag: &str, value: i64);
    fn set_float(&self, tag: &str, value: f32);
    fn set_caption(&self, tag: &str, caption: &str);
    fn remove(&self, tag: &str);
}

/// In-memory sink keeping the latest value per tag.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    values: Mutex<BTreeMap<String, StatValue>>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<StatValue> {
        self.values.lock().get(tag).cloned()
    }

    pub fn int(&self, tag: &str) -> Option<i64> {
        match self.get(tag)? {
            StatValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    fn set(&self, tag: &str, value: StatValue) {
        self.values.lock().insert(tag.to_owned(), value);
    }
}

impl DebugStatSink for StatsRegistry {
    fn set_int(&self, tag: &str, value: i64) {
        self.set(tag, StatValue::Int(value));
    }

    fn set_float(&self, tag: &str, value: f32) {
        self.set(tag, StatValue::Float(value));
    }

    fn set_caption(&self, tag: &str, caption: &str) {
        self.set(tag, StatValue::Caption(caption.to_owned()));
    }

    fn remove(&self, tag: &str) {
        self.values.lock().remove(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_latest_value_per_tag() {
        let registry = StatsRegistry::new();
        registry.set_int(tags::BODIES, 3);
        registry.set_int(tags::BODIES, 5);
        registry.set_caption(tags::RESOLVER, "friction");

        assert_eq!(registry.int(tags::BODIES), Some(5));
        assert_eq!(
            registry.get(tags::RESOLVER),
            Some(StatValue::Caption("friction".into()))
        );

        registry.remove(tags::BODIES);
        assert_eq!(registry.int(tags::BODIES), None);
        assert_eq!(registry.len(), 1);
    }
}
