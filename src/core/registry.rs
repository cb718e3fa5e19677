//! Identity directory for instances.
//!
//! Mints ids and stores instances by id. It knows nothing about the engine;
//! callers keep the two in sync.

use std::collections::HashMap;

#[derive(Debug)]
pub struct Registry<T> {
    instances: HashMap<String, T>,
    next_id: u64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            instances: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new id `"{prefix}-{n}"`. The counter is shared by all
    /// prefixes and never repeats.
    pub fn create_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, id: impl Into<String>, instance: T) {
        self.instances.insert(id.into(), instance);
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.instances.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.instances.remove(id)
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }
}

impl<T: Clone> Registry<T> {
    /// A copy of the table; changes to it never reach the registry.
    pub fn get_all(&self) -> HashMap<String, T> {
        self.instances.clone()
    }
}
