use std::collections::hash_map::{Entry, HashMap};

use crate::key::ResourceKey;

/// A map from [`ResourceKey`] to one kind of resource record.
///
/// This is the storage shared by the script, font and image registries. It
/// knows nothing about backend resources; clearing goes through
/// [`Registry::clear_with`] so the owner can release each record first.
#[derive(Debug)]
pub struct Registry<T> {
    entries: HashMap<ResourceKey, T>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a record, returning the one it displaced.
    pub fn insert(&mut self, key: ResourceKey, value: T) -> Option<T> {
        self.entries.insert(key, value)
    }

    /// Insert only if `key` is absent. Returns the stored record and whether
    /// it was newly inserted.
    pub fn insert_if_absent(
        &mut self,
        key: ResourceKey,
        make: impl FnOnce() -> T,
    ) -> (&mut T, bool) {
        match self.entries.entry(key) {
            Entry::Occupied(slot) => (slot.into_mut(), false),
            Entry::Vacant(slot) => (slot.insert(make()), true),
        }
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<T> {
        self.entries.remove(key)
    }

    /// Hand every record to `release`, then leave the registry empty.
    pub fn clear_with(&mut self, mut release: impl FnMut(ResourceKey, T)) {
        for (key, value) in self.entries.drain() {
            release(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.entries.keys()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
