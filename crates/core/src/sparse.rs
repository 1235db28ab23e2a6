//! Sparse Storage.
//!
//! This module contains the [`SparseStorage`] data structure, which keeps only the slots that were
//! written to.

use std::collections::{btree_map::Entry, BTreeMap};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageKey, StorageValue};

/// A sparse storage implementation backed by a `BTreeMap`.
///
/// Keys are converted to U256 indices using the [`crate::storage::StorageKey::index()`] method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseStorage<K: StorageKey, V: StorageValue> {
    inner: BTreeMap<U256, V>,
    _key: std::marker::PhantomData<K>,
}

impl<K: StorageKey, V: StorageValue> Storage<K, V> for SparseStorage<K, V> {
    fn new() -> Self {
        Self { inner: BTreeMap::new(), _key: std::marker::PhantomData }
    }

    fn insert(&mut self, key: K, value: V) {
        let index = key.index();
        self.inner.insert(index, value);
    }

    fn remove(&mut self, key: K) {
        let index = key.index();
        self.inner.remove(&index);
    }

    fn entry(&mut self, key: K) -> Entry<'_, U256, V> {
        let index = key.index();
        self.inner.entry(index)
    }

    fn get(&self, key: &K) -> Option<&V> {
        let index = key.index();
        self.inner.get(&index)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = key.index();
        self.inner.get_mut(&index)
    }
}

impl<K: StorageKey, V: StorageValue> SparseStorage<K, V> {
    /// Check if the storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The number of stored slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over the raw key-value pairs (returns U256 indices).
    pub fn iter_raw(&self) -> impl Iterator<Item = (&U256, &V)> {
        self.inner.iter()
    }
}

impl<K: StorageKey, V: StorageValue> Default for SparseStorage<K, V> {
    fn default() -> Self {
        <Self as Storage<K, V>>::new()
    }
}
