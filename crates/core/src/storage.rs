use std::collections::btree_map::Entry;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;

/// Storage trait providing the basic operations the contract and chain need on keyed state.
pub trait Storage<K: StorageKey, V: StorageValue> {
    /// Creates a new empty storage.
    fn new() -> Self;

    /// Insert a value at the given key.
    fn insert(&mut self, key: K, value: V);

    /// Remove a value at the given key.
    fn remove(&mut self, key: K);

    /// Gets an entry at the given key.
    fn entry(&mut self, key: K) -> Entry<'_, U256, V>;

    /// Get a value at the given key.
    fn get(&self, key: &K) -> Option<&V>;

    /// Get a mutable reference to a value at the given key.
    fn get_mut(&mut self, key: &K) -> Option<&mut V>;
}

/// Trait for types that can be used as storage keys.
pub trait StorageKey: Clone + Eq + std::hash::Hash + Ord {
    /// Converts the key to the [U256] index it is stored under.
    fn index(&self) -> U256;
}

/// Trait for types that can be stored as values.
pub trait StorageValue: SolValue + Clone {}

impl StorageKey for Address {
    fn index(&self) -> U256 {
        U256::from_be_slice(self.as_slice())
    }
}

impl StorageValue for U256 {}

impl StorageValue for u64 {}
