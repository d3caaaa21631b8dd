//! Flat sorted multimaps keyed by geometry ids or indices.
//!
//! Entries live in a single vector ordered by key. Lookups are binary
//! searches, iteration is a linear scan in ascending key order. Two insertion
//! paths exist and are kept separate on purpose:
//!
//! - [`FlatMultimap::insert_sorted_end`] trusts the caller to insert keys in
//!   non-decreasing order and appends in O(1). Out-of-order keys are rejected,
//!   the value is handed back and the stored entries are left untouched.
//! - [`FlatMultimap::insert`] finds the position by binary search and shifts
//!   the tail, O(n) in the worst case.

use crate::geometry_id::{GeoIdValue, GeometryField, GeometryId};
use std::fmt::Debug;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rejected out-of-order insertion into [`FlatMultimap::insert_sorted_end`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("out-of-order insertion: key {key:?} after {last:?}")]
pub struct UnsortedInsert<K, V> {
    /// Largest key currently stored.
    pub last: K,
    /// The rejected key.
    pub key: K,
    /// The rejected value, returned to the caller.
    pub value: V,
}

/// Multi-valued map stored as a sorted vector of `(key, value)` pairs.
///
/// Equal keys keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FlatMultimap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for FlatMultimap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> FlatMultimap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates entries in ascending key order.
    pub fn iter(&self) -> std::slice::Iter<'_, (K, V)> {
        self.entries.iter()
    }

    /// Iterates keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Iterates values in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, value)| value)
    }

    /// All entries as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[(K, V)] {
        &self.entries
    }

    /// Consumes the map, returning the sorted entries.
    #[must_use]
    pub fn into_vec(self) -> Vec<(K, V)> {
        self.entries
    }

    /// Entry with the largest key, i.e. the last inserted at the end.
    #[must_use]
    pub fn last(&self) -> Option<&(K, V)> {
        self.entries.last()
    }
}

impl<K: Ord + Clone, V> FlatMultimap<K, V> {
    /// Builds a map from entries in arbitrary order.
    ///
    /// The sort is stable, equal keys keep their relative input order.
    #[must_use]
    pub fn from_unsorted(mut entries: Vec<(K, V)>) -> Self {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self { entries }
    }

    /// Appends an entry whose key is not smaller than any stored key.
    ///
    /// This is the fast path for producers that iterate an already sorted
    /// input. A smaller key is rejected and returned; nothing is reordered.
    pub fn insert_sorted_end(&mut self, key: K, value: V) -> Result<(), UnsortedInsert<K, V>> {
        if let Some((last, _)) = self.entries.last() {
            if key < *last {
                return Err(UnsortedInsert {
                    last: last.clone(),
                    key,
                    value,
                });
            }
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Inserts an entry at its sorted position, after existing equal keys.
    ///
    /// Returns the index of the new entry.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        let index = self.upper_bound(&key);
        self.entries.insert(index, (key, value));
        index
    }

    /// Index of the first entry with a key not less than `key`.
    #[must_use]
    pub fn lower_bound(&self, key: &K) -> usize {
        self.entries.partition_point(|(k, _)| k < key)
    }

    /// Index of the first entry with a key greater than `key`.
    #[must_use]
    pub fn upper_bound(&self, key: &K) -> usize {
        self.entries.partition_point(|(k, _)| k <= key)
    }

    /// All entries with exactly this key.
    #[must_use]
    pub fn equal_range(&self, key: &K) -> &[(K, V)] {
        &self.entries[self.lower_bound(key)..self.upper_bound(key)]
    }

    /// All entries with `first <= key <= last`.
    #[must_use]
    pub fn range_inclusive(&self, first: &K, last: &K) -> &[(K, V)] {
        let begin = self.lower_bound(first);
        let end = self.upper_bound(last).max(begin);
        &self.entries[begin..end]
    }

    /// Returns true if at least one entry has this key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        !self.equal_range(key).is_empty()
    }

    /// Number of entries with this key.
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.equal_range(key).len()
    }

    /// Checks the ordering invariant over all entries.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0].0 <= pair[1].0)
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for FlatMultimap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<K, V> IntoIterator for FlatMultimap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a FlatMultimap<K, V> {
    type Item = &'a (K, V);
    type IntoIter = std::slice::Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Store elements indexed by a geometry id.
///
/// Elements can be selected for a single surface or for a larger part of the
/// hierarchy, e.g. a volume or a layer.
pub type GeometryIdMultimap<T> = FlatMultimap<GeometryId, T>;

impl<T> FlatMultimap<GeometryId, T> {
    /// All entries below the hierarchy level of `field` that share its prefix.
    ///
    /// Fields below `field` in `prefix` are ignored.
    #[must_use]
    pub fn select(&self, prefix: GeometryId, field: GeometryField) -> &[(GeometryId, T)] {
        let keep = prefix_mask(field);
        let first = GeometryId::new(prefix.value() & keep);
        let last = first.last_below(field.mask());
        self.range_inclusive(&first, &last)
    }

    /// All entries within the given volume.
    #[must_use]
    pub fn select_volume(&self, volume: GeoIdValue) -> &[(GeometryId, T)] {
        self.select(GeometryId::default().with_volume(volume), GeometryField::Volume)
    }

    /// All entries within the given layer.
    #[must_use]
    pub fn select_layer(&self, volume: GeoIdValue, layer: GeoIdValue) -> &[(GeometryId, T)] {
        let prefix = GeometryId::default().with_volume(volume).with_layer(layer);
        self.select(prefix, GeometryField::Layer)
    }

    /// All entries for the given module / sensitive surface.
    #[must_use]
    pub fn select_module(
        &self,
        volume: GeoIdValue,
        layer: GeoIdValue,
        module: GeoIdValue,
    ) -> &[(GeometryId, T)] {
        // the module is the lowest level and defines a single id
        self.equal_range(&GeometryId::sensitive_module(volume, layer, module))
    }
}

/// Mask keeping `field` and every more significant field.
fn prefix_mask(field: GeometryField) -> GeoIdValue {
    GeometryField::ALL
        .iter()
        .take_while(|f| **f != field)
        .fold(field.mask(), |mask, f| mask | f.mask())
}

/// Store elements that are identified by an index, e.g. in another container.
///
/// Each index can have zero or more associated elements, e.g. all generating
/// particles of a hit identified by its index in the hit container.
pub type IndexMultimap<V, K = usize> = FlatMultimap<K, V>;

/// Inverts the multimap, i.e. from `a -> {b...}` to `b -> {a...}`.
///
/// Entries with equal new keys keep the order of the input map, so the result
/// is deterministic.
#[must_use]
pub fn invert_index_multimap<K, V>(multimap: &IndexMultimap<V, K>) -> IndexMultimap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    let swapped = multimap
        .iter()
        .map(|(key, value)| (value.clone(), key.clone()))
        .collect::<Vec<_>>();
    FlatMultimap::from_unsorted(swapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(volume: u64, layer: u64, sensitive: u64) -> GeometryId {
        GeometryId::sensitive_module(volume, layer, sensitive)
    }

    fn sample() -> GeometryIdMultimap<&'static str> {
        let mut map = GeometryIdMultimap::new();
        for (key, value) in [
            (id(1, 2, 1), "a"),
            (id(1, 2, 1), "b"),
            (id(1, 2, 7), "c"),
            (id(1, 4, 1), "d"),
            (id(2, 2, 1), "e"),
            (id(3, 1, 1), "f"),
        ] {
            map.insert_sorted_end(key, value).unwrap();
        }
        map
    }

    #[test]
    fn test_insert_sorted_end_appends() {
        let map = sample();
        assert_eq!(map.len(), 6);
        assert!(map.is_sorted());
        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_insert_sorted_end_rejects_smaller_key() {
        let mut map = sample();
        let before = map.clone();
        let err = map.insert_sorted_end(id(1, 1, 1), "late").unwrap_err();
        assert_eq!(err.key, id(1, 1, 1));
        assert_eq!(err.last, id(3, 1, 1));
        assert_eq!(err.value, "late");
        assert_eq!(map, before);
    }

    #[test]
    fn test_general_insert_keeps_order() {
        let mut map = sample();
        let index = map.insert(id(1, 2, 1), "z");
        assert_eq!(index, 2);
        assert!(map.is_sorted());
        let range: Vec<_> = map.equal_range(&id(1, 2, 1)).iter().map(|e| e.1).collect();
        assert_eq!(range, ["a", "b", "z"]);
    }

    #[test]
    fn test_select_volume_and_layer() {
        let map = sample();
        assert_eq!(map.select_volume(1).len(), 4);
        assert_eq!(map.select_volume(2).len(), 1);
        assert!(map.select_volume(9).is_empty());
        assert_eq!(map.select_layer(1, 2).len(), 3);
        assert_eq!(map.select_layer(1, 4).len(), 1);
        assert!(map.select_layer(1, 3).is_empty());
    }

    #[test]
    fn test_select_module() {
        let map = sample();
        let module: Vec<_> = map.select_module(1, 2, 1).iter().map(|e| e.1).collect();
        assert_eq!(module, ["a", "b"]);
        assert_eq!(map.count(&id(1, 2, 7)), 1);
        assert!(!map.contains_key(&id(1, 2, 3)));
    }

    #[test]
    fn test_from_unsorted_is_stable() {
        let map: GeometryIdMultimap<u32> = vec![(id(2, 1, 1), 0), (id(1, 1, 1), 1), (id(2, 1, 1), 2)]
            .into_iter()
            .collect();
        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, [1, 0, 2]);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let map = sample();
        let first: Vec<_> = map.keys().copied().collect();
        let second: Vec<_> = map.iter().map(|(key, _)| *key).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invert_index_multimap() {
        let mut hit_particles: IndexMultimap<u64> = IndexMultimap::new();
        hit_particles.insert(0, 11);
        hit_particles.insert(0, 12);
        hit_particles.insert(1, 11);
        hit_particles.insert(2, 13);

        let particle_hits = invert_index_multimap(&hit_particles);
        let for_11: Vec<_> = particle_hits.equal_range(&11).iter().map(|e| e.1).collect();
        assert_eq!(for_11, [0, 1]);
        assert_eq!(particle_hits.count(&12), 1);
        assert_eq!(particle_hits.count(&13), 1);
        assert!(particle_hits.is_sorted());
    }
}
