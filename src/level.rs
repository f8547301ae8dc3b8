// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A single, always-sorted run of [`Item`]s.
//!
//! A level never decides its own capacity — that is [`crate::Config`] and
//! [`crate::hierarchy::DynamicIndex`]'s job — it only guarantees that its
//! contents stay sorted and gives the hierarchy cheap range queries over
//! itself.

use crate::binary_search::partition_point;
use crate::item::{ExplicitFlag, Item, TombstoneTag};

/// A contiguous sorted run of items, one rung of the buffer hierarchy.
#[derive(Debug)]
pub struct Level<K, V, T: TombstoneTag<V> = ExplicitFlag> {
    items: Vec<Item<K, V, T>>,
}

impl<K, V, T: TombstoneTag<V>> Level<K, V, T> {
    /// Creates an empty level with pre-reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Creates an empty level without reserving any capacity.
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Wraps an already-sorted `Vec` of items directly (used by merges and
    /// bulk construction, which build the final sorted run themselves).
    pub fn from_sorted_vec(items: Vec<Item<K, V, T>>) -> Self {
        Self { items }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the level holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-only view of the sorted run.
    pub fn as_slice(&self) -> &[Item<K, V, T>] {
        &self.items
    }

    /// Iterator over the keys in ascending order, used to build a learned
    /// index from this level without exposing the item representation.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.items.iter().map(Item::key)
    }

    /// Drains the level, returning ownership of its items and leaving it
    /// empty but without necessarily releasing its allocation (see
    /// [`Level::clear_and_shrink`] for that).
    pub fn take_items(&mut self) -> Vec<Item<K, V, T>> {
        std::mem::take(&mut self.items)
    }

    /// Replaces the level's contents with an already-sorted `Vec`.
    pub fn set_items(&mut self, items: Vec<Item<K, V, T>>) {
        self.items = items;
    }

    /// Empties the level. When `shrink` is set the backing allocation is
    /// released too (levels above `max_fully_allocated_level` do this after
    /// every merge that drains them; levels within the reserved band never
    /// shrink, to avoid allocator churn on the hot insertion path).
    pub fn clear_and_shrink(&mut self, shrink: bool) {
        self.items.clear();
        if shrink {
            self.items.shrink_to_fit();
        }
    }
}

impl<K: Ord, V, T: TombstoneTag<V>> Level<K, V, T> {
    /// First index in `[lo, hi)` whose key is `>= key` (`hi` is exclusive).
    pub fn lower_bound_in(&self, lo: usize, hi: usize, key: &K) -> usize {
        let hi = hi.min(self.items.len());
        let lo = lo.min(hi);
        lo + partition_point(&self.items[lo..hi], |item| item.key() < key)
    }

    /// First index at or after `lo` whose key is strictly `> key`.
    pub fn upper_bound_from(&self, lo: usize, key: &K) -> usize {
        let lo = lo.min(self.items.len());
        lo + partition_point(&self.items[lo..], |item| item.key() <= key)
    }

    /// Locates `key` within `[lo, hi)`, returning its index if present
    /// (tombstone or not — callers decide what an exact match means).
    pub fn find_in(&self, lo: usize, hi: usize, key: &K) -> Option<usize> {
        let idx = self.lower_bound_in(lo, hi, key);
        if idx < hi.min(self.items.len()) && self.items[idx].key() == key {
            Some(idx)
        } else {
            None
        }
    }

    /// Inserts `item` at its sorted position. The caller is responsible for
    /// having already ruled out an existing entry for the same key (the
    /// bottom-level overwrite case in `insert`); this always grows the level
    /// by one.
    pub fn insert_sorted(&mut self, item: Item<K, V, T>) {
        let idx = self.lower_bound_in(0, self.items.len(), item.key());
        self.items.insert(idx, item);
    }

    /// Overwrites the item at `idx` in place (bottom-level update path).
    pub fn overwrite_at(&mut self, idx: usize, item: Item<K, V, T>) {
        self.items[idx] = item;
    }
}
