// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The deletion-aware, ascending merge of every level, used by
//! [`crate::DynamicIndex::iter`] and [`crate::DynamicIndex::lower_bound`].
//!
//! Unlike [`crate::DynamicIndex::find`], which resolves shadowing one level
//! at a time, this walks every level in lockstep through a [`BinaryHeap`] so
//! that a tombstone sitting in a lower (newer) level always suppresses an
//! older record for the same key, regardless of which levels currently hold
//! a copy of that key.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::hierarchy::DynamicIndex;
use crate::index::LearnedIndex;
use crate::item::{ExplicitFlag, TombstoneTag};

/// One level's current candidate key, parked in the heap until it is either
/// emitted or shadowed by a fresher copy of the same key.
struct HeapEntry<K> {
    key: K,
    /// Vec-index of the owning level (not the absolute level number).
    vi: usize,
    idx: usize,
}

impl<K: PartialEq> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.vi == other.vi
    }
}

impl<K: Eq> Eq for HeapEntry<K> {}

impl<K: Ord> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for HeapEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the key comparison so the
        // smallest key surfaces first. On a tie, the *higher* level index
        // sorts greater so it pops first — `next` relies on that to treat
        // the last popped entry of a run as the authoritative, newest one.
        other.key.cmp(&self.key).then_with(|| self.vi.cmp(&other.vi))
    }
}

/// Ascending, deletion-consistent iterator over every live key in a
/// [`DynamicIndex`], produced by [`DynamicIndex::iter`] /
/// [`DynamicIndex::iter_from`].
pub struct MergingIter<'a, K, V, Idx, T: TombstoneTag<V> = ExplicitFlag> {
    index: &'a DynamicIndex<K, V, Idx, T>,
    heap: BinaryHeap<HeapEntry<K>>,
}

impl<'a, K, V, Idx, T> MergingIter<'a, K, V, Idx, T>
where
    K: Ord + Clone,
    V: Clone,
    Idx: LearnedIndex<K>,
    T: TombstoneTag<V> + Clone,
{
    pub(crate) fn new(index: &'a DynamicIndex<K, V, Idx, T>, after: Option<K>) -> Self {
        let mut heap = BinaryHeap::with_capacity(index.levels.len());

        for (vi, level) in index.levels.iter().enumerate() {
            let level_no = index.config.min_level + vi;
            if level_no >= index.used_levels || level.is_empty() {
                continue;
            }

            let idx = match &after {
                Some(key) => level.upper_bound_from(0, key),
                None => 0,
            };

            if idx < level.len() {
                heap.push(HeapEntry {
                    key: level.as_slice()[idx].key().clone(),
                    vi,
                    idx,
                });
            }
        }

        Self { index, heap }
    }

    /// Like [`MergingIter::new`], but seeds every level's candidate at its
    /// first position with key `>= key` (inclusive) instead of strictly after
    /// one. Used by [`crate::DynamicIndex::lower_bound`] so that, unlike a
    /// per-level-independent scan, a tombstone in a lower (newer) level still
    /// shadows a live duplicate anywhere in a higher (older) level.
    pub(crate) fn new_at_or_after(index: &'a DynamicIndex<K, V, Idx, T>, key: &K) -> Self {
        let mut heap = BinaryHeap::with_capacity(index.levels.len());

        for (vi, level) in index.levels.iter().enumerate() {
            let level_no = index.config.min_level + vi;
            if level_no >= index.used_levels || level.is_empty() {
                continue;
            }

            let idx = level.lower_bound_in(0, level.len(), key);

            if idx < level.len() {
                heap.push(HeapEntry {
                    key: level.as_slice()[idx].key().clone(),
                    vi,
                    idx,
                });
            }
        }

        Self { index, heap }
    }

    /// Pushes `vi`'s next item onto the heap, if it has one.
    fn push_successor(&mut self, vi: usize, idx: usize) {
        let level = &self.index.levels[vi];
        let next_idx = idx + 1;

        if next_idx < level.len() {
            self.heap.push(HeapEntry {
                key: level.as_slice()[next_idx].key().clone(),
                vi,
                idx: next_idx,
            });
        }
    }
}

impl<'a, K, V, Idx, T> Iterator for MergingIter<'a, K, V, Idx, T>
where
    K: Ord + Clone,
    V: Clone,
    Idx: LearnedIndex<K>,
    T: TombstoneTag<V> + Clone,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let HeapEntry { key, vi, idx } = self.heap.pop()?;
            self.push_successor(vi, idx);

            let mut winner_vi = vi;
            let mut winner_idx = idx;

            while let Some(top) = self.heap.peek() {
                if top.key != key {
                    break;
                }

                let dup = self.heap.pop().expect("peeked entry must still be present");
                self.push_successor(dup.vi, dup.idx);
                winner_vi = dup.vi;
                winner_idx = dup.idx;
            }

            let item = &self.index.levels[winner_vi].as_slice()[winner_idx];

            if !item.is_deleted() {
                return Some((item.key(), item.value()));
            }
        }
    }
}
