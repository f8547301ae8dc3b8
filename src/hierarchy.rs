// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The buffer hierarchy: the write path, point/range queries, and bulk
//! construction all live here, coordinating [`Level`]s, their companion
//! [`LearnedIndex`]es, and the [`merge`] module's cascade merge.

use crate::config::Config;
use crate::error::Result;
use crate::index::{LearnedIndex, LinearIndex};
use crate::item::{ExplicitFlag, Item, TombstoneTag};
use crate::iter::MergingIter;
use crate::level::Level;
use crate::merge;

/// A dynamic, learned, ordered key-value map.
///
/// `K` is the key type, `V` the value type, `Idx` the learned-index
/// collaborator (defaults to [`LinearIndex`], a stub that always returns the
/// full level as its candidate range), and `T` the tombstone encoding
/// (defaults to [`ExplicitFlag`]).
///
/// See the crate-level docs for the write-amplification/memory trade-offs
/// this structure makes; in short, writes enter a small sorted buffer at
/// `min_level` and cascade upward in geometrically sized runs, the way a
/// binary counter carries.
pub struct DynamicIndex<K, V, Idx = LinearIndex, T: TombstoneTag<V> = ExplicitFlag> {
    pub(crate) config: Config,
    pub(crate) levels: Vec<Level<K, V, T>>,
    pub(crate) indices: Vec<Idx>,

    /// Smallest level index such that every level at or above it is empty.
    pub(crate) used_levels: usize,
}

impl<K, V, Idx, T> DynamicIndex<K, V, Idx, T>
where
    K: Ord + Clone,
    V: Clone,
    Idx: LearnedIndex<K>,
    T: TombstoneTag<V> + Clone,
{
    /// Creates an empty index, pre-reserving capacity for levels
    /// `config.min_level ..= config.min_level + config.init_levels - 1`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut levels = Vec::with_capacity(config.init_levels);
        let mut indices = Vec::with_capacity(config.init_levels);

        for offset in 0..config.init_levels {
            let level = config.min_level + offset;
            let capacity = if level == config.min_level {
                config.bottom_capacity()
            } else {
                config.level_capacity(level)
            };
            levels.push(Level::with_capacity(capacity));
            indices.push(Idx::default());
        }

        Self {
            used_levels: config.min_level,
            config,
            levels,
            indices,
        }
    }

    /// Vec-index for absolute level number `level`.
    fn vi(&self, level: usize) -> usize {
        level - self.config.min_level
    }

    /// Grows `levels`/`indices` on demand so that `level` exists.
    fn ensure_allocated(&mut self, level: usize) {
        while self.levels.len() <= self.vi(level) {
            self.levels.push(Level::empty());
            self.indices.push(Idx::default());
        }
    }

    /// Number of live (non-tombstone) items is not tracked incrementally —
    /// like the source, this walks every level. Prefer `iter().count()` only
    /// when you actually need the live count; this is the raw physical size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }

    /// Whether the index holds no physical items (may still report `true`
    /// immediately after the structure was emptied via erases that haven't
    /// cascaded away yet — use `iter().next().is_none()` for a
    /// deletion-aware check).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Level::is_empty)
    }

    /// Approximate physical size in bytes of every stored item across all
    /// levels (tombstones included).
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.len() * std::mem::size_of::<Item<K, V, T>>()
    }

    /// Approximate size in bytes of every live learned index.
    #[must_use]
    pub fn index_size_in_bytes(&self) -> usize {
        (self.config.min_indexed_level..self.used_levels)
            .filter(|&level| !self.levels[self.vi(level)].is_empty())
            .count()
            * std::mem::size_of::<Idx>()
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `value` collides with the reserved
    /// tombstone sentinel (only reachable with [`crate::item::SentinelTag`]
    /// as `T`; [`crate::item::SentinelValue`] documents this precondition).
    /// Release builds trust the caller instead of paying for the check.
    pub fn insert(&mut self, key: K, value: V) {
        debug_assert!(
            !T::would_collide(&value),
            "value collides with the reserved tombstone sentinel"
        );
        self.insert_item(Item::new(key, value));
    }

    /// Marks `key` as deleted. Unconditional: a tombstone is placed even if
    /// the key was never present, and reconciled the next time it cascades
    /// through a merge.
    pub fn erase(&mut self, key: K)
    where
        V: Default,
    {
        self.insert_item(Item::tombstone_default(key));
    }

    fn insert_item(&mut self, item: Item<K, V, T>) {
        let bottom_len = self.levels[0].len();

        if let Some(idx) = self.levels[0].find_in(0, bottom_len, item.key()) {
            log::trace!("overwriting existing bottom-level entry in place");
            self.levels[0].overwrite_at(idx, item);
            return;
        }

        let bottom_cap = self.config.bottom_capacity();

        if bottom_len < bottom_cap {
            self.levels[0].insert_sorted(item);
            if self.used_levels == self.config.min_level {
                self.used_levels = self.config.min_level + 1;
            }
            return;
        }

        let target = self.choose_cascade_target();
        log::debug!("bottom level full, cascading into level {target}");

        if target == self.used_levels {
            self.used_levels += 1;
            self.ensure_allocated(target);
        }

        self.cascade_merge(item, target);
    }

    /// Finds the smallest level `t >= min_level + 1` with enough free
    /// capacity to absorb everything that would cascade into it; falls back
    /// to creating a new top level when none of the existing ones suffice.
    fn choose_cascade_target(&self) -> usize {
        let min_level = self.config.min_level;
        let mut slots_required = self.config.level_capacity(min_level + 1);

        for level in (min_level + 1)..self.used_levels {
            let vi = self.vi(level);
            let capacity = self.config.level_capacity(level);
            let free = capacity.saturating_sub(self.levels[vi].len());

            if free >= slots_required {
                return level;
            }

            slots_required += self.levels[vi].len();
        }

        self.used_levels
    }

    /// Executes the pairwise logarithmic merge (§4.4.1): folds the bottom
    /// level plus `new_item` together with every level below `target` into
    /// `target`, eliminating winning tombstones if `target` is the topmost
    /// used level.
    fn cascade_merge(&mut self, new_item: Item<K, V, T>, target: usize) {
        let min_level = self.config.min_level;
        let drop_tombstones = target == self.used_levels - 1;

        let combined_bottom = {
            let bottom = &self.levels[0];
            let split = bottom.lower_bound_in(0, bottom.len(), new_item.key());
            let mut run = Vec::with_capacity(bottom.len() + 1);
            run.extend_from_slice(&bottom.as_slice()[..split]);
            run.push(new_item);
            run.extend_from_slice(&bottom.as_slice()[split..]);
            run
        };

        let mut runs = vec![combined_bottom];

        for level in (min_level + 1)..target {
            runs.push(self.levels[self.vi(level)].take_items());
        }

        let merged = merge::cascade_merge(runs, drop_tombstones);

        self.levels[0].clear_and_shrink(false);

        for level in (min_level + 1)..target {
            let vi = self.vi(level);
            let shrink = level > self.config.max_fully_allocated_level;
            self.levels[vi].clear_and_shrink(shrink);

            if level >= self.config.min_indexed_level {
                self.indices[vi] = Idx::default();
            }
        }

        let target_vi = self.vi(target);
        self.levels[target_vi].set_items(merged);

        if target >= self.config.min_indexed_level {
            let level = &self.levels[target_vi];
            self.indices[target_vi] = Idx::build(level.keys(), level.len());
        }
    }

    /// Candidate search range for `key` within `level`, narrowed by the
    /// learned index when the level is indexed.
    fn search_range(&self, level: usize, key: &K) -> (usize, usize) {
        let vi = self.vi(level);
        if level >= self.config.min_indexed_level {
            self.indices[vi].search(key)
        } else {
            (0, self.levels[vi].len())
        }
    }

    /// Looks up `key`, returning its live value if present.
    ///
    /// Scans levels from `min_level` upward and returns the first match —
    /// the recency invariant guarantees that is the authoritative record. A
    /// tombstone hit short-circuits the search: its key is logically absent,
    /// regardless of what a higher (older) level might still hold for it.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&V> {
        for level in self.config.min_level..self.used_levels {
            let vi = self.vi(level);
            if self.levels[vi].is_empty() {
                continue;
            }

            let (lo, hi) = self.search_range(level, key);

            if let Some(idx) = self.levels[vi].find_in(lo, hi, key) {
                let item = &self.levels[vi].as_slice()[idx];
                return if item.is_deleted() { None } else { Some(item.value()) };
            }
        }

        None
    }

    /// Whether `key` currently resolves to a live value.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Finds the smallest live key `>= key`.
    ///
    /// Resolves shadowing the same way [`DynamicIndex::iter`] does: a
    /// tombstone in a lower (newer) level suppresses a live duplicate
    /// anywhere in a higher (older) level, regardless of where within its own
    /// level that tombstone happens to sit. (This routes through the
    /// merging iterator rather than scanning each level independently; see
    /// `DESIGN.md` for why a per-level scan cannot give this guarantee.)
    #[must_use]
    pub fn lower_bound(&self, key: &K) -> Option<(&K, &V)> {
        MergingIter::new_at_or_after(self, key).next()
    }

    /// Returns a deletion-consistent, ascending iterator over every live key,
    /// starting strictly after `after` (or from the very first key when
    /// `after` is `None`).
    #[must_use]
    pub fn iter_from(&self, after: Option<K>) -> MergingIter<'_, K, V, Idx, T> {
        MergingIter::new(self, after)
    }

    /// Returns a deletion-consistent, ascending iterator over every live key.
    #[must_use]
    pub fn iter(&self) -> MergingIter<'_, K, V, Idx, T> {
        self.iter_from(None)
    }

    /// Builds an index directly from an ascending, pre-sorted sequence of
    /// key/value pairs, placing the (deduplicated) result at the smallest
    /// level whose capacity fits it.
    ///
    /// Unlike streaming `insert`, which keeps the *last* write for a
    /// repeated key, this keeps the *first* occurrence within a consecutive
    /// run of equal keys — both behaviors are preserved intentionally, see
    /// `DESIGN.md`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if `config` itself is
    /// inconsistent (see [`Config::build`]).
    ///
    /// In debug builds, returns [`crate::Error::UnsortedInput`] if `sorted`
    /// turns out not to be ascending by key. Release builds skip the check
    /// and trust the caller; an unsorted input is then an unspecified-result
    /// contract violation rather than a detected error.
    pub fn bulk_load<I>(config: Config, sorted: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let config = config.build()?;
        let mut deduped: Vec<Item<K, V, T>> = Vec::new();

        for (key, value) in sorted {
            if let Some(last) = deduped.last() {
                if cfg!(debug_assertions) && last.key() > &key {
                    return Err(crate::error::Error::UnsortedInput);
                }
                if last.key() == &key {
                    // Stable-first-wins: the first occurrence in a run of
                    // equal keys is kept, later ones in the same run dropped.
                    continue;
                }
            }
            deduped.push(Item::new(key, value));
        }

        let n = deduped.len();
        let top_level = if n == 0 {
            config.min_level
        } else {
            ceil_log2(n).max(config.min_level)
        };

        let mut index = Self::new(config);
        index.ensure_allocated(top_level);

        if n > 0 {
            index.used_levels = top_level + 1;
            let vi = index.vi(top_level);
            index.levels[vi].set_items(deduped);

            if top_level >= config.min_indexed_level {
                let level = &index.levels[vi];
                index.indices[vi] = Idx::build(level.keys(), level.len());
            }
        }

        Ok(index)
    }
}

/// Smallest `i` such that `2^i >= n` (with `ceil_log2(0) == 0`).
fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}
