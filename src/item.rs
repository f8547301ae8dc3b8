// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The per-entry record stored in every [`crate::level::Level`].
//!
//! The source design picks between two physical layouts at type-resolution
//! time: a sentinel-value encoding for pointer-like `V` (keeps `Item` packed
//! to `sizeof(K) + sizeof(V)`) and an explicit deletion flag for everything
//! else. Rust's generics give us the same "chosen once, monomorphized" cost
//! model without needing `unsafe` bit-packing, via the [`TombstoneTag`] trait.

use std::cmp::Ordering;
use std::marker::PhantomData;

/// Implemented by value types that can supply a dedicated sentinel used to mark
/// deletion in-place, enabling the space-optimized [`SentinelTag`] layout.
///
/// The sentinel must be stable for the lifetime of every index sharing `Self`,
/// and a legitimate `insert(k, v)` must never be called with `v == Self::sentinel()`.
pub trait SentinelValue: PartialEq {
    /// Returns the value used to represent a tombstone.
    fn sentinel() -> Self;
}

/// Encodes how an [`Item`] represents "this key has been deleted".
///
/// Implementations are zero-sized markers selected as `Item`'s third type
/// parameter; this is resolved entirely at compile time.
pub trait TombstoneTag<V>: Copy + Default {
    /// Tag value for a freshly constructed live item.
    fn live() -> Self;

    /// Tag value for a freshly constructed tombstone. May also need to adjust
    /// `value` (the sentinel variant encodes deletion in the value itself).
    fn tombstone(value: &mut V) -> Self;

    /// Reports whether `value` (tagged with `self`) represents a deletion.
    fn is_deleted(&self, value: &V) -> bool;

    /// Marks an existing item deleted in place.
    fn mark_deleted(&mut self, value: &mut V);

    /// Whether inserting `value` as a live record would be indistinguishable
    /// from a tombstone under this tag. Always `false` for [`ExplicitFlag`];
    /// [`SentinelTag`] overrides this to compare against the reserved
    /// sentinel.
    fn would_collide(_value: &V) -> bool {
        false
    }
}

/// The default, always-available tag: a dedicated boolean deletion flag.
///
/// Matches the source's "non-pointer variant" contract: works for any `V`, at
/// the cost of one extra flag byte per item (the source bit-packs this flag;
/// we keep it as a plain `bool` field, see `DESIGN.md`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExplicitFlag(bool);

impl<V> TombstoneTag<V> for ExplicitFlag {
    fn live() -> Self {
        Self(false)
    }

    fn tombstone(_value: &mut V) -> Self {
        Self(true)
    }

    fn is_deleted(&self, _value: &V) -> bool {
        self.0
    }

    fn mark_deleted(&mut self, _value: &mut V) {
        self.0 = true;
    }
}

/// The space-optimized tag for pointer-like `V`: deletion is encoded by
/// overwriting the value with `V::sentinel()`, so the tag itself is
/// zero-sized and `Item`'s footprint is exactly `sizeof(K) + sizeof(V)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SentinelTag<V>(PhantomData<fn() -> V>);

impl<V: SentinelValue> TombstoneTag<V> for SentinelTag<V> {
    fn live() -> Self {
        Self(PhantomData)
    }

    fn tombstone(value: &mut V) -> Self {
        *value = V::sentinel();
        Self(PhantomData)
    }

    fn is_deleted(&self, value: &V) -> bool {
        *value == V::sentinel()
    }

    fn mark_deleted(&mut self, value: &mut V) {
        *value = V::sentinel();
    }

    fn would_collide(value: &V) -> bool {
        *value == V::sentinel()
    }
}

/// A single key/value record, optionally marked as a tombstone.
///
/// Ordering and equality only ever consider `key` — a tombstone for key *k*
/// compares equal to a live record for *k*, which is what lets a level stay a
/// flat `Vec` sorted purely by key while still letting deletions shadow
/// earlier records during point lookups and merges.
pub struct Item<K, V, T: TombstoneTag<V> = ExplicitFlag> {
    key: K,
    value: V,
    tag: T,
}

impl<K, V, T: TombstoneTag<V>> Item<K, V, T> {
    /// Builds a live record.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            tag: T::live(),
        }
    }

    /// Builds a tombstone for `key`.
    ///
    /// `placeholder` is only observed by the [`ExplicitFlag`] layout (which
    /// ignores it and relies on the flag); the [`SentinelTag`] layout
    /// overwrites it with the sentinel. Callers with a `Default` value type
    /// can use [`Item::tombstone_default`] instead.
    pub fn tombstone_with(key: K, mut placeholder: V) -> Self {
        let tag = T::tombstone(&mut placeholder);
        Self {
            key,
            value: placeholder,
            tag,
        }
    }

    /// Returns a reference to the key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns a reference to the value. For a tombstone in the sentinel
    /// layout this is the sentinel itself; callers should check
    /// [`Item::is_deleted`] first.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Reports whether this item is a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.tag.is_deleted(&self.value)
    }

    /// Marks this item deleted in place (used by `erase` when overwriting the
    /// bottom level directly).
    pub fn mark_deleted(&mut self) {
        self.tag.mark_deleted(&mut self.value);
    }
}

impl<K, V, T: TombstoneTag<V>> Item<K, V, T>
where
    V: Default,
{
    /// Builds a tombstone for `key` using `V::default()` as the placeholder
    /// value. Convenient when `V` has no natural "unset" value for the
    /// explicit-flag layout.
    pub fn tombstone_default(key: K) -> Self {
        Self::tombstone_with(key, V::default())
    }
}

impl<K: Clone, V: Clone, T: TombstoneTag<V>> Clone for Item<K, V, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            tag: self.tag,
        }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, T: TombstoneTag<V>> std::fmt::Debug for Item<K, V, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_deleted() {
            write!(f, "{:?} => <tombstone>", self.key)
        } else {
            write!(f, "{:?} => {:?}", self.key, self.value)
        }
    }
}

impl<K: PartialEq, V, T: TombstoneTag<V>> PartialEq for Item<K, V, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V, T: TombstoneTag<V>> Eq for Item<K, V, T> {}

impl<K: PartialOrd, V, T: TombstoneTag<V>> PartialOrd for Item<K, V, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

// Order by key only. This is the one invariant every other module leans on:
// a tombstone and a live record for the same key are "equal" as far as
// sortedness and binary search are concerned.
impl<K: Ord, V, T: TombstoneTag<V>> Ord for Item<K, V, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn explicit_flag_roundtrip() {
        let live = Item::<_, _, ExplicitFlag>::new(1, "a");
        assert!(!live.is_deleted());

        let dead = Item::<_, _, ExplicitFlag>::tombstone_default(1);
        assert!(dead.is_deleted());
    }

    #[test]
    fn tombstone_compares_equal_to_live_for_same_key() {
        let live = Item::<_, _, ExplicitFlag>::new(5, "a");
        let dead = Item::<_, _, ExplicitFlag>::tombstone_default(5);
        assert_eq!(live, dead);
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Handle(u64);

    impl SentinelValue for Handle {
        fn sentinel() -> Self {
            Handle(u64::MAX)
        }
    }

    #[test]
    fn sentinel_tag_marks_deletion_via_value() {
        let mut item = Item::<_, _, SentinelTag<Handle>>::new(1, Handle(42));
        assert!(!item.is_deleted());

        item.mark_deleted();
        assert!(item.is_deleted());
        assert_eq!(Handle::sentinel(), *item.value());
    }

    #[test]
    fn only_the_sentinel_tag_reports_collisions() {
        assert!(!ExplicitFlag::would_collide(&Handle::sentinel()));
        assert!(<SentinelTag<Handle> as TombstoneTag<Handle>>::would_collide(
            &Handle::sentinel()
        ));
        assert!(!<SentinelTag<Handle> as TombstoneTag<Handle>>::would_collide(
            &Handle(1)
        ));
    }
}
