// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The pairwise logarithmic merge used by every cascade.
//!
//! A cascade folds the bottom level (plus the item that triggered it) and
//! every level below the chosen target into that target, newest-first. This
//! module realizes that as a chain of ordinary two-way merges, alternating
//! between two scratch buffers so no buffer is reallocated mid-cascade —
//! the "ping-pong" the source design describes.

use crate::item::{Item, TombstoneTag};
use std::cmp::Ordering;

/// Merges two sorted runs into `out` (which is cleared first).
///
/// `newer` must outrank `older` on equal keys — the caller is expected to
/// always pass the already-merged accumulator (newer, closer to the write
/// path) as `newer` and the next level being folded in as `older`.
///
/// When `drop_tombstones` is set, any winning tombstone is dropped instead of
/// emitted — this is only true while merging into the topmost used level,
/// where a tombstone has nothing left to shadow.
pub fn merge_two<K, V, T>(
    newer: &[Item<K, V, T>],
    older: &[Item<K, V, T>],
    drop_tombstones: bool,
    out: &mut Vec<Item<K, V, T>>,
) where
    K: Ord + Clone,
    V: Clone,
    T: TombstoneTag<V> + Clone,
{
    out.clear();
    out.reserve(newer.len() + older.len());

    let (mut i, mut j) = (0, 0);

    while i < newer.len() && j < older.len() {
        match newer[i].key().cmp(older[j].key()) {
            Ordering::Less => {
                push_unless_dropped(out, newer[i].clone(), drop_tombstones);
                i += 1;
            }
            Ordering::Greater => {
                push_unless_dropped(out, older[j].clone(), drop_tombstones);
                j += 1;
            }
            Ordering::Equal => {
                // Equal keys: the newer run wins, the older duplicate is discarded.
                push_unless_dropped(out, newer[i].clone(), drop_tombstones);
                i += 1;
                j += 1;
            }
        }
    }

    while i < newer.len() {
        push_unless_dropped(out, newer[i].clone(), drop_tombstones);
        i += 1;
    }

    while j < older.len() {
        push_unless_dropped(out, older[j].clone(), drop_tombstones);
        j += 1;
    }
}

fn push_unless_dropped<K, V, T: TombstoneTag<V>>(
    out: &mut Vec<Item<K, V, T>>,
    item: Item<K, V, T>,
    drop_tombstones: bool,
) {
    if drop_tombstones && item.is_deleted() {
        return;
    }
    out.push(item);
}

/// Folds `runs` (ordered newest-first) into a single sorted, recency- and
/// tombstone-resolved run, via a chain of [`merge_two`] calls that alternate
/// between two reused scratch buffers.
///
/// `drop_tombstones` only applies to the *last* fold. A tombstone dropped at
/// an intermediate fold would vanish before it has had a chance to shadow an
/// older, still-live duplicate sitting in a run further down the chain — the
/// dropped key would then resurface once that later run is folded in. Every
/// intermediate fold therefore always retains tombstones; only the final
/// output run has them eliminated, matching the source's "topmost used
/// level" drop point.
pub fn cascade_merge<K, V, T>(runs: Vec<Vec<Item<K, V, T>>>, drop_tombstones: bool) -> Vec<Item<K, V, T>>
where
    K: Ord + Clone,
    V: Clone,
    T: TombstoneTag<V> + Clone,
{
    let mut runs = runs.into_iter().peekable();

    let Some(mut acc) = runs.next() else {
        return Vec::new();
    };

    let mut buf_a = Vec::new();
    let mut buf_b = Vec::new();
    let mut use_a = true;

    while let Some(run) = runs.next() {
        let is_last = runs.peek().is_none();
        let out = if use_a { &mut buf_a } else { &mut buf_b };
        merge_two(&acc, &run, is_last && drop_tombstones, out);
        acc = std::mem::take(out);
        use_a = !use_a;
    }

    // A single run never goes through merge_two (there is nothing to fold it
    // against), so it is itself the "last fold" — apply the drop directly.
    if drop_tombstones && acc.iter().any(Item::is_deleted) {
        acc.retain(|item| !item.is_deleted());
    }

    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ExplicitFlag;
    use test_log::test;

    type TestItem = Item<i32, &'static str, ExplicitFlag>;

    fn items(pairs: &[(i32, &'static str)]) -> Vec<TestItem> {
        pairs.iter().map(|&(k, v)| Item::new(k, v)).collect()
    }

    fn keys(items: &[TestItem]) -> Vec<i32> {
        items.iter().map(|i| *i.key()).collect()
    }

    #[test]
    fn merge_two_interleaves_and_prefers_newer_on_ties() {
        let newer = items(&[(1, "new"), (3, "new")]);
        let older = items(&[(2, "old"), (3, "old"), (4, "old")]);

        let mut out = Vec::new();
        merge_two(&newer, &older, false, &mut out);

        assert_eq!(vec![1, 2, 3, 4], keys(&out));
        assert_eq!("new", *out[2].value());
    }

    #[test]
    fn drop_tombstones_removes_winning_deletions() {
        let newer = vec![Item::tombstone_default(2)];
        let older = items(&[(1, "old"), (2, "old"), (3, "old")]);

        let mut out = Vec::new();
        merge_two(&newer, &older, true, &mut out);

        assert_eq!(vec![1, 3], keys(&out));
    }

    #[test]
    fn retained_tombstones_still_shadow_older_records() {
        let newer = vec![Item::tombstone_default(2)];
        let older = items(&[(1, "old"), (2, "old"), (3, "old")]);

        let mut out = Vec::new();
        merge_two(&newer, &older, false, &mut out);

        assert_eq!(vec![1, 2, 3], keys(&out));
        assert!(out[1].is_deleted());
    }

    #[test]
    fn cascade_merge_chains_multiple_runs() {
        let runs = vec![
            items(&[(5, "newest")]),
            items(&[(2, "mid"), (5, "mid")]),
            items(&[(1, "old"), (2, "old"), (8, "old")]),
        ];

        let merged = cascade_merge(runs, false);
        assert_eq!(vec![1, 2, 5, 8], keys(&merged));
        assert_eq!("newest", *merged[2].value());
        assert_eq!("mid", *merged[1].value());
    }

    #[test]
    fn cascade_merge_of_empty_runs_list_yields_empty() {
        let runs: Vec<Vec<TestItem>> = vec![];
        assert!(cascade_merge(runs, false).is_empty());
    }

    #[test]
    fn cascade_merge_of_single_run_still_drops_tombstones() {
        let runs = vec![vec![
            Item::new(1, "a"),
            Item::tombstone_default(2),
            Item::new(3, "c"),
        ]];

        let merged = cascade_merge(runs, true);
        assert_eq!(vec![1, 3], keys(&merged));
    }

    #[test]
    fn a_tombstone_shadows_a_live_duplicate_separated_by_a_non_matching_run() {
        // A tombstone for `k` in the newest run must still shadow a live
        // duplicate for `k` sitting two runs down, even though the run in
        // between never mentions `k` at all. Dropping the tombstone at that
        // intermediate fold (rather than only at the final one) would let
        // the older live record resurface.
        let runs = vec![
            vec![Item::tombstone_default(5)],
            items(&[(9, "unrelated")]),
            items(&[(5, "stale"), (9, "also-stale")]),
        ];

        let merged = cascade_merge(runs, true);
        assert_eq!(vec![9], keys(&merged));
        assert_eq!("unrelated", *merged[0].value());
    }
}
