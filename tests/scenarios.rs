//! Black-box scenarios exercised purely through the public API, as opposed
//! to the white-box unit tests living alongside each module.

use dynamic_learned_index::{Config, DynamicIndex};
use test_log::test;

fn tiny_config() -> Config {
    // A small bottom buffer so a handful of inserts is enough to force a
    // cascade, instead of needing tens of thousands of keys.
    Config::new()
        .min_level(3)
        .min_indexed_level(6)
        .max_fully_allocated_level(8)
        .init_levels(8)
        .build()
        .expect("valid config")
}

#[test]
fn overwrite_and_lower_bound() {
    let mut index: DynamicIndex<i32, &str> = DynamicIndex::new(tiny_config());

    index.insert(5, "a");
    index.insert(3, "b");
    index.insert(5, "c");

    assert_eq!(Some(&"c"), index.find(&5));
    assert_eq!(Some(&"b"), index.find(&3));
    assert_eq!(Some((&5, &"c")), index.lower_bound(&4));
}

#[test]
fn erase_reported_as_absent_with_correct_neighbors() {
    let mut index: DynamicIndex<i32, i32> = DynamicIndex::new(tiny_config());

    for k in 1..200 {
        index.insert(k, k);
    }
    index.erase(100);

    assert_eq!(None, index.find(&100));
    assert_eq!(Some((&99, &99)), index.lower_bound(&99));
    assert_eq!(Some((&101, &101)), index.lower_bound(&100));
}

#[test]
fn forcing_multiple_cascades_keeps_every_key_reachable() {
    let config = tiny_config();
    let n: i32 = 1 << (config.min_level + 2);
    let mut index: DynamicIndex<i32, i32> = DynamicIndex::new(config);

    for k in 0..n {
        index.insert(k, k * 10);
    }

    assert_eq!(n as usize, index.iter().count());

    for k in 0..n {
        assert_eq!(Some(&(k * 10)), index.find(&k), "key {k} unreachable via find");
    }

    let via_iter: Vec<_> = index.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<_> = (0..n).map(|k| (k, k * 10)).collect();
    assert_eq!(expected, via_iter);
}

#[test]
fn bulk_construction_keeps_first_occurrence_of_duplicates() {
    let index: DynamicIndex<i32, &str> =
        DynamicIndex::bulk_load(tiny_config(), vec![(1, "a"), (1, "b"), (2, "c")])
            .expect("valid config");

    assert_eq!(Some(&"a"), index.find(&1));
    assert_eq!(Some(&"c"), index.find(&2));
}

#[test]
fn tombstone_does_not_survive_a_merge_into_the_top_level() {
    let config = tiny_config();
    let n: i32 = 1 << (config.min_level + 3);
    let mut index: DynamicIndex<i32, &str> = DynamicIndex::new(config);

    index.insert(7, "first");
    index.erase(7);
    index.insert(7, "second");

    // Push enough further writes through the hierarchy that the level
    // holding key 7 eventually cascades into the topmost used level.
    for k in 0..n {
        index.insert(k + 1000, "filler");
    }

    assert_eq!(Some(&"second"), index.find(&7));
}

#[test]
fn iterator_reflects_inserts_minus_erases() {
    let mut index: DynamicIndex<i32, i32> = DynamicIndex::new(tiny_config());
    let mut expected = std::collections::BTreeMap::new();

    for k in 0..300 {
        index.insert(k, k);
        expected.insert(k, k);
    }

    for k in (0..300).step_by(3) {
        index.erase(k);
        expected.remove(&k);
    }

    let via_iter: Vec<_> = index.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<_> = expected.into_iter().collect();
    assert_eq!(expected, via_iter);
}
