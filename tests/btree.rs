use std::collections::BTreeMap;
use std::fmt::Write;

use mbtree::BTree;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

type SmallTree = BTree<i32, i32, 3>;

/// Renders the keys in cursor order as `k1,k2,...,`.
fn render<V, const ORDER: usize>(tree: &BTree<i32, V, ORDER>) -> String {
    let mut out = String::new();
    let mut cursor = tree.begin();
    while cursor != tree.end() {
        write!(out, "{},", cursor.key(tree).unwrap()).unwrap();
        cursor.advance(tree).unwrap();
    }
    out
}

fn key_strategy() -> impl Strategy<Value = i64> {
    // Small enough to force plenty of collisions over TEST_SIZE operations.
    -2_000i64..2_000i64
}

// ─── Literal scenario ────────────────────────────────────────────────────────

#[test]
fn order_three_scenario() {
    let mut tree = SmallTree::with_order();
    for key in 1..=9 {
        tree.insert(key, 0);
    }

    tree.erase(&4);
    assert_eq!(render(&tree), "1,2,3,5,6,7,8,9,");

    for key in [20, 21, 22, 10, 11, 12] {
        tree.insert(key, 0);
    }
    assert_eq!(render(&tree), "1,2,3,5,6,7,8,9,10,11,12,20,21,22,");

    tree.erase(&10);
    assert_eq!(render(&tree), "1,2,3,5,6,7,8,9,11,12,20,21,22,");
    tree.insert(10, 1);
    assert_eq!(render(&tree), "1,2,3,5,6,7,8,9,10,11,12,20,21,22,");
    tree.erase(&12);
    assert_eq!(render(&tree), "1,2,3,5,6,7,8,9,10,11,20,21,22,");
    tree.erase(&1);
    assert_eq!(render(&tree), "2,3,5,6,7,8,9,10,11,20,21,22,");
    tree.erase(&22);
    assert_eq!(render(&tree), "2,3,5,6,7,8,9,10,11,20,21,");
    tree.erase(&9);
    assert_eq!(render(&tree), "2,3,5,6,7,8,10,11,20,21,");

    assert_eq!(tree.find(&5).key(&tree), Ok(&5));
    assert_eq!(tree.find(&21).key(&tree), Ok(&21));
    assert_eq!(tree.find(&10).key_value(&tree), Ok((&10, &1)));
    assert_eq!(tree.find(&100), tree.end());
    assert_eq!(tree.find(&1), tree.end());
}

#[test]
fn erasing_everything_empties_the_tree() {
    let mut tree = SmallTree::with_order();
    for key in 0..100 {
        tree.insert(key, key);
    }
    for key in (0..100).step_by(2).chain((1..100).step_by(2)) {
        tree.erase(&key);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.begin(), tree.end());
    assert_eq!(render(&tree), "");
}

#[test]
fn erase_of_absent_key_is_a_no_op() {
    let mut tree: SmallTree = (0..10).map(|k| (k, k)).collect();
    let before = tree.clone();
    tree.erase(&42);
    assert_eq!(tree, before);
}

#[test]
fn upsert_replaces_value() {
    let mut tree = SmallTree::with_order();
    assert_eq!(tree.insert(5, 1), None);
    assert_eq!(tree.insert(5, 2), Some(1));
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[&5], 2);
}

#[test]
fn values_need_no_default() {
    struct Opaque(u8);

    let mut tree: BTree<&str, Opaque, 4> = BTree::with_order();
    tree.insert("b", Opaque(2));
    tree.insert("a", Opaque(1));
    assert_eq!(tree.get("a").map(|v| v.0), Some(1));
    assert_eq!(tree.pop_last().map(|(k, v)| (k, v.0)), Some(("b", 2)));
}

#[test]
fn height_stays_logarithmic() {
    let tree: BTree<u32, ()> = (0..100_000).map(|k| (k, ())).collect();
    // Every non-root node holds at least 7 keys, so 8 children.
    assert!(tree.height() <= 7, "height {}", tree.height());
    assert_eq!(tree.len(), 100_000);
}

// ─── Model comparison ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Erase(i64),
    Remove(i64),
    Get(i64),
    Find(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MapOp::Erase),
        2 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::Find),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

fn replay<const ORDER: usize>(ops: &[MapOp]) -> Result<(), TestCaseError> {
    let mut tree: BTree<i64, i64, ORDER> = BTree::with_order();
    let mut model: BTreeMap<i64, i64> = BTreeMap::new();

    for op in ops {
        match *op {
            MapOp::Insert(k, v) => {
                prop_assert_eq!(tree.insert(k, v), model.insert(k, v), "insert({}, {})", k, v);
            }
            MapOp::Erase(k) => {
                tree.erase(&k);
                model.remove(&k);
                prop_assert!(tree.find(&k).is_end(), "find({}) after erase", k);
            }
            MapOp::Remove(k) => {
                prop_assert_eq!(tree.remove(&k), model.remove(&k), "remove({})", k);
            }
            MapOp::Get(k) => {
                prop_assert_eq!(tree.get(&k), model.get(&k), "get({})", k);
            }
            MapOp::Find(k) => {
                let found = tree.find(&k).key_value(&tree).ok();
                prop_assert_eq!(found, model.get_key_value(&k), "find({})", k);
            }
            MapOp::FirstKeyValue => {
                prop_assert_eq!(tree.first_key_value(), model.first_key_value(), "first_key_value");
            }
            MapOp::LastKeyValue => {
                prop_assert_eq!(tree.last_key_value(), model.last_key_value(), "last_key_value");
            }
            MapOp::PopFirst => {
                prop_assert_eq!(tree.pop_first(), model.pop_first(), "pop_first");
            }
            MapOp::PopLast => {
                prop_assert_eq!(tree.pop_last(), model.pop_last(), "pop_last");
            }
        }
        prop_assert_eq!(tree.len(), model.len(), "len mismatch after {:?}", op);
        prop_assert_eq!(tree.is_empty(), model.is_empty(), "is_empty mismatch after {:?}", op);
    }

    let items: Vec<_> = tree.iter().map(|(&k, &v)| (k, v)).collect();
    let expected: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();
    prop_assert_eq!(items, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on both a `BTree` and a `BTreeMap` and asserts
    /// identical results at every step.
    #[test]
    fn ops_match_btreemap_order_3(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        replay::<3>(&ops)?;
    }

    #[test]
    fn ops_match_btreemap_order_4(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        replay::<4>(&ops)?;
    }

    #[test]
    fn ops_match_btreemap_default_order(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        replay::<{ mbtree::DEFAULT_ORDER }>(&ops)?;
    }

    /// In-order traversal is strictly ascending for any insertion sequence.
    #[test]
    fn traversal_is_sorted_and_unique(keys in proptest::collection::vec(key_strategy(), 0..TEST_SIZE)) {
        let tree: BTree<i64, (), 5> = keys.iter().map(|&k| (k, ())).collect();
        let walked: Vec<i64> = tree.keys().copied().collect();
        prop_assert!(walked.windows(2).all(|w| w[0] < w[1]));

        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(walked, expected);
    }

    /// Cursor traversal and borrowing iteration agree.
    #[test]
    fn cursor_walk_matches_iter(keys in proptest::collection::vec(key_strategy(), 0..1_000)) {
        let tree: BTree<i64, i64, 3> = keys.iter().map(|&k| (k, -k)).collect();
        let mut cursor = tree.begin();
        for (k, v) in &tree {
            prop_assert_eq!(cursor.key_value(&tree), Ok((k, v)));
            cursor.advance(&tree).unwrap();
        }
        prop_assert!(cursor.is_end());
    }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

#[test]
fn from_array_and_index() {
    let tree = BTree::from([(3, "c"), (1, "a"), (2, "b")]);
    assert_eq!(tree[&2], "b");
    assert_eq!(format!("{tree:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_of_absent_key_panics() {
    let tree = BTree::from([(1, 1)]);
    let _value = tree[&2];
}

#[test]
fn extend_and_default() {
    let mut tree: BTree<i32, i32> = BTree::default();
    tree.extend((0..10).map(|k| (k, k)));
    tree.extend([(5, 50)]);
    assert_eq!(tree.len(), 10);
    assert_eq!(tree.get(&5), Some(&50));
    assert_eq!(tree.values().sum::<i32>(), 45 - 5 + 50);
}

#[test]
fn clear_then_reuse() {
    let mut tree: SmallTree = (0..50).map(|k| (k, k)).collect();
    tree.clear();
    assert!(tree.is_empty());
    tree.insert(7, 7);
    assert_eq!(render(&tree), "7,");
}
