use std::collections::BTreeSet;

use bptree::{BPTree, Config, Error};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys used by the shuffled scenarios.
const KEYS: i32 = 1_000;

fn shuffled(seed: u64) -> Vec<i32> {
    let mut keys: Vec<i32> = (1..=KEYS).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}

fn tree_with_min(min: usize) -> BPTree<i32> {
    BPTree::with_config(Config::default().min(min)).unwrap()
}

#[track_caller]
fn assert_valid(tree: &BPTree<i32>) {
    let violations = tree.violations();
    assert!(violations.is_empty(), "{violations:#?}\n{}", tree.to_debug_string());
}

// ─── Shuffled insert and remove ──────────────────────────────────────────────

#[test]
fn shuffled_inserts_keep_tree_valid() {
    let mut tree = tree_with_min(1);
    for (inserted, key) in shuffled(1).into_iter().enumerate() {
        assert!(tree.insert(key));
        assert_valid(&tree);
        assert_eq!(tree.len(), inserted + 1);
        assert!(tree.contains(&key));
    }
}

#[test]
fn shuffled_removes_empty_the_tree() {
    let mut tree = tree_with_min(1);
    tree.extend(shuffled(2));
    assert_eq!(tree.len(), KEYS as usize);

    for (removed, key) in shuffled(3).into_iter().enumerate() {
        assert!(tree.remove(&key));
        assert_valid(&tree);
        assert!(!tree.contains(&key));
        assert_eq!(tree.len(), KEYS as usize - removed - 1);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 1);
    assert!(tree.begin().is_end());
}

#[test]
fn wider_nodes_stay_valid() {
    for min in [2, 3, 8] {
        let mut tree = tree_with_min(min);
        for key in shuffled(min as u64) {
            tree.insert(key);
        }
        assert_valid(&tree);
        for key in shuffled(min as u64 + 100).into_iter().take(700) {
            assert!(tree.remove(&key));
            assert_valid(&tree);
        }
        assert_eq!(tree.len(), 300);
    }
}

// ─── Failure leaves the tree alone ───────────────────────────────────────────

#[test]
fn failed_operations_change_nothing() {
    let mut tree = tree_with_min(2);
    tree.extend((0..100).map(|n| n * 2));
    let before = tree.to_debug_string();

    assert!(!tree.insert(40));
    assert!(!tree.remove(&41));
    assert!(!tree.remove(&-1));

    assert_eq!(tree.len(), 100);
    assert_eq!(tree.to_debug_string(), before);
}

// ─── Copies ──────────────────────────────────────────────────────────────────

#[test]
fn copy_is_independent_of_original() {
    let mut original = tree_with_min(1);
    original.extend(1..=KEYS);
    let copy = original.clone();
    assert_valid(&copy);

    for key in 1..=500 {
        assert!(original.remove(&key));
    }
    assert_valid(&original);
    assert_valid(&copy);
    assert_eq!(copy.len(), KEYS as usize);
    assert!((1..=KEYS).all(|key| copy.contains(&key)));
    assert_eq!(original.front(), Ok(&501));
}

#[test]
fn mutating_copy_leaves_original_alone() {
    let original: BPTree<_> = (0..64).collect();
    let mut copy = original.clone();
    copy.clear();
    copy.insert(1_000);

    assert_eq!(original.len(), 64);
    assert_eq!(original.iter().copied().collect::<Vec<_>>(), (0..64).collect::<Vec<_>>());
    assert_eq!(copy.iter().copied().collect::<Vec<_>>(), vec![1_000]);
}

#[test]
fn copy_walks_its_own_leaf_chain() {
    let original: BPTree<_> = shuffled(9).into_iter().collect();
    let copy = original.clone();
    drop(original);
    assert_eq!(copy.iter().copied().collect::<Vec<_>>(), (1..=KEYS).collect::<Vec<_>>());
}

// ─── Bounds ──────────────────────────────────────────────────────────────────

#[test]
fn bounds_on_odd_keys() {
    let tree: BPTree<_> = [1, 3, 5, 7, 9].into_iter().collect();
    assert_eq!(tree.lower_bound(&4).get(), Ok(&5));
    assert_eq!(tree.lower_bound(&5).get(), Ok(&5));
    assert_eq!(tree.upper_bound(&5).get(), Ok(&7));
    assert_eq!(tree.lower_bound(&0).get(), Ok(&1));
    assert_eq!(tree.upper_bound(&9).get(), Err(Error::InvalidIterator));
    assert!(tree.lower_bound(&10).is_end());
}

#[test]
fn bounds_cross_leaf_boundaries() {
    let tree: BPTree<_> = (0..200).map(|n| n * 3).collect();
    for target in 0..600 {
        let expected_lower = (target + 2) / 3 * 3;
        let expected_upper = (target / 3 + 1) * 3;
        assert_eq!(tree.lower_bound(&target).get().ok(), (expected_lower < 600).then_some(&expected_lower));
        assert_eq!(tree.upper_bound(&target).get().ok(), (expected_upper < 600).then_some(&expected_upper));
    }
}

// ─── Cursor and accessors ────────────────────────────────────────────────────

#[test]
fn traversal_is_strictly_ascending() {
    let tree: BPTree<_> = shuffled(4).into_iter().collect();
    let values: Vec<_> = tree.iter().copied().collect();
    assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(values.len(), KEYS as usize);
}

#[test]
fn get_or_insert_creates_once() {
    let mut tree = tree_with_min(1);
    tree.extend([10, 20, 30]);
    assert_eq!(*tree.get_or_insert(20), 20);
    assert_eq!(tree.len(), 3);
    assert_eq!(*tree.get_or_insert(25), 25);
    assert_eq!(tree.len(), 4);
    assert_valid(&tree);
}

#[test]
fn printer_shows_every_entry() {
    let tree: BPTree<_> = (0..40).collect();
    let printed = tree.to_debug_string();
    for key in 0..40 {
        assert!(printed.lines().any(|line| line.trim() == key.to_string()));
    }
    assert_eq!(printed.lines().next().map(str::trim), Some("39"));
}

#[test]
fn duplicates_merge_through_mergeable() {
    #[derive(Clone, Debug)]
    struct Counted(&'static str, u32);

    impl PartialEq for Counted {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }
    impl Eq for Counted {}
    impl PartialOrd for Counted {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Counted {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.0.cmp(other.0)
        }
    }
    impl bptree::Mergeable for Counted {
        fn merge(&mut self, other: Self) {
            self.1 += other.1;
        }
    }

    let mut tree = BPTree::with_duplicates(Config::default().min(1)).unwrap();
    assert!(tree.dups_ok());
    for word in ["b", "a", "b", "c", "b", "a"] {
        assert!(tree.insert(Counted(word, 1)));
    }
    let counts: Vec<_> = tree.iter().map(|entry| (entry.0, entry.1)).collect();
    assert_eq!(counts, vec![("a", 2), ("b", 3), ("c", 1)]);
    assert!(tree.verify(), "{:#?}", tree.violations());
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i16),
    Remove(i16),
    Contains(i16),
    LowerBound(i16),
    UpperBound(i16),
    Clone,
}

fn key_strategy() -> impl Strategy<Value = i16> {
    -500i16..500i16
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        5 => key_strategy().prop_map(TreeOp::Insert),
        4 => key_strategy().prop_map(TreeOp::Remove),
        2 => key_strategy().prop_map(TreeOp::Contains),
        1 => key_strategy().prop_map(TreeOp::LowerBound),
        1 => key_strategy().prop_map(TreeOp::UpperBound),
        1 => Just(TreeOp::Clone),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on both BPTree and BTreeSet,
    /// checking results and every structural invariant at each step.
    #[test]
    fn tree_ops_match_btreeset(min in 1usize..6, ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut tree = BPTree::with_config(Config::default().min(min)).unwrap();
        let mut model = BTreeSet::new();

        for op in &ops {
            match op {
                TreeOp::Insert(key) => {
                    prop_assert_eq!(tree.insert(*key), model.insert(*key), "insert({})", key);
                }
                TreeOp::Remove(key) => {
                    prop_assert_eq!(tree.remove(key), model.remove(key), "remove({})", key);
                }
                TreeOp::Contains(key) => {
                    prop_assert_eq!(tree.contains(key), model.contains(key), "contains({})", key);
                }
                TreeOp::LowerBound(key) => {
                    prop_assert_eq!(tree.lower_bound(key).get().ok(), model.range(key..).next(), "lower_bound({})", key);
                }
                TreeOp::UpperBound(key) => {
                    let expected = model.range((std::ops::Bound::Excluded(key), std::ops::Bound::Unbounded)).next();
                    prop_assert_eq!(tree.upper_bound(key).get().ok(), expected, "upper_bound({})", key);
                }
                TreeOp::Clone => {
                    let copy = tree.clone();
                    prop_assert!(copy.verify());
                    prop_assert_eq!(&copy, &tree);
                }
            }
            prop_assert!(tree.verify(), "{:#?}", tree.violations());
            prop_assert_eq!(tree.len(), model.len());
        }

        prop_assert!(tree.iter().eq(model.iter()));
    }

    #[test]
    fn range_matches_btreeset(
        keys in proptest::collection::vec(key_strategy(), 0..TEST_SIZE),
        start in key_strategy(),
        span in 0i16..200,
    ) {
        let tree: BPTree<_> = keys.iter().copied().collect();
        let model: BTreeSet<_> = keys.iter().copied().collect();
        let end = start.saturating_add(span);

        prop_assert!(tree.range(start..end).eq(model.range(start..end)));
        prop_assert!(tree.range(start..=end).eq(model.range(start..=end)));
        prop_assert!(tree.range(..end).eq(model.range(..end)));
        prop_assert!(tree.range(start..).eq(model.range(start..)));
    }
}
