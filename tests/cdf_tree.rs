use std::cell::Cell;
use std::rc::Rc;

use cdf_tree::{CdfTree, Error, NodeHandle, Power, Uniform, Weigher};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use static_assertions::assert_impl_all;

assert_impl_all!(CdfTree<i64, String>: Send, Sync, Default);
assert_impl_all!(CdfTree<i64, (), Power>: Send, Sync);
assert_impl_all!(NodeHandle: Copy, Send, Sync, Eq, core::hash::Hash);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn keys<W, C>(tree: &CdfTree<i64, (), W, C>) -> Vec<i64> {
    tree.iter().map(|(&k, ())| k).collect()
}

/// Asserts `a` and `b` agree up to rounding errors of sums bounded by `scale`.
fn assert_close(a: f64, b: f64, scale: f64) {
    assert!((a - b).abs() <= 1e-9 * scale.max(1.0), "{a} != {b}");
}

// ─── Worked scenarios ────────────────────────────────────────────────────────

#[test]
fn uniform_ranks_are_order_statistics() {
    init_logger();
    let mut tree = CdfTree::new(Uniform);
    let handles: Vec<NodeHandle> = [5, 1, 3, 8, 2]
        .into_iter()
        .map(|k| tree.insert(k, ()).unwrap())
        .collect();
    let node = |key: i64| tree.find(&key).unwrap();

    assert_eq!(tree.rank(node(3)), Ok(2.0));
    assert_eq!(tree.rank(node(1)), Ok(0.0));
    assert_eq!(tree.rank(node(8)), Ok(4.0));
    assert_eq!(tree.rank(handles[0]), Ok(3.0));
    assert_eq!(tree.total_weight(), 5.0);
    tree.validate().unwrap();
}

#[test]
fn removal_shifts_later_ranks() {
    init_logger();
    let mut tree = CdfTree::new(Uniform);
    for key in [5, 1, 3, 8, 2] {
        tree.insert(key, ()).unwrap();
    }
    let three = tree.find(&3).unwrap();
    let one = tree.find(&1).unwrap();

    assert_eq!(tree.remove(one), Ok((1, ())));
    assert_eq!(tree.rank(three), Ok(1.0));
    assert_eq!(keys(&tree), [2, 3, 5, 8]);
    tree.validate().unwrap();
}

#[test]
fn power_weights_accumulate() {
    init_logger();
    let mut tree = CdfTree::new(Power::new(2.0).unwrap());
    for key in [1, 2, 3] {
        tree.insert(key, ()).unwrap();
    }
    let three = tree.find(&3).unwrap();
    assert_eq!(tree.rank(three), Ok(5.0));
    assert_eq!(tree.own_weight(three), Ok(9.0));
    assert_eq!(tree.total_weight(), 14.0);
    assert_eq!(tree.cdf(three), Ok(5.0 / 14.0));
}

#[test]
fn removing_sorted_prefix_and_suffix_keeps_ranks() {
    init_logger();
    const N: i64 = 4_096;
    const M: usize = 1_024;
    const M2: usize = 1_000;

    let weigher = Power::new(2.0).unwrap();
    let mut tree = CdfTree::new(weigher);
    // A fixed permutation of 0..N: 1_237 is coprime with 4_096.
    let mut sorted: Vec<(i64, NodeHandle)> = (0..N)
        .map(|i| (i * 1_237) % N)
        .map(|k| (k, tree.insert(k, ()).unwrap()))
        .collect();
    sorted.sort_unstable_by_key(|&(k, _)| k);

    let suffix = sorted.split_off(sorted.len() - M2);
    let remaining = sorted.split_off(M);
    for (key, handle) in sorted.into_iter().chain(suffix) {
        assert_eq!(tree.remove(handle), Ok((key, ())));
    }

    tree.validate().unwrap();
    assert_eq!(keys(&tree), remaining.iter().map(|&(k, _)| k).collect::<Vec<_>>());
    let mut expected = 0.0;
    for &(key, handle) in &remaining {
        assert_eq!(tree.rank(handle), Ok(expected), "rank of {key}");
        expected += weigher.weight(&key);
    }
    assert_eq!(tree.total_weight(), expected);
}

/// Random keys, a fractional exponent and deletions by key lookup from both
/// ends of the insertion order.
#[test]
fn random_keys_with_fractional_exponent() {
    init_logger();
    const N: usize = 20_000;
    const M: usize = 5_000;
    const M2: usize = 4_000;

    let mut rng = StdRng::seed_from_u64(0x5eed_cafe);
    let weigher = Power::new(2.5).unwrap();
    let mut tree = CdfTree::new(weigher);
    let array: Vec<i64> = (0..N).map(|_| rng.gen_range(0..1_000_000)).collect();
    for &key in &array {
        tree.insert(key, ()).unwrap();
    }

    for key in array[..M].iter().chain(&array[N - M2..]) {
        let handle = tree.find(key).expect("inserted key is present");
        assert_eq!(tree.remove(handle).map(|(k, ())| k), Ok(*key));
    }

    let mut remaining = array[M..N - M2].to_vec();
    remaining.sort_unstable();
    tree.validate().unwrap();
    assert_eq!(keys(&tree), remaining);

    let total = tree.total_weight();
    let mut expected = 0.0;
    for (handle, key) in tree.handles().zip(&remaining) {
        assert_close(tree.rank(handle).unwrap(), expected, total);
        expected += weigher.weight(key);
    }
    assert_close(total, expected, total);
}

// ─── Handles ─────────────────────────────────────────────────────────────────

#[test]
fn stale_handles_are_rejected() {
    let mut tree = CdfTree::new(Uniform);
    let handle = tree.insert(1, "one").unwrap();
    tree.remove(handle).unwrap();

    assert!(!tree.contains(handle));
    assert_eq!(tree.get(handle), Err(Error::StaleHandle(handle)));
    assert_eq!(tree.rank(handle), Err(Error::StaleHandle(handle)));
    assert_eq!(tree.successor(handle), Err(Error::StaleHandle(handle)));
    assert_eq!(tree.remove(handle), Err(Error::StaleHandle(handle)));

    // The freed slot is reused, but the old handle stays dead.
    let reused = tree.insert(2, "two").unwrap();
    assert_ne!(reused, handle);
    assert_eq!(tree.value(handle), Err(Error::StaleHandle(handle)));
    assert_eq!(tree.value(reused), Ok(&"two"));
}

#[test]
fn foreign_handles_are_rejected() {
    let mut a = CdfTree::new(Uniform);
    let mut b = CdfTree::new(Uniform);
    let from_a = a.insert(1, ()).unwrap();
    b.insert(1, ()).unwrap();

    assert_eq!(b.key(from_a), Err(Error::ForeignHandle(from_a)));
    assert_eq!(b.remove(from_a), Err(Error::ForeignHandle(from_a)));
    assert_eq!(b.len(), 1);
    assert_eq!(a.key(from_a), Ok(&1));
}

#[test]
fn clear_invalidates_every_handle() {
    let mut tree = CdfTree::new(Uniform);
    let handles: Vec<_> = (0..10).map(|k| tree.insert(k, ()).unwrap()).collect();
    tree.clear();

    assert!(tree.is_empty());
    assert_eq!(tree.total_weight(), 0.0);
    assert_eq!(tree.first(), None);
    for handle in handles {
        assert_eq!(tree.get(handle), Err(Error::StaleHandle(handle)));
    }
    tree.insert(3, ()).unwrap();
    assert_eq!(keys(&tree), [3]);
    tree.validate().unwrap();
}

#[test]
fn handles_survive_unrelated_removals() {
    let mut tree = CdfTree::new(Uniform);
    let handles: Vec<_> = (0..200).map(|k| tree.insert(k, k * 2).unwrap()).collect();
    for handle in handles.iter().step_by(3) {
        tree.remove(*handle).unwrap();
    }
    for (k, handle) in (0..200).zip(&handles) {
        if k % 3 == 0 {
            assert!(!tree.contains(*handle));
        } else {
            assert_eq!(tree.get(*handle), Ok((&k, &(k * 2))));
        }
    }
    tree.validate().unwrap();
}

#[test]
fn value_mut_updates_in_place() {
    let mut tree = CdfTree::new(Uniform);
    let handle = tree.insert("key", vec![1]).unwrap();
    tree.value_mut(handle).unwrap().push(2);
    assert_eq!(tree.value(handle), Ok(&vec![1, 2]));
    assert_eq!(tree.rank(handle), Ok(0.0));
}

// ─── Duplicates and ordering ─────────────────────────────────────────────────

#[test]
fn equal_keys_newest_first() {
    let mut tree = CdfTree::new(Uniform);
    for value in 0..3 {
        tree.insert(5, value).unwrap();
    }
    tree.insert(4, 10).unwrap();
    tree.insert(6, 11).unwrap();

    let values: Vec<i32> = tree.iter().map(|(_, &v)| v).collect();
    assert_eq!(values, [10, 2, 1, 0, 11]);
    assert_eq!(tree.rank_of_key(&5), 1.0);
    assert_eq!(tree.rank_of_key(&6), 4.0);

    let ranks: Vec<f64> = tree.handles().map(|h| tree.rank(h).unwrap()).collect();
    assert_eq!(ranks, [0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(tree.key(tree.find(&5).unwrap()), Ok(&5));
}

#[test]
fn custom_comparator_and_closure_weigher() {
    let mut tree = CdfTree::with_comparator(
        |a: &String, b: &String| a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        |s: &String| s.len() as f64,
    );
    for word in ["ccc", "a", "bb", "dddd"] {
        tree.insert(word.to_owned(), ()).unwrap();
    }

    let order: Vec<&str> = tree.iter().map(|(k, ())| k.as_str()).collect();
    assert_eq!(order, ["a", "bb", "ccc", "dddd"]);
    let dddd = tree.find(&"dddd".to_owned()).unwrap();
    assert_eq!(tree.rank(dddd), Ok(6.0));
    assert_eq!(tree.total_weight(), 10.0);
    assert_eq!(tree.rank_of_key(&"zz".to_owned()), 3.0);
    tree.validate().unwrap();
}

#[test]
fn zero_weights_give_zero_cdf() {
    let mut tree = CdfTree::new(|_: &i32| 0.0);
    let handles: Vec<_> = (0..5).map(|k| tree.insert(k, ()).unwrap()).collect();
    for handle in handles {
        assert_eq!(tree.rank(handle), Ok(0.0));
        assert_eq!(tree.cdf(handle), Ok(0.0));
    }
    assert_eq!(tree.range(&1, &3).count(), 3);
    tree.validate().unwrap();
}

// ─── Weights ─────────────────────────────────────────────────────────────────

#[test]
fn invalid_weights_are_rejected() {
    init_logger();
    let mut tree = CdfTree::with_comparator(|a: &f64, b: &f64| a.total_cmp(b), |x: &f64| *x);
    tree.insert(1.5, ()).unwrap();

    for bad in [f64::NAN, f64::INFINITY, -1.0] {
        let result = tree.insert(bad, ());
        assert!(matches!(result, Err(Error::InvalidWeight { .. })), "{bad} accepted");
    }
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.total_weight(), 1.5);
    tree.validate().unwrap();

    assert_eq!(Power::new(f64::INFINITY), Err(Error::InvalidExponent(f64::INFINITY)));
}

#[test]
fn negative_key_under_fractional_power_is_rejected() {
    let mut tree = CdfTree::new(Power::new(0.5).unwrap());
    let err = tree.insert(-4_i64, ()).unwrap_err();
    assert!(matches!(err, Error::InvalidWeight { weight } if weight.is_nan()));
    assert!(tree.is_empty());

    // Integral exponents of negative keys are fine when the result is positive.
    let mut squares = CdfTree::new(Power::new(2.0).unwrap());
    squares.insert(-3_i64, ()).unwrap();
    assert_eq!(squares.total_weight(), 9.0);
    assert!(squares.insert(-3_i64, ()).is_ok());
    assert!(CdfTree::new(Power::new(3.0).unwrap()).insert(-3_i64, ()).is_err());
}

#[test]
fn insert_then_remove_restores_ranks() {
    let mut tree = CdfTree::new(Power::new(1.0).unwrap());
    for key in [10, 40, 20, 30] {
        tree.insert(key, ()).unwrap();
    }
    let before: Vec<(i64, f64)> = tree
        .handles()
        .map(|h| (*tree.key(h).unwrap(), tree.rank(h).unwrap()))
        .collect();
    let total = tree.total_weight();

    let extra = tree.insert(25, ()).unwrap();
    assert_eq!(tree.rank(extra), Ok(30.0));
    tree.remove(extra).unwrap();

    let after: Vec<(i64, f64)> = tree
        .handles()
        .map(|h| (*tree.key(h).unwrap(), tree.rank(h).unwrap()))
        .collect();
    assert_eq!(after, before);
    assert_eq!(tree.total_weight(), total);
}

#[test]
fn try_extend_stops_at_first_invalid_weight() {
    let mut tree = CdfTree::new(Power::new(0.5).unwrap());
    let result = tree.try_extend([(4, 'a'), (9, 'b'), (-1, 'c'), (16, 'd')]);
    assert!(matches!(result, Err(Error::InvalidWeight { .. })));
    assert_eq!(tree.iter().map(|(_, &v)| v).collect::<String>(), "ab");
    assert_eq!(tree.total_weight(), 5.0);
}

// ─── Iteration and ranges ────────────────────────────────────────────────────

#[test]
fn iter_is_double_ended_and_exact() {
    let mut tree = CdfTree::new(Uniform);
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(key, ()).unwrap();
    }

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 7);
    assert_eq!(iter.next(), Some((&1, &())));
    assert_eq!(iter.next_back(), Some((&7, &())));
    assert_eq!(iter.len(), 5);
    let middle: Vec<i64> = iter.by_ref().map(|(&k, ())| k).collect();
    assert_eq!(middle, [2, 3, 4, 5, 6]);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);

    let reversed: Vec<i64> = tree.iter().rev().map(|(&k, ())| k).collect();
    assert_eq!(reversed, [7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(tree.handles().rev().next(), tree.last());
    assert_eq!((&tree).into_iter().count(), 7);
}

#[test]
fn range_bounds_are_inclusive() {
    let mut tree = CdfTree::new(Uniform);
    for key in [10, 20, 20, 30, 40] {
        tree.insert(key, ()).unwrap();
    }
    let collect = |low: i64, high: i64| -> Vec<i64> { tree.range(&low, &high).map(|(&k, ())| k).collect() };

    assert_eq!(collect(20, 30), [20, 20, 30]);
    assert_eq!(collect(15, 35), [20, 20, 30]);
    assert_eq!(collect(i64::MIN, i64::MAX), [10, 20, 20, 30, 40]);
    assert_eq!(collect(40, 40), [40]);
    assert_eq!(collect(21, 29), Vec::<i64>::new());
    assert_eq!(collect(41, 50), Vec::<i64>::new());
    assert_eq!(collect(30, 20), Vec::<i64>::new());

    let back: Vec<i64> = tree.range(&10, &30).rev().map(|(&k, ())| k).collect();
    assert_eq!(back, [30, 20, 20, 10]);

    let mut both = tree.range(&20, &40);
    assert_eq!(both.next(), Some((&20, &())));
    assert_eq!(both.next_back(), Some((&40, &())));
    assert_eq!(both.next_back(), Some((&30, &())));
    assert_eq!(both.next(), Some((&20, &())));
    assert_eq!(both.next(), None);
    assert_eq!(both.next_back(), None);
}

#[test]
fn debug_prints_entries_in_order() {
    let mut tree = CdfTree::new(Uniform);
    tree.insert(2, "b").unwrap();
    tree.insert(1, "a").unwrap();
    assert_eq!(format!("{tree:?}"), r#"{1: "a", 2: "b"}"#);
    assert_eq!(format!("{:?}", tree.iter()), r#"[(1, "a"), (2, "b")]"#);
}

#[test]
fn default_and_capacity() {
    let mut tree: CdfTree<u8, ()> = CdfTree::default();
    tree.insert(1, ()).unwrap();
    assert_eq!(tree.total_weight(), 1.0);

    let mut tree: CdfTree<u8, ()> = CdfTree::with_capacity(16, Uniform);
    let capacity = tree.capacity();
    assert!(capacity >= 16);
    for key in 0..16 {
        tree.insert(key, ()).unwrap();
    }
    assert_eq!(tree.capacity(), capacity);
}

// ─── Drop semantics ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct DropCounter(Rc<Cell<usize>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn entries_are_dropped_exactly_once() {
    let drops = Rc::new(Cell::new(0));
    let mut tree = CdfTree::new(Uniform);
    let handles: Vec<_> = (0..100)
        .map(|k| tree.insert(k, DropCounter(Rc::clone(&drops))).unwrap())
        .collect();

    let (_, removed) = tree.remove(handles[50]).unwrap();
    assert_eq!(drops.get(), 0);
    drop(removed);
    assert_eq!(drops.get(), 1);

    tree.clear();
    assert_eq!(drops.get(), 100);

    for k in 0..10 {
        tree.insert(k, DropCounter(Rc::clone(&drops))).unwrap();
    }
    drop(tree);
    assert_eq!(drops.get(), 110);
}

// ─── Randomized model test ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64),
    Remove(usize),
    RankOfKey(i64),
    Range(i64, i64),
}

fn key_strategy() -> impl Strategy<Value = i64> {
    // Narrow enough to produce plenty of duplicates.
    -100i64..100
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        5 => key_strategy().prop_map(TreeOp::Insert),
        3 => any::<usize>().prop_map(TreeOp::Remove),
        1 => key_strategy().prop_map(TreeOp::RankOfKey),
        1 => (key_strategy(), key_strategy()).prop_map(|(low, high)| TreeOp::Range(low, high)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Replays random operations against a sorted `Vec` that places each new
    /// key before its equals, and compares order, handles and ranks after
    /// every step. Squared integer keys keep every sum exact.
    #[test]
    fn ops_match_sorted_vec(ops in proptest::collection::vec(tree_op_strategy(), 0..300)) {
        let weigher = Power::new(2.0).unwrap();
        let mut tree = CdfTree::new(weigher);
        let mut model: Vec<(i64, NodeHandle)> = Vec::new();
        let weight_below = |model: &[(i64, NodeHandle)], key: i64| -> f64 {
            model.iter().filter(|&&(k, _)| k < key).map(|(k, _)| weigher.weight(k)).sum()
        };

        for op in &ops {
            match *op {
                TreeOp::Insert(key) => {
                    let handle = tree.insert(key, ()).unwrap();
                    let at = model.partition_point(|&(k, _)| k < key);
                    model.insert(at, (key, handle));
                }
                TreeOp::Remove(which) => {
                    if model.is_empty() {
                        continue;
                    }
                    let (key, handle) = model.remove(which % model.len());
                    prop_assert_eq!(tree.remove(handle), Ok((key, ())));
                    prop_assert!(!tree.contains(handle));
                }
                TreeOp::RankOfKey(key) => {
                    prop_assert_eq!(tree.rank_of_key(&key), weight_below(&model, key));
                }
                TreeOp::Range(low, high) => {
                    let got: Vec<i64> = tree.range(&low, &high).map(|(&k, ())| k).collect();
                    let expected: Vec<i64> =
                        model.iter().map(|&(k, _)| k).filter(|k| (low..=high).contains(k)).collect();
                    prop_assert_eq!(got, expected, "range({}, {})", low, high);
                }
            }

            prop_assert!(tree.validate().is_ok());
            prop_assert_eq!(tree.len(), model.len());
            let handles: Vec<NodeHandle> = tree.handles().collect();
            let expected: Vec<NodeHandle> = model.iter().map(|&(_, h)| h).collect();
            prop_assert_eq!(handles, expected);

            let mut prefix = 0.0;
            for &(key, handle) in &model {
                prop_assert_eq!(tree.rank(handle), Ok(prefix), "rank of {}", key);
                prefix += weigher.weight(&key);
            }
            prop_assert_eq!(tree.total_weight(), prefix);
        }
    }
}
