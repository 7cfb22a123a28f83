use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

fn validate_tree(t: &BinTrie, taken: &BTreeSet<u64>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}");

    assert_eq!(
        t.count_free(),
        t.capacity() - taken.len() as u128,
        "free count must match the model"
    );

    for entry in t.debug_dump() {
        if entry.status == Status::Taken {
            assert!(entry.childless, "taken nodes are always collapsed");
        }
    }
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Reserve(u16),
    Release(u16),
    Query(u16),
    Clear,
}

const HEIGHT: u32 = 7;
const KEY_MASK: u64 = (1 << HEIGHT) - 1;

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=1500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t = BinTrie::new(HEIGHT).unwrap();
        let mut m: BTreeSet<u64> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Reserve(key) => {
                    let key = u64::from(key) & KEY_MASK;
                    let expected = if m.insert(key) {
                        Ok(())
                    } else {
                        Err(Error::AlreadyTaken { key })
                    };
                    prop_assert_eq!(t.reserve(key), expected);
                }
                Op::Release(key) => {
                    let key = u64::from(key) & KEY_MASK;
                    let expected = if m.remove(&key) {
                        Ok(())
                    } else {
                        Err(Error::NotFound { key })
                    };
                    prop_assert_eq!(t.release(key), expected);
                }
                Op::Query(key) => {
                    let key = u64::from(key) & KEY_MASK;
                    prop_assert_eq!(t.is_taken(key), Ok(m.contains(&key)));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.count_taken(), m.len() as u128);
        }

        validate_tree(&t, &m);
    }

    #[test]
    fn prop_out_of_range_is_rejected(height in 1u32..64, excess in 0u64..1024) {
        let mut t = BinTrie::new(height).unwrap();
        let key = (1u64 << height).saturating_add(excess);
        let err = Error::KeyOutOfRange { key, height };
        prop_assert_eq!(t.reserve(key), Err(err));
        prop_assert_eq!(t.release(key), Err(err));
        prop_assert_eq!(t.count_free(), t.capacity());
        prop_assert_eq!(t.node_count(), 1);
    }

    #[test]
    fn prop_node_limit_never_corrupts(
        keys in prop::collection::vec(0u64..=KEY_MASK, 0..300),
        limit in 1usize..20,
    ) {
        let mut t = BinTrie::with_config(TrieConfig::new(HEIGHT).with_max_nodes(limit)).unwrap();
        let mut m: BTreeSet<u64> = BTreeSet::new();

        for key in keys {
            let result = if m.contains(&key) { t.release(key) } else { t.reserve(key) };
            match result {
                Ok(()) => {
                    if !m.insert(key) {
                        m.remove(&key);
                    }
                }
                Err(err) => prop_assert_eq!(err, Error::AllocationFailure),
            }
            prop_assert!(t.node_count() <= limit);
            validate_tree(&t, &m);
        }
    }
}

/// Every subset of a 3-bit key space, built in every insertion order of its
/// members, yields one canonical tree shape.
#[test]
fn exhaustive_shape_is_order_independent() {
    fn for_each_permutation(items: &[u64], f: &mut impl FnMut(&[u64])) {
        fn rec(items: &[u64], used: &mut [bool], out: &mut Vec<u64>, f: &mut impl FnMut(&[u64])) {
            if out.len() == items.len() {
                f(out.as_slice());
                return;
            }
            for i in 0..items.len() {
                if used[i] {
                    continue;
                }
                used[i] = true;
                out.push(items[i]);
                rec(items, used, out, f);
                out.pop();
                used[i] = false;
            }
        }

        let mut used = vec![false; items.len()];
        let mut out = Vec::with_capacity(items.len());
        rec(items, &mut used, &mut out, f);
    }

    for mask in 0u32..256 {
        let subset: Vec<u64> = (0..8).filter(|k| mask & (1 << k) != 0).collect();
        let taken: BTreeSet<u64> = subset.iter().copied().collect();

        let mut sorted = BinTrie::new(3).unwrap();
        for &key in &subset {
            sorted.reserve(key).unwrap();
        }
        let canonical = sorted.debug_dump();

        for_each_permutation(&subset, &mut |order| {
            let mut t = BinTrie::new(3).unwrap();
            for &key in order {
                t.reserve(key).unwrap();
            }
            validate_tree(&t, &taken);
            assert_eq!(t.debug_dump(), canonical, "order {order:?}");
        });
    }
}

#[test]
fn exhaustive_release_order_restores_root() {
    let keys: Vec<u64> = (0..16).collect();
    let mut base = BinTrie::new(4).unwrap();
    for &key in &keys {
        base.reserve(key).unwrap();
    }

    for stride in [1usize, 3, 5, 7, 9, 11, 13, 15] {
        let mut t = base.clone();
        let mut m: BTreeSet<u64> = keys.iter().copied().collect();
        let mut idx = 0usize;
        for _ in 0..keys.len() {
            let key = keys[idx];
            t.release(key).unwrap();
            m.remove(&key);
            validate_tree(&t, &m);
            idx = (idx + stride) % keys.len();
        }
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.count_free(), 16);
    }
}
