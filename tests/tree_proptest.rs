//! Property-based tests: the tree against a `BTreeMap` model.

use std::collections::BTreeMap;
use std::ops::Bound;

use proptest::prelude::*;
use tallytree::tree::{CountTree, Id, Weight};

// =============================================================================
// Test helpers
// =============================================================================

#[derive(Clone, Debug)]
enum TreeOp {
    Increase { id: Id, amount: Weight },
    Reduce { id: Id, amount: Weight },
}

/// Small id range so operations collide on the same keys.
fn arbitrary_id() -> impl Strategy<Value = Id> {
    return -50i64..50;
}

fn arbitrary_tree_op() -> impl Strategy<Value = TreeOp> {
    return prop_oneof![
        3 => (arbitrary_id(), 1i64..20).prop_map(|(id, amount)| TreeOp::Increase { id, amount }),
        2 => (arbitrary_id(), 1i64..20).prop_map(|(id, amount)| TreeOp::Reduce { id, amount }),
    ];
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(Id, Weight)>> {
    return prop::collection::btree_map(-1000i64..1000, 1i64..100, 0..200)
        .prop_map(|map| map.into_iter().collect());
}

/// Apply `op` to both structures and return (tree result, model result).
fn apply(tree: &mut CountTree, model: &mut BTreeMap<Id, Weight>, op: &TreeOp) -> (Weight, Weight) {
    match *op {
        TreeOp::Increase { id, amount } => {
            let weight = model.entry(id).or_insert(0);
            *weight += amount;
            return (tree.increase(id, amount), *weight);
        }
        TreeOp::Reduce { id, amount } => {
            let expected = match model.get(&id).copied() {
                Some(weight) if weight > amount => {
                    model.insert(id, weight - amount);
                    weight - amount
                }
                Some(_) => {
                    model.remove(&id);
                    0
                }
                None => 0,
            };
            return (tree.reduce(id, amount), expected);
        }
    }
}

fn build(ops: &[TreeOp]) -> (CountTree, BTreeMap<Id, Weight>) {
    let mut tree = CountTree::new();
    let mut model = BTreeMap::new();
    for op in ops {
        apply(&mut tree, &mut model, op);
    }
    return (tree, model);
}

// =============================================================================
// Mutation properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every mutation returns what the model predicts and keeps the tree valid
    #[test]
    fn mutations_match_model(ops in prop::collection::vec(arbitrary_tree_op(), 1..300)) {
        let mut tree = CountTree::new();
        let mut model = BTreeMap::new();

        for op in &ops {
            let (actual, expected) = apply(&mut tree, &mut model, op);
            prop_assert_eq!(actual, expected, "{:?}", op);
            if let Err(violation) = tree.validate() {
                return Err(TestCaseError::fail(format!("{violation} after {op:?}")));
            }
        }

        prop_assert_eq!(tree.len(), model.len());
        let items: Vec<_> = tree.iter().collect();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(items, expected);
    }

    /// Mutations on a bulk-loaded tree behave the same as on a model seeded
    /// with the same entries
    #[test]
    fn bulk_loaded_tree_matches_model(
        entries in arbitrary_entries(),
        ops in prop::collection::vec(arbitrary_tree_op(), 0..100),
    ) {
        let mut tree = CountTree::from_sorted(&entries).unwrap();
        let mut model: BTreeMap<Id, Weight> = entries.iter().copied().collect();
        prop_assert!(tree.validate().is_ok());

        for op in &ops {
            let (actual, expected) = apply(&mut tree, &mut model, op);
            prop_assert_eq!(actual, expected, "{:?}", op);
        }
        prop_assert!(tree.validate().is_ok());
        prop_assert!(tree.iter().eq(model.into_iter()));
    }
}

// =============================================================================
// Query properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// count agrees with the model for present and absent ids
    #[test]
    fn count_matches_model(
        ops in prop::collection::vec(arbitrary_tree_op(), 0..200),
        probes in prop::collection::vec(arbitrary_id(), 1..20),
    ) {
        let (tree, model) = build(&ops);
        for id in probes {
            prop_assert_eq!(tree.count(id), model.get(&id).copied().unwrap_or(0));
        }
    }

    /// in_range equals the sum of counts over [low, high]
    #[test]
    fn in_range_matches_model(
        ops in prop::collection::vec(arbitrary_tree_op(), 0..200),
        low in -60i64..60,
        high in -60i64..60,
    ) {
        let (tree, model) = build(&ops);
        let expected: Weight = if low > high {
            0
        } else {
            model.range(low..=high).map(|(_, w)| *w).sum()
        };
        prop_assert_eq!(tree.in_range(low, high), expected);
    }

    /// next / previous return the strict neighbours whether or not the
    /// probe id is present
    #[test]
    fn neighbours_match_model(
        entries in arbitrary_entries(),
        probes in prop::collection::vec(-1100i64..1100, 1..30),
    ) {
        let tree = CountTree::from_sorted(&entries).unwrap();
        let model: BTreeMap<Id, Weight> = entries.into_iter().collect();

        for id in probes {
            let next = model
                .range((Bound::Excluded(id), Bound::Unbounded))
                .next()
                .map(|(&k, &w)| (k, w));
            let previous = model.range(..id).next_back().map(|(&k, &w)| (k, w));
            prop_assert_eq!(tree.next(id), next, "next({})", id);
            prop_assert_eq!(tree.previous(id), previous, "previous({})", id);
        }
    }

    /// Bulk-loaded height is floor(log2 n) + 1
    #[test]
    fn bulk_load_height_is_minimal(entries in arbitrary_entries()) {
        let tree = CountTree::from_sorted(&entries).unwrap();
        let expected = if entries.is_empty() { 0 } else { entries.len().ilog2() as usize + 1 };
        prop_assert_eq!(tree.height(), expected);
    }
}
