//! AFL fuzz harness for CountTree
//!
//! Replays a byte-encoded operation sequence against both the tree and a
//! `BTreeMap` model and checks:
//! 1. Agreement: every result matches the model
//! 2. Balance: the red-black invariants hold after every mutation
//!
//! Ids are drawn from a small range so that updates, removals and neighbour
//! queries collide often.

use std::collections::BTreeMap;
use std::ops::Bound;

use afl::fuzz;
use tallytree::tree::{BulkLoader, CountTree};

/// Ids fall in `-ID_SPAN..ID_SPAN`.
const ID_SPAN: i64 = 64;

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Increase { id: i64, amount: i64 },
    Reduce { id: i64, amount: i64 },
    Count { id: i64 },
    InRange { low: i64, high: i64 },
    Next { id: i64 },
    Previous { id: i64 },
}

fn id_from(byte: u8) -> i64 {
    return (byte as i64) % (2 * ID_SPAN) - ID_SPAN;
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        let (&tag, rest) = bytes.split_first()?;
        match tag % 6 {
            0 if rest.len() >= 2 => {
                let op = FuzzOp::Increase {
                    id: id_from(rest[0]),
                    amount: (rest[1] % 16) as i64 + 1,
                };
                Some((op, &rest[2..]))
            }
            1 if rest.len() >= 2 => {
                let op = FuzzOp::Reduce {
                    id: id_from(rest[0]),
                    amount: (rest[1] % 16) as i64 + 1,
                };
                Some((op, &rest[2..]))
            }
            2 if !rest.is_empty() => Some((FuzzOp::Count { id: id_from(rest[0]) }, &rest[1..])),
            3 if rest.len() >= 2 => {
                let op = FuzzOp::InRange {
                    low: id_from(rest[0]),
                    high: id_from(rest[1]),
                };
                Some((op, &rest[2..]))
            }
            4 if !rest.is_empty() => Some((FuzzOp::Next { id: id_from(rest[0]) }, &rest[1..])),
            5 if !rest.is_empty() => Some((FuzzOp::Previous { id: id_from(rest[0]) }, &rest[1..])),
            _ => None,
        }
    }
}

/// Seed both structures from the leading bytes: a length, then one weight
/// per even id.
fn seed(bytes: &[u8]) -> (CountTree, BTreeMap<i64, i64>, &[u8]) {
    let Some((&len, rest)) = bytes.split_first() else {
        return (CountTree::new(), BTreeMap::new(), bytes);
    };
    let len = (len as usize % 32).min(rest.len());
    let entries: Vec<(i64, i64)> = rest[..len]
        .iter()
        .enumerate()
        .map(|(i, &w)| (i as i64 * 2 - ID_SPAN, (w % 8) as i64 + 1))
        .collect();
    let tree = BulkLoader::new().build(&entries).expect("seed entries are sorted and positive");
    let model = entries.iter().copied().collect();
    return (tree, model, &rest[len..]);
}

fn main() {
    fuzz!(|data: &[u8]| {
        let (mut tree, mut model, mut remaining) = seed(data);
        tree.validate().expect("bulk load produced an invalid tree");

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;

            match op {
                FuzzOp::Increase { id, amount } => {
                    let weight = model.entry(id).or_insert(0);
                    *weight += amount;
                    assert_eq!(tree.increase(id, amount), *weight, "{op:?}");
                }

                FuzzOp::Reduce { id, amount } => {
                    let expected = match model.get_mut(&id) {
                        Some(weight) if *weight > amount => {
                            *weight -= amount;
                            *weight
                        }
                        Some(_) => {
                            model.remove(&id);
                            0
                        }
                        None => 0,
                    };
                    assert_eq!(tree.reduce(id, amount), expected, "{op:?}");
                }

                FuzzOp::Count { id } => {
                    assert_eq!(tree.count(id), model.get(&id).copied().unwrap_or(0), "{op:?}");
                }

                FuzzOp::InRange { low, high } => {
                    let expected: i64 = if low > high {
                        0
                    } else {
                        model.range(low..=high).map(|(_, w)| w).sum()
                    };
                    assert_eq!(tree.in_range(low, high), expected, "{op:?}");
                }

                FuzzOp::Next { id } => {
                    let expected = model
                        .range((Bound::Excluded(id), Bound::Unbounded))
                        .next()
                        .map(|(&k, &w)| (k, w));
                    assert_eq!(tree.next(id), expected, "{op:?}");
                }

                FuzzOp::Previous { id } => {
                    let expected = model.range(..id).next_back().map(|(&k, &w)| (k, w));
                    assert_eq!(tree.previous(id), expected, "{op:?}");
                }
            }

            if let Err(violation) = tree.validate() {
                panic!("{violation} after {op:?}\n{}", tree.level_string());
            }
        }

        // Final consistency check
        assert_eq!(tree.len(), model.len());
        assert!(tree.iter().eq(model.iter().map(|(&k, &w)| (k, w))));
    });
}
