//! Linear-time construction from sorted input.
//!
//! The input is bisected recursively: the midpoint of each index range
//! becomes the subtree root. With depth counted from 1 at the root, a node
//! at depth `d` is red iff `2^d > n`, so only the final, partial level is
//! red and every root-to-sentinel path crosses the same black levels. No
//! fixup pass is needed.
//!
//! Entry `i` always lands in arena slot `i + 1`. Each recursion frame owns
//! a disjoint sub-slice of the arena, so the two halves of a frame can be
//! built concurrently without sharing anything mutable:
//!
//! ```text
//! slots:   [ 0 | 1  2  3 | 4 | 5  6  7 ]
//!           NIL   left    mid   right
//! ```

use crate::error::LoadError;

use super::CountTree;
use super::node::{Arena, Color, Id, Idx, NIL, Node, Weight};

/// Depth down to which sibling subtrees are built in parallel. Depth 2
/// forks at the root and at both of its children: four leaf tasks.
const DEFAULT_PARALLEL_DEPTH: u32 = 2;

/// Inputs smaller than this are always built sequentially.
const PARALLEL_MIN_LEN: usize = 1024;

/// Builds a [`CountTree`] from entries sorted strictly ascending by id.
#[derive(Debug, Clone, Copy)]
pub struct BulkLoader {
    parallel_depth: u32,
}

impl Default for BulkLoader {
    fn default() -> Self {
        return BulkLoader::new();
    }
}

impl BulkLoader {
    pub fn new() -> BulkLoader {
        return BulkLoader {
            parallel_depth: DEFAULT_PARALLEL_DEPTH,
        };
    }

    /// Frames at depth `<= depth` build their two children concurrently.
    /// `0` builds sequentially. Ignored without the `parallel` feature.
    pub fn parallel_depth(mut self, depth: u32) -> BulkLoader {
        self.parallel_depth = depth;
        return self;
    }

    /// Validate `entries` and build a balanced tree from them.
    pub fn build(&self, entries: &[(Id, Weight)]) -> Result<CountTree, LoadError> {
        validate_entries(entries)?;

        let n = entries.len();
        if n == 0 {
            return Ok(CountTree::new());
        }

        let mut nodes = vec![Node::SENTINEL; n + 1];
        let layout = Layout {
            n,
            red_depth: n.ilog2() + 1,
            parallel_depth: self.parallel_depth,
        };
        let root = layout.build(&mut nodes[1..], 1, entries, NIL, 1);

        // n = 1 puts the root on the "last level"; the root is always black.
        nodes[root as usize].color = Color::Black;

        let tree = CountTree::from_parts(Arena::from_nodes(nodes), root, n);
        tracing::debug!(len = n, height = tree.height(), "bulk loaded tree");
        return Ok(tree);
    }
}

fn validate_entries(entries: &[(Id, Weight)]) -> Result<(), LoadError> {
    // One slot is reserved for the sentinel.
    if entries.len() >= Idx::MAX as usize {
        return Err(LoadError::TooLarge { len: entries.len() });
    }
    for (index, &(id, weight)) in entries.iter().enumerate() {
        if weight <= 0 {
            return Err(LoadError::NonPositiveWeight { id, weight });
        }
        if index > 0 {
            let prev = entries[index - 1].0;
            if prev >= id {
                return Err(LoadError::Unsorted { index, prev, id });
            }
        }
    }
    return Ok(());
}

/// Parameters shared by every recursion frame.
#[derive(Clone, Copy)]
struct Layout {
    n: usize,
    /// First depth whose nodes are red: the smallest `d` with `2^d > n`.
    red_depth: u32,
    parallel_depth: u32,
}

impl Layout {
    /// Build `entries` into `slots` (same length), where `slots[0]` is arena
    /// index `base`. Returns the arena index of the subtree root, or `NIL`.
    fn build(
        &self,
        slots: &mut [Node],
        base: Idx,
        entries: &[(Id, Weight)],
        parent: Idx,
        depth: u32,
    ) -> Idx {
        debug_assert_eq!(slots.len(), entries.len());
        if entries.is_empty() {
            return NIL;
        }

        let mid = (entries.len() - 1) / 2;
        let me = base + mid as Idx;
        let (left_slots, rest) = slots.split_at_mut(mid);
        let Some((mid_slot, right_slots)) = rest.split_first_mut() else {
            return NIL;
        };
        let left_entries = &entries[..mid];
        let right_entries = &entries[mid + 1..];
        let right_base = me + 1;

        let (left, right) = if self.forks_at(depth) {
            self.join(
                || self.build(left_slots, base, left_entries, me, depth + 1),
                || self.build(right_slots, right_base, right_entries, me, depth + 1),
            )
        } else {
            (
                self.build(left_slots, base, left_entries, me, depth + 1),
                self.build(right_slots, right_base, right_entries, me, depth + 1),
            )
        };

        let (id, weight) = entries[mid];
        let color = if depth >= self.red_depth { Color::Red } else { Color::Black };
        *mid_slot = Node {
            id,
            weight,
            color,
            left,
            right,
            parent,
        };
        return me;
    }

    fn forks_at(&self, depth: u32) -> bool {
        return cfg!(feature = "parallel") && depth <= self.parallel_depth && self.n >= PARALLEL_MIN_LEN;
    }

    #[cfg(feature = "parallel")]
    fn join<A, B>(&self, a: A, b: B) -> (Idx, Idx)
    where
        A: FnOnce() -> Idx + Send,
        B: FnOnce() -> Idx + Send,
    {
        return rayon::join(a, b);
    }

    #[cfg(not(feature = "parallel"))]
    fn join<A, B>(&self, a: A, b: B) -> (Idx, Idx)
    where
        A: FnOnce() -> Idx + Send,
        B: FnOnce() -> Idx + Send,
    {
        return (a(), b());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: i64) -> Vec<(Id, Weight)> {
        return (0..n).map(|i| (i * 10, i + 1)).collect();
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        let tree = BulkLoader::new().build(&[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root, NIL);
        assert_eq!(tree.validate(), Ok(0));
    }

    #[test]
    fn single_entry_root_is_black() {
        let tree = BulkLoader::new().build(&[(7, 3)]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.count(7), 3);
        assert_eq!(tree.level_string(), "7B \nnil nil \n");
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn fifteen_entries_form_perfect_tree() {
        let tree = BulkLoader::new().build(&entries(15)).unwrap();
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.validate(), Ok(3));
        assert_eq!(tree.arena.get(tree.root).id, 70);
    }

    #[test]
    fn every_size_up_to_300_is_valid() {
        for n in 0..300 {
            let input = entries(n);
            let tree = BulkLoader::new().build(&input).unwrap();
            if let Err(violation) = tree.validate() {
                panic!("n = {n}: {violation}\n{}", tree.level_string());
            }
            assert_eq!(tree.len(), n as usize);
            let expected_height = if n == 0 { 0 } else { (n as usize).ilog2() as usize + 1 };
            assert_eq!(tree.height(), expected_height, "n = {n}");
            assert!(tree.iter().eq(input.iter().copied()));
        }
    }

    #[test]
    fn loaded_weights_are_reproduced() {
        let input = entries(100);
        let tree = BulkLoader::new().build(&input).unwrap();
        for &(id, weight) in &input {
            assert_eq!(tree.count(id), weight);
        }
        assert_eq!(tree.count(5), 0);
    }

    #[test]
    fn parallel_and_sequential_builds_match() {
        let input = entries(5000);
        let parallel = BulkLoader::new().parallel_depth(3).build(&input).unwrap();
        let sequential = BulkLoader::new().parallel_depth(0).build(&input).unwrap();
        assert_eq!(parallel.level_string(), sequential.level_string());
        assert_eq!(parallel.root, sequential.root);
        assert!(parallel.validate().is_ok());
    }

    #[test]
    fn loaded_tree_accepts_updates() {
        let mut tree = BulkLoader::new().build(&entries(64)).unwrap();
        for i in 0..64 {
            tree.increase(i * 10 + 5, 1);
            assert!(tree.validate().is_ok());
        }
        for i in 0..64 {
            tree.reduce(i * 10, i64::MAX);
            assert!(tree.validate().is_ok());
        }
        assert_eq!(tree.len(), 64);
        assert_eq!(tree.in_range(i64::MIN, i64::MAX), 64);
    }

    #[test]
    fn rejects_unsorted_input() {
        let err = BulkLoader::new().build(&[(1, 1), (3, 1), (2, 1)]).unwrap_err();
        assert_eq!(err, LoadError::Unsorted { index: 2, prev: 3, id: 2 });
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = BulkLoader::new().build(&[(1, 1), (1, 2)]).unwrap_err();
        assert_eq!(err, LoadError::Unsorted { index: 1, prev: 1, id: 1 });
    }

    #[test]
    fn rejects_non_positive_weights() {
        let err = BulkLoader::new().build(&[(1, 1), (2, 0)]).unwrap_err();
        assert_eq!(err, LoadError::NonPositiveWeight { id: 2, weight: 0 });
        let err = BulkLoader::new().build(&[(1, -3)]).unwrap_err();
        assert_eq!(err, LoadError::NonPositiveWeight { id: 1, weight: -3 });
    }
}
