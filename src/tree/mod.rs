//! Red-black tree of integer ids with positive weights.
//!
//! # Operations
//!
//! - `increase(id, amount)`: O(log n) - insert or add to a weight
//! - `reduce(id, amount)`: O(log n) - subtract from a weight, removing the id at <= 0
//! - `count(id)`: O(log n) - weight of an id, 0 when absent
//! - `in_range(low, high)`: O(log n + k) - total weight of ids in `[low, high]`
//! - `next(id)` / `previous(id)`: O(log n) - strict neighbours of any id
//! - `from_sorted(entries)`: O(n) - balanced tree from ascending input
//!
//! # Structure
//!
//! Nodes are stored in an arena (see [`node`]). Slot 0 is a shared black
//! sentinel standing in for every missing child and for the root's parent.
//!
//! ```text
//!              20B
//!            /     \
//!         10B       30B
//!        /   \     /   \
//!      nil   15R  nil  nil
//! ```

mod balance;
mod bulk;
mod debug;
mod node;

pub use bulk::BulkLoader;
pub use debug::InvariantViolation;
pub use node::{Color, Id, Weight};

use smallvec::SmallVec;

use crate::error::LoadError;
use node::{Arena, Idx, NIL, Node};

/// Inline capacity for traversal stacks. Red-black height is at most
/// 2 * log2(n + 1), so 64 covers any tree that fits in memory without
/// spilling for point paths.
const STACK_INLINE: usize = 64;

/// An ordered map from [`Id`] to a strictly positive [`Weight`].
#[derive(Debug, Clone)]
pub struct CountTree {
    arena: Arena,
    /// Topmost real node, or `NIL` when empty.
    root: Idx,
    len: usize,
}

impl Default for CountTree {
    fn default() -> Self {
        return CountTree::new();
    }
}

impl CountTree {
    pub fn new() -> CountTree {
        return CountTree {
            arena: Arena::new(),
            root: NIL,
            len: 0,
        };
    }

    /// Build a balanced tree from entries sorted strictly ascending by id,
    /// each with a positive weight. Uses the default [`BulkLoader`].
    pub fn from_sorted(entries: &[(Id, Weight)]) -> Result<CountTree, LoadError> {
        return BulkLoader::new().build(entries);
    }

    pub(crate) fn from_parts(arena: Arena, root: Idx, len: usize) -> CountTree {
        return CountTree { arena, root, len };
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Number of real nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        fn go(arena: &Arena, idx: Idx) -> usize {
            if idx == NIL {
                return 0;
            }
            return 1 + go(arena, arena.left(idx)).max(go(arena, arena.right(idx)));
        }
        return go(&self.arena, self.root);
    }

    /// In-order iterator over `(id, weight)` pairs.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            arena: &self.arena,
            stack: SmallVec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root);
        return iter;
    }

    // --- Lookup ---

    /// Descend towards `id`. Returns the matching node (or `NIL`) and the
    /// last real node visited before it.
    fn descend(&self, id: Id) -> (Idx, Idx) {
        let mut current = self.root;
        let mut last = NIL;
        while current != NIL {
            let node = self.arena.get(current);
            if node.id == id {
                break;
            }
            last = current;
            current = if id < node.id { node.left } else { node.right };
        }
        return (current, last);
    }

    fn entry(&self, idx: Idx) -> (Id, Weight) {
        let node = self.arena.get(idx);
        return (node.id, node.weight);
    }

    /// Weight stored for `id`, or 0 when the id is absent.
    pub fn count(&self, id: Id) -> Weight {
        let (found, _) = self.descend(id);
        if found == NIL {
            return 0;
        }
        return self.arena.get(found).weight;
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: Id) -> bool {
        return self.descend(id).0 != NIL;
    }

    // --- Mutation ---

    /// Add `amount` to the weight of `id`, inserting it if absent.
    /// Returns the resulting weight.
    ///
    /// A non-positive `amount` is treated as `reduce(id, -amount)`, so a
    /// node is never created or left with a weight <= 0.
    pub fn increase(&mut self, id: Id, amount: Weight) -> Weight {
        if amount <= 0 {
            return self.reduce(id, amount.saturating_neg());
        }

        if self.root == NIL {
            self.root = self.arena.alloc(Node::new(id, amount, Color::Black));
            self.len = 1;
            return amount;
        }

        let (found, parent) = self.descend(id);
        if found != NIL {
            let node = self.arena.get_mut(found);
            node.weight = node.weight.saturating_add(amount);
            return node.weight;
        }

        let mut node = Node::new(id, amount, Color::Red);
        node.parent = parent;
        let z = self.arena.alloc(node);
        if id < self.arena.get(parent).id {
            self.arena.get_mut(parent).left = z;
        } else {
            self.arena.get_mut(parent).right = z;
        }
        self.len += 1;

        self.fixup_insert(z);
        return amount;
    }

    /// Subtract `amount` from the weight of `id`. If the weight drops to
    /// zero or below the id is removed. Returns the remaining weight, or 0
    /// when the id was removed or absent.
    pub fn reduce(&mut self, id: Id, amount: Weight) -> Weight {
        let (z, _) = self.descend(id);
        if z == NIL {
            return 0;
        }

        let remaining = self.arena.get(z).weight.saturating_sub(amount);
        if remaining > 0 {
            self.arena.get_mut(z).weight = remaining;
            return remaining;
        }

        self.remove_node(z);
        tracing::trace!(id, len = self.len, "removed node");
        return 0;
    }

    /// Unlink `z` from the tree and release its slot.
    fn remove_node(&mut self, z: Idx) {
        let z_left = self.arena.left(z);
        let z_right = self.arena.right(z);

        let mut removed_color = self.arena.get(z).color;
        let x;

        if z_left == NIL {
            x = z_right;
            self.transplant(z, z_right);
        } else if z_right == NIL {
            x = z_left;
            self.transplant(z, z_left);
        } else {
            let y = self.arena.minimum(z_right);
            removed_color = self.arena.get(y).color;
            x = self.arena.right(y);

            if y == z_right {
                // x may be the sentinel; fixup still needs its parent.
                self.arena.get_mut(x).parent = y;
            } else {
                self.transplant(y, x);
                self.arena.get_mut(y).right = z_right;
                self.arena.get_mut(z_right).parent = y;
            }

            self.transplant(z, y);
            self.arena.get_mut(y).left = z_left;
            self.arena.get_mut(z_left).parent = y;
            let z_color = self.arena.get(z).color;
            self.arena.set_color(y, z_color);
        }

        if removed_color == Color::Black {
            self.fixup_remove(x);
        }

        self.arena.release(z);
        self.len -= 1;
    }

    // --- Aggregates and neighbours ---

    /// Total weight of every id in `[low, high]`. Empty ranges sum to 0.
    pub fn in_range(&self, low: Id, high: Id) -> Weight {
        if low > high {
            return 0;
        }

        let mut total: Weight = 0;
        let mut stack: SmallVec<[Idx; STACK_INLINE]> = SmallVec::new();
        stack.push(self.root);

        while let Some(idx) = stack.pop() {
            if idx == NIL {
                continue;
            }
            let node = self.arena.get(idx);
            if node.id < low {
                stack.push(node.right);
            } else if node.id > high {
                stack.push(node.left);
            } else {
                total = total.saturating_add(node.weight);
                stack.push(node.right);
                stack.push(node.left);
            }
        }
        return total;
    }

    /// Smallest present id strictly greater than `id`, with its weight.
    /// `id` itself need not be present.
    pub fn next(&self, id: Id) -> Option<(Id, Weight)> {
        let (found, last) = self.descend(id);
        let start = if found != NIL {
            found
        } else if last == NIL {
            return None;
        } else if self.arena.get(last).id > id {
            return Some(self.entry(last));
        } else {
            last
        };
        return self.successor(start).map(|idx| self.entry(idx));
    }

    /// Largest present id strictly smaller than `id`, with its weight.
    /// `id` itself need not be present.
    pub fn previous(&self, id: Id) -> Option<(Id, Weight)> {
        let (found, last) = self.descend(id);
        let start = if found != NIL {
            found
        } else if last == NIL {
            return None;
        } else if self.arena.get(last).id < id {
            return Some(self.entry(last));
        } else {
            last
        };
        return self.predecessor(start).map(|idx| self.entry(idx));
    }

    fn successor(&self, mut x: Idx) -> Option<Idx> {
        let right = self.arena.right(x);
        if right != NIL {
            return Some(self.arena.minimum(right));
        }
        let mut y = self.arena.parent(x);
        while y != NIL && x == self.arena.right(y) {
            x = y;
            y = self.arena.parent(y);
        }
        return if y == NIL { None } else { Some(y) };
    }

    fn predecessor(&self, mut x: Idx) -> Option<Idx> {
        let left = self.arena.left(x);
        if left != NIL {
            return Some(self.arena.maximum(left));
        }
        let mut y = self.arena.parent(x);
        while y != NIL && x == self.arena.left(y) {
            x = y;
            y = self.arena.parent(y);
        }
        return if y == NIL { None } else { Some(y) };
    }
}

/// In-order iterator returned by [`CountTree::iter`].
pub struct Iter<'a> {
    arena: &'a Arena,
    stack: SmallVec<[Idx; STACK_INLINE]>,
    remaining: usize,
}

impl Iter<'_> {
    fn push_left_spine(&mut self, mut idx: Idx) {
        while idx != NIL {
            self.stack.push(idx);
            idx = self.arena.left(idx);
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = (Id, Weight);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.arena.get(idx);
        self.push_left_spine(node.right);
        self.remaining -= 1;
        return Some((node.id, node.weight));
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a CountTree {
    type Item = (Id, Weight);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        return self.iter();
    }
}
