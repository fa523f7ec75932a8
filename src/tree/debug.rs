//! Diagnostic printers and the invariant checker.

use std::fmt::{self, Write};

use thiserror::Error;

use super::CountTree;
use super::node::{Id, Idx, NIL, Weight};

/// A broken red-black or search-tree property, reported by
/// [`CountTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root {0} is red")]
    RedRoot(Id),
    #[error("sentinel is red")]
    RedSentinel,
    #[error("red node {parent} has red child {child}")]
    RedRed { parent: Id, child: Id },
    #[error("black height differs below {id}: left {left}, right {right}")]
    BlackHeight { id: Id, left: usize, right: usize },
    #[error("id {child} is out of order under {parent}")]
    Order { parent: Id, child: Id },
    #[error("node {id} has a stale parent link")]
    ParentLink { id: Id },
    #[error("node {id} has non-positive weight {weight}")]
    Weight { id: Id, weight: Weight },
    #[error("tree reports {reported} nodes but holds {actual}")]
    Length { reported: usize, actual: usize },
}

impl CountTree {
    /// Check every structural invariant. Returns the black height of the
    /// root (sentinel excluded) on success.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        if self.arena.is_red(NIL) {
            return Err(InvariantViolation::RedSentinel);
        }
        if self.root != NIL {
            let root = self.arena.get(self.root);
            if root.is_red() {
                return Err(InvariantViolation::RedRoot(root.id));
            }
            if root.parent != NIL {
                return Err(InvariantViolation::ParentLink { id: root.id });
            }
        }

        let mut count = 0;
        let black_height = self.check_subtree(self.root, None, None, &mut count)?;
        if count != self.len {
            return Err(InvariantViolation::Length {
                reported: self.len,
                actual: count,
            });
        }
        // Slots neither reachable nor on the free list have leaked.
        if self.arena.live() != self.len {
            return Err(InvariantViolation::Length {
                reported: self.len,
                actual: self.arena.live(),
            });
        }
        return Ok(black_height);
    }

    /// Returns the black height of `idx`, counting the sentinel as 0.
    /// `low` and `high` are exclusive bounds inherited from ancestors.
    fn check_subtree(
        &self,
        idx: Idx,
        low: Option<Id>,
        high: Option<Id>,
        count: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        if idx == NIL {
            return Ok(0);
        }
        *count += 1;
        let node = self.arena.get(idx);

        if node.weight <= 0 {
            return Err(InvariantViolation::Weight {
                id: node.id,
                weight: node.weight,
            });
        }

        for child in [node.left, node.right] {
            if child == NIL {
                continue;
            }
            let child_node = self.arena.get(child);
            if child_node.parent != idx {
                return Err(InvariantViolation::ParentLink { id: child_node.id });
            }
            if node.is_red() && child_node.is_red() {
                return Err(InvariantViolation::RedRed {
                    parent: node.id,
                    child: child_node.id,
                });
            }
        }

        let out_of_order = low.is_some_and(|low| node.id <= low) || high.is_some_and(|high| node.id >= high);
        if out_of_order {
            let parent = self.arena.get(node.parent).id;
            return Err(InvariantViolation::Order {
                parent,
                child: node.id,
            });
        }

        let left = self.check_subtree(node.left, low, Some(node.id), count)?;
        let right = self.check_subtree(node.right, Some(node.id), high, count)?;
        if left != right {
            return Err(InvariantViolation::BlackHeight {
                id: node.id,
                left,
                right,
            });
        }
        return Ok(left + usize::from(node.is_black()));
    }

    /// One line per node in key order: `id: weight (black|red)`.
    pub fn write_in_order<W: Write>(&self, out: &mut W) -> fmt::Result {
        for idx in self.in_order_indices() {
            let node = self.arena.get(idx);
            let color = if node.is_black() { "black" } else { "red" };
            writeln!(out, "{}: {} ({})", node.id, node.weight, color)?;
        }
        return Ok(());
    }

    /// Breadth-first dump, one line per level. Real nodes print as
    /// `<id><B|R>`, sentinel positions as `nil` and expand into two `nil`
    /// children on the next line. Stops after the first level holding no
    /// real node.
    pub fn write_levels<W: Write>(&self, out: &mut W) -> fmt::Result {
        let mut level: Vec<Idx> = vec![self.root];
        loop {
            let mut next_level = Vec::with_capacity(level.len() * 2);
            let mut real = 0usize;
            for &idx in &level {
                if idx == NIL {
                    out.write_str("nil ")?;
                    next_level.push(NIL);
                    next_level.push(NIL);
                } else {
                    let node = self.arena.get(idx);
                    write!(out, "{}{} ", node.id, node.color.tag())?;
                    next_level.push(node.left);
                    next_level.push(node.right);
                    real += 1;
                }
            }
            out.write_char('\n')?;
            if real == 0 {
                return Ok(());
            }
            level = next_level;
        }
    }

    pub fn in_order_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_in_order(&mut out);
        return out;
    }

    pub fn level_string(&self) -> String {
        let mut out = String::new();
        let _ = self.write_levels(&mut out);
        return out;
    }

    fn in_order_indices(&self) -> Vec<Idx> {
        let mut order = Vec::with_capacity(self.len);
        let mut stack: Vec<Idx> = Vec::new();
        let mut current = self.root;
        while current != NIL || !stack.is_empty() {
            while current != NIL {
                stack.push(current);
                current = self.arena.left(current);
            }
            if let Some(idx) = stack.pop() {
                order.push(idx);
                current = self.arena.right(idx);
            }
        }
        return order;
    }
}
