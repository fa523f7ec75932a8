//! Arena-backed tree vertices.
//!
//! Nodes live in a `Vec<Node>` and link to each other by index. Slot 0 is
//! the sentinel: every absent child, and the parent of the root, points at
//! it. Rotations and transplants can rewire through the sentinel without
//! special cases.

/// Sort key of a node.
pub type Id = i64;

/// Aggregate counter carried by a node.
pub type Weight = i64;

/// Index into the node arena. u32 keeps nodes small on 64-bit targets.
pub(crate) type Idx = u32;

/// The sentinel slot. Always black.
pub(crate) const NIL: Idx = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Single-letter tag used by the level printer.
    pub fn tag(self) -> char {
        return match self {
            Color::Red => 'R',
            Color::Black => 'B',
        };
    }
}

/// A vertex of the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub id: Id,
    pub weight: Weight,
    pub color: Color,
    pub left: Idx,
    pub right: Idx,
    /// Non-owning back link, used for successor walks and rotations.
    pub parent: Idx,
}

impl Node {
    /// The sentinel's contents. Only `color` is ever read.
    pub const SENTINEL: Node = Node {
        id: 0,
        weight: 0,
        color: Color::Black,
        left: NIL,
        right: NIL,
        parent: NIL,
    };

    pub fn new(id: Id, weight: Weight, color: Color) -> Node {
        return Node {
            id,
            weight,
            color,
            left: NIL,
            right: NIL,
            parent: NIL,
        };
    }

    #[inline(always)]
    pub fn is_red(&self) -> bool {
        return self.color == Color::Red;
    }

    #[inline(always)]
    pub fn is_black(&self) -> bool {
        return self.color == Color::Black;
    }
}

/// Node storage with a reserved sentinel slot and slot reuse.
#[derive(Debug, Clone)]
pub(crate) struct Arena {
    nodes: Vec<Node>,
    /// Slots released by deletions, reused before growing `nodes`.
    free_list: Vec<Idx>,
}

impl Arena {
    pub fn new() -> Arena {
        return Arena {
            nodes: vec![Node::SENTINEL],
            free_list: Vec::new(),
        };
    }

    /// Wrap a prebuilt node vector. `nodes[0]` must be the sentinel.
    pub fn from_nodes(nodes: Vec<Node>) -> Arena {
        debug_assert!(!nodes.is_empty() && nodes[0].is_black());
        return Arena {
            nodes,
            free_list: Vec::new(),
        };
    }

    #[inline(always)]
    pub fn get(&self, idx: Idx) -> &Node {
        return &self.nodes[idx as usize];
    }

    #[inline(always)]
    pub fn get_mut(&mut self, idx: Idx) -> &mut Node {
        return &mut self.nodes[idx as usize];
    }

    pub fn alloc(&mut self, node: Node) -> Idx {
        if let Some(idx) = self.free_list.pop() {
            *self.get_mut(idx) = node;
            return idx;
        }
        let idx = self.nodes.len() as Idx;
        self.nodes.push(node);
        return idx;
    }

    pub fn release(&mut self, idx: Idx) {
        debug_assert_ne!(idx, NIL, "the sentinel is never released");
        *self.get_mut(idx) = Node::SENTINEL;
        self.free_list.push(idx);
    }

    /// Number of live (non-sentinel, non-free) slots.
    pub fn live(&self) -> usize {
        return self.nodes.len() - 1 - self.free_list.len();
    }

    // --- Link helpers ---

    #[inline(always)]
    pub fn left(&self, idx: Idx) -> Idx {
        return self.get(idx).left;
    }

    #[inline(always)]
    pub fn right(&self, idx: Idx) -> Idx {
        return self.get(idx).right;
    }

    #[inline(always)]
    pub fn parent(&self, idx: Idx) -> Idx {
        return self.get(idx).parent;
    }

    #[inline(always)]
    pub fn is_red(&self, idx: Idx) -> bool {
        return self.get(idx).is_red();
    }

    #[inline(always)]
    pub fn is_black(&self, idx: Idx) -> bool {
        return self.get(idx).is_black();
    }

    #[inline(always)]
    pub fn set_color(&mut self, idx: Idx, color: Color) {
        debug_assert!(
            idx != NIL || color == Color::Black,
            "the sentinel must stay black"
        );
        self.get_mut(idx).color = color;
    }

    /// Leftmost node of the subtree rooted at `idx`.
    pub fn minimum(&self, mut idx: Idx) -> Idx {
        while self.left(idx) != NIL {
            idx = self.left(idx);
        }
        return idx;
    }

    /// Rightmost node of the subtree rooted at `idx`.
    pub fn maximum(&self, mut idx: Idx) -> Idx {
        while self.right(idx) != NIL {
            idx = self.right(idx);
        }
        return idx;
    }
}
