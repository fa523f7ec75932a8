//! Rotations and the red-black fixup passes.
//!
//! Every routine here works on arena indices and may pass through the
//! sentinel. The sentinel's `parent` field is scratch space during deletion:
//! `transplant` writes it so `fixup_remove` can climb out of an empty
//! position.

use super::CountTree;
use super::node::{Color, Idx, NIL};

impl CountTree {
    /// Rotate the edge between `x` and its right child.
    ///
    /// ```text
    ///     x               y
    ///    / \             / \
    ///   a   y    =>     x   c
    ///      / \         / \
    ///     b   c       a   b
    /// ```
    pub(super) fn rotate_left(&mut self, x: Idx) {
        let y = self.arena.right(x);
        debug_assert_ne!(y, NIL, "rotate_left needs a right child");

        let b = self.arena.left(y);
        self.arena.get_mut(x).right = b;
        if b != NIL {
            self.arena.get_mut(b).parent = x;
        }

        self.transplant(x, y);

        self.arena.get_mut(y).left = x;
        self.arena.get_mut(x).parent = y;
    }

    /// Mirror of [`rotate_left`](Self::rotate_left).
    pub(super) fn rotate_right(&mut self, x: Idx) {
        let y = self.arena.left(x);
        debug_assert_ne!(y, NIL, "rotate_right needs a left child");

        let b = self.arena.right(y);
        self.arena.get_mut(x).left = b;
        if b != NIL {
            self.arena.get_mut(b).parent = x;
        }

        self.transplant(x, y);

        self.arena.get_mut(y).right = x;
        self.arena.get_mut(x).parent = y;
    }

    /// Put the subtree rooted at `v` where `u` hangs: rewire the root slot
    /// or `u`'s parent's child link, then `v`'s back link. `v` may be the
    /// sentinel. `u`'s own links are left untouched.
    pub(super) fn transplant(&mut self, u: Idx, v: Idx) {
        let parent = self.arena.parent(u);
        if parent == NIL {
            self.root = v;
        } else if self.arena.left(parent) == u {
            self.arena.get_mut(parent).left = v;
        } else {
            self.arena.get_mut(parent).right = v;
        }
        self.arena.get_mut(v).parent = parent;
    }

    /// Restore the red-black properties after `z` was linked in as a red leaf.
    pub(super) fn fixup_insert(&mut self, mut z: Idx) {
        while self.arena.is_red(self.arena.parent(z)) {
            let p = self.arena.parent(z);
            // A red parent is never the root, so the grandparent is real.
            let g = self.arena.parent(p);

            if p == self.arena.left(g) {
                let uncle = self.arena.right(g);
                if self.arena.is_red(uncle) {
                    self.arena.set_color(p, Color::Black);
                    self.arena.set_color(uncle, Color::Black);
                    self.arena.set_color(g, Color::Red);
                    z = g;
                } else if z == self.arena.right(p) {
                    z = p;
                    self.rotate_left(z);
                } else {
                    self.arena.set_color(p, Color::Black);
                    self.arena.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.arena.left(g);
                if self.arena.is_red(uncle) {
                    self.arena.set_color(p, Color::Black);
                    self.arena.set_color(uncle, Color::Black);
                    self.arena.set_color(g, Color::Red);
                    z = g;
                } else if z == self.arena.left(p) {
                    z = p;
                    self.rotate_right(z);
                } else {
                    self.arena.set_color(p, Color::Black);
                    self.arena.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.arena.set_color(root, Color::Black);
    }

    /// Restore the red-black properties after a black node was spliced out
    /// above `x`, leaving the subtree at `x` one black node short.
    pub(super) fn fixup_remove(&mut self, mut x: Idx) {
        while x != self.root && self.arena.is_black(x) {
            let p = self.arena.parent(x);

            if x == self.arena.left(p) {
                let mut w = self.arena.right(p);
                if self.arena.is_red(w) {
                    self.arena.set_color(w, Color::Black);
                    self.arena.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.arena.right(p);
                }

                if self.arena.is_black(self.arena.left(w)) && self.arena.is_black(self.arena.right(w)) {
                    self.arena.set_color(w, Color::Red);
                    x = p;
                } else {
                    if self.arena.is_black(self.arena.right(w)) {
                        let near = self.arena.left(w);
                        self.arena.set_color(near, Color::Black);
                        self.arena.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.arena.right(p);
                    }
                    let parent_color = self.arena.get(p).color;
                    self.arena.set_color(w, parent_color);
                    self.arena.set_color(p, Color::Black);
                    let far = self.arena.right(w);
                    self.arena.set_color(far, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.arena.left(p);
                if self.arena.is_red(w) {
                    self.arena.set_color(w, Color::Black);
                    self.arena.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.arena.left(p);
                }

                if self.arena.is_black(self.arena.right(w)) && self.arena.is_black(self.arena.left(w)) {
                    self.arena.set_color(w, Color::Red);
                    x = p;
                } else {
                    if self.arena.is_black(self.arena.left(w)) {
                        let near = self.arena.right(w);
                        self.arena.set_color(near, Color::Black);
                        self.arena.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.arena.left(p);
                    }
                    let parent_color = self.arena.get(p).color;
                    self.arena.set_color(w, parent_color);
                    self.arena.set_color(p, Color::Black);
                    let far = self.arena.left(w);
                    self.arena.set_color(far, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.arena.set_color(x, Color::Black);
    }
}
