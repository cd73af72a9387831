//! Alternating trees, and zippers for rewriting them.
//!
//! An alternating tree is rooted at an unmatched piece. Its layers alternate
//! between "outer" pieces (whose disks grow) and "inner" pieces (whose disks
//! shrink). Every inner node is matched to its single child, so walking from
//! any outer node up to the root follows an alternating path.
//!
//! Trees are immutable and share structure: a [`Zipper`] focuses on one node
//! of a tree, and rewriting at the focus rebuilds only the path between the
//! focus and the root.

use std::rc::Rc;

use kurbo::Point;

use crate::{
    draw::{EdgeKind, Layer, Surface},
    matching::Matching,
    piece::{Matchable, Node, Piece, RatedDisk},
};

/// A node in an alternating tree, along with all of its descendants.
#[derive(Clone, Debug, PartialEq)]
pub struct AltTree {
    value: Matchable,
    outer: bool,
    children: Vec<Rc<AltTree>>,
}

fn layer_name(outer: bool) -> &'static str {
    if outer {
        "outer"
    } else {
        "inner"
    }
}

impl AltTree {
    /// Creates a new tree node.
    ///
    /// Panics if `outer` is false and there isn't exactly one child, or if
    /// any child is in the same layer as this node.
    pub fn new(value: impl Into<Matchable>, outer: bool, children: Vec<Rc<AltTree>>) -> Self {
        assert!(
            outer || children.len() == 1,
            "inner tree node must have exactly one child, but has {}",
            children.len()
        );
        for child in &children {
            assert!(
                child.outer != outer,
                "child of an {layer} node is also {layer}",
                layer = layer_name(outer)
            );
        }
        AltTree {
            value: value.into(),
            outer,
            children,
        }
    }

    /// A single outer node, with no children.
    pub fn leaf(value: impl Into<Matchable>) -> Self {
        AltTree::new(value, true, Vec::new())
    }

    /// An inner node holding `inner`, whose only child is an outer node
    /// holding `outer`.
    pub fn inner_outer(
        inner: impl Into<Matchable>,
        outer: impl Into<Matchable>,
        children: Vec<Rc<AltTree>>,
    ) -> Self {
        AltTree::new(
            inner,
            false,
            vec![Rc::new(AltTree::new(outer, true, children))],
        )
    }

    /// Turns a matching into a two-node subtree, ready to be grafted onto
    /// something.
    ///
    /// The end of the matching that's about to collide with `other` becomes
    /// the inner node, and the far end becomes its child. Ties go to the
    /// matching's first end.
    pub fn from_matching_rooted_closest_to<P: Piece + ?Sized>(matching: &Matching, other: &P) -> Self {
        let t1 = matching.first().time_until_collision(other);
        let t2 = matching.second().time_until_collision(other);
        let (close, far) = if t1 > t2 {
            (matching.second(), matching.first())
        } else {
            (matching.first(), matching.second())
        };
        AltTree::new(
            close.clone(),
            false,
            vec![Rc::new(AltTree::leaf(far.clone()))],
        )
    }

    /// The piece at this node.
    pub fn value(&self) -> &Matchable {
        &self.value
    }

    /// Is this node in an outer (growing) layer?
    pub fn is_outer(&self) -> bool {
        self.outer
    }

    /// The subtrees hanging off this node.
    pub fn children(&self) -> &[Rc<AltTree>] {
        &self.children
    }

    /// The number of nodes in this tree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }

    /// The matchings implied by this tree: every inner node is matched to its
    /// child.
    pub fn matchings(&self) -> Vec<Matching> {
        let mut ret = Vec::new();
        self.collect_matchings(&mut ret);
        ret
    }

    fn collect_matchings(&self, out: &mut Vec<Matching>) {
        if !self.outer {
            out.push(Matching::new(
                self.value.clone(),
                self.children[0].value.clone(),
            ));
        }
        for c in &self.children {
            c.collect_matchings(out);
        }
    }

    /// All the original input points held anywhere in this tree.
    pub fn points(&self) -> Vec<Point> {
        let mut ret = self.value.points();
        for c in &self.children {
            ret.extend(c.points());
        }
        ret
    }

    /// A zipper focused on the root of this tree.
    pub fn zipper(self: &Rc<Self>) -> Zipper {
        Zipper {
            focus: Rc::clone(self),
            parent: None,
            index: 0,
        }
    }

    /// Follows a path of child indices down from the root.
    ///
    /// Panics if one of the indices doesn't exist.
    pub fn descend(self: &Rc<Self>, indices: &[usize]) -> Zipper {
        self.zipper().descend(indices)
    }

    /// Every node of this tree (in pre-order), along with its ancestry.
    pub fn nodes_with_ancestry(self: &Rc<Self>) -> Vec<Zipper> {
        let mut ret = Vec::new();
        collect_nodes(self.zipper(), &mut ret);
        ret
    }

    /// Every outer node of this tree (in pre-order), along with its ancestry.
    pub fn outer_nodes_with_ancestry(self: &Rc<Self>) -> Vec<Zipper> {
        let mut ret = self.nodes_with_ancestry();
        ret.retain(|z| z.focus.outer);
        ret
    }

    /// Finds the outer node whose piece will collide soonest with `other`.
    ///
    /// Ties go to the node that comes first in pre-order.
    pub fn closest_outer_node_to<P: Piece + ?Sized>(self: &Rc<Self>, other: &P) -> Zipper {
        let mut best: Option<(f64, Zipper)> = None;
        for z in self.outer_nodes_with_ancestry() {
            let time = z.focus.value.time_until_collision(other);
            let better = match &best {
                Some((best_time, _)) => time < *best_time,
                None => true,
            };
            if better {
                best = Some((time, z));
            }
        }
        match best {
            Some((_, z)) => z,
            None => panic!("tree has no outer nodes: {self}"),
        }
    }

    /// Paints the pieces of this tree and the edges between them.
    pub fn draw(&self, surface: &mut impl Surface) {
        let layer = if self.outer {
            Layer::Outer
        } else {
            Layer::Inner
        };
        self.value.draw(surface, layer, 0);
        for c in &self.children {
            c.draw(surface);
            surface.edge(
                self.value.center(),
                c.value.center(),
                EdgeKind::Tree {
                    outer_parent: self.outer,
                },
            );
        }
    }

    /// Checks that this tree's layers alternate, that inner nodes have
    /// exactly one child, and that all blossoms have odd cycles.
    ///
    /// All of these are enforced on construction, so this should never fail.
    pub fn check_invariants(&self) {
        assert!(self.outer || self.children.len() == 1);
        for c in &self.children {
            assert_ne!(c.outer, self.outer);
            c.check_invariants();
        }
        check_blossoms(&self.value);
    }
}

pub(crate) fn check_blossoms(value: &Matchable) {
    if let Matchable::Blossom(b) = value {
        assert!(b.cycle().len() >= 3 && b.cycle().len() % 2 == 1);
        assert!(b.weight_delta() >= 0.0);
        for member in b.cycle() {
            check_blossoms(member);
        }
    }
}

fn collect_nodes(z: Zipper, out: &mut Vec<Zipper>) {
    let num_children = z.focus.children.len();
    out.push(z.clone());
    for idx in 0..num_children {
        collect_nodes(z.child(idx), out);
    }
}

impl Piece for AltTree {
    fn center(&self) -> Point {
        self.value.center()
    }

    fn all_disks(&self) -> Vec<Node> {
        let mut ret = self.value.all_disks();
        for c in &self.children {
            ret.extend(c.all_disks());
        }
        ret
    }

    fn disks_with_rate(&self) -> Vec<RatedDisk> {
        let rate = if self.outer { 1.0 } else { -1.0 };
        let mut ret: Vec<_> = self
            .value
            .all_disks()
            .into_iter()
            .map(|disk| RatedDisk { disk, rate })
            .collect();
        for c in &self.children {
            ret.extend(c.disks_with_rate());
        }
        ret
    }

    fn after_growing(&self, dt: f64) -> Self {
        let sign = if self.outer { 1.0 } else { -1.0 };
        AltTree::new(
            self.value.after_growing(dt * sign),
            self.outer,
            self.children
                .iter()
                .map(|c| Rc::new(c.after_growing(dt)))
                .collect(),
        )
    }
}

impl std::fmt::Display for AltTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.outer {
            return write!(f, "{} ===> {}", self.value, self.children[0]);
        }

        write!(f, "{}", self.value)?;
        for c in &self.children {
            let text = c.to_string();
            let mut lines = text.lines();
            if let Some(first) = lines.next() {
                write!(f, "\n+---{first}")?;
            }
            for line in lines {
                write!(f, "\n|   {line}")?;
            }
        }
        Ok(())
    }
}

/// What's left over after cutting a path out of a tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Pruned {
    /// The subtrees that hung off the removed path, but weren't on it.
    pub orphans: Vec<Rc<AltTree>>,
    /// The pieces on the removed path, from the bottom up.
    pub removed: Vec<Matchable>,
    /// The child index (in the node we pruned up to) of the top of the
    /// removed path. `None` if nothing was removed, or if we pruned all the way
    /// through the root.
    pub top: Option<usize>,
}

/// A node in an alternating tree, together with the path leading to it from
/// the root.
///
/// A zipper never owns the tree it points into: rewriting through a zipper
/// produces a new tree, sharing every subtree that wasn't on the path from
/// the focus to the root.
#[derive(Clone, Debug, PartialEq)]
pub struct Zipper {
    focus: Rc<AltTree>,
    parent: Option<Rc<Zipper>>,
    // Our index among the parent's children. Meaningless at the root.
    index: usize,
}

impl Zipper {
    /// The subtree we're focused on.
    pub fn focus(&self) -> &Rc<AltTree> {
        &self.focus
    }

    /// The focus's parent, if it has one.
    pub fn parent(&self) -> Option<&Zipper> {
        self.parent.as_deref()
    }

    /// How many steps up it is to the root.
    pub fn depth(&self) -> usize {
        self.iter_upward().count() - 1
    }

    /// Iterates from the focus up to the root (inclusive).
    pub fn iter_upward(&self) -> impl Iterator<Item = &Zipper> {
        std::iter::successors(Some(self), |z| z.parent.as_deref())
    }

    /// The whole tree that we're pointing into.
    pub fn root(&self) -> Rc<AltTree> {
        let mut z = self;
        while let Some(p) = &z.parent {
            z = p;
        }
        Rc::clone(&z.focus)
    }

    /// Moves to the `idx`th child of the focus.
    ///
    /// Panics if there is no such child.
    pub fn child(&self, idx: usize) -> Zipper {
        assert!(
            idx < self.focus.children.len(),
            "descended to non-existent child {idx} of a node with {} children",
            self.focus.children.len()
        );
        Zipper {
            focus: Rc::clone(&self.focus.children[idx]),
            parent: Some(Rc::new(self.clone())),
            index: idx,
        }
    }

    /// Follows a path of child indices down from the focus.
    ///
    /// Panics if one of the indices doesn't exist.
    pub fn descend(&self, indices: &[usize]) -> Zipper {
        let mut ret = self.clone();
        for &idx in indices {
            ret = ret.child(idx);
        }
        ret
    }

    // The child indices leading from the root down to the focus.
    fn path(&self) -> Vec<usize> {
        let mut ret: Vec<_> = self
            .iter_upward()
            .filter(|z| z.parent.is_some())
            .map(|z| z.index)
            .collect();
        ret.reverse();
        ret
    }

    /// Finds the deepest node that is an ancestor of (or equal to) both
    /// `self` and `other`.
    ///
    /// Panics if the two zippers point into different trees.
    pub fn most_recent_common_ancestor(&self, other: &Zipper) -> Zipper {
        assert!(
            Rc::ptr_eq(&self.root(), &other.root()),
            "no common ancestor: the two zippers are in different trees"
        );
        let ours = self.path();
        let theirs = other.path();
        let common = ours
            .iter()
            .zip(&theirs)
            .take_while(|(a, b)| a == b)
            .count();
        let levels_up = ours.len() - common;
        let mut z = self;
        for _ in 0..levels_up {
            if let Some(p) = &z.parent {
                z = p;
            }
        }
        z.clone()
    }

    /// Cuts out the path from the focus up to (but not including) `stop`.
    ///
    /// If `stop` is `None`, cuts all the way through the root. Panics if `stop`
    /// isn't an ancestor of the focus.
    pub fn prune_upward_to(&self, stop: Option<&Zipper>) -> Pruned {
        let steps = match stop {
            Some(stop) => {
                let stop_path = stop.path();
                let path = self.path();
                assert!(
                    path.starts_with(&stop_path),
                    "can only prune up to an ancestor"
                );
                path.len() - stop_path.len()
            }
            None => self.depth() + 1,
        };

        let mut orphans = Vec::new();
        let mut removed = Vec::new();
        let mut on_path: Option<usize> = None;
        for z in self.iter_upward().take(steps) {
            orphans.extend(
                z.focus
                    .children
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| Some(*idx) != on_path)
                    .map(|(_, c)| Rc::clone(c)),
            );
            removed.push(z.focus.value.clone());
            on_path = z.parent.as_ref().map(|_| z.index);
        }
        Pruned {
            orphans,
            removed,
            top: on_path,
        }
    }

    /// Re-roots the tree at the focus.
    ///
    /// The old ancestors of the focus become a new child subtree, keeping
    /// their layers. Each inner node on the old path trades its old child
    /// for its old parent, so if the focus is an outer node then the
    /// [`AltTree::matchings`] of the result are the matchings you get by
    /// augmenting along the path from the old root to the focus.
    ///
    /// Panics if the focus is an inner node with a parent, since it would
    /// end up with two children.
    pub fn as_new_augmented_root(&self) -> AltTree {
        self.rerooted(None)
    }

    fn rerooted(&self, excluded: Option<usize>) -> AltTree {
        let mut children: Vec<_> = self
            .focus
            .children
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != excluded)
            .map(|(_, c)| Rc::clone(c))
            .collect();
        if let Some(parent) = &self.parent {
            children.push(Rc::new(parent.rerooted(Some(self.index))));
        }
        AltTree::new(self.focus.value.clone(), self.focus.outer, children)
    }

    /// Adds a new child at the focus.
    pub fn with_appended_child(&self, child: Rc<AltTree>) -> Zipper {
        let mut children = self.focus.children.clone();
        children.push(child);
        let subtree = AltTree::new(self.focus.value.clone(), self.focus.outer, children);
        self.with_subtree_replaced_by(Rc::new(subtree))
    }

    /// Replaces the focused subtree, rebuilding the path up to the root.
    pub fn with_subtree_replaced_by(&self, subtree: Rc<AltTree>) -> Zipper {
        let parent = self.parent.as_ref().map(|parent| {
            let mut siblings = parent.focus.children.clone();
            siblings[self.index] = Rc::clone(&subtree);
            let node = AltTree::new(parent.focus.value.clone(), parent.focus.outer, siblings);
            Rc::new(parent.with_subtree_replaced_by(Rc::new(node)))
        });
        Zipper {
            focus: subtree,
            parent,
            index: self.index,
        }
    }
}
