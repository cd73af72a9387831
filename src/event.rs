//! The things that can happen in a single step of the simulation.
//!
//! Every event has a predicted time, and knows how to turn itself into an
//! [`Edit`] of the state at which it was predicted. Resolving an event doesn't
//! grow anything: the state only calls [`Event::edit`] on events that happen
//! right now, and waits out everything else.

use std::rc::Rc;

use crate::{
    blossom::Blossom,
    edit::{Edit, Transform},
    matching::Matching,
    tree::{AltTree, Zipper},
};

/// A predicted event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Nothing happens except that every tree grows.
    Wait {
        /// How long to grow for.
        time: f64,
    },
    /// Two different trees collide, creating an augmenting path.
    TreeHitTree {
        /// When the trees collide.
        time: f64,
        /// One of the trees.
        first: Rc<AltTree>,
        /// The other tree.
        second: Rc<AltTree>,
    },
    /// Two outer nodes of the same tree collide, closing an odd cycle.
    TreeHitSelf {
        /// When the nodes collide.
        time: f64,
        /// One of the colliding nodes.
        first: Zipper,
        /// The other colliding node, in the same tree as `first`.
        second: Zipper,
    },
    /// A tree collides with a matching, which joins the tree.
    TreeHitMatch {
        /// When they collide.
        time: f64,
        /// The tree.
        tree: Rc<AltTree>,
        /// The matching.
        matching: Rc<Matching>,
    },
    /// An inner blossom has shrunk back down to the size of its members.
    BlossomExpand {
        /// When the blossom's weight delta reaches zero.
        time: f64,
        /// An inner tree node holding a blossom.
        blossom: Zipper,
    },
}

impl Event {
    /// Creates a blossom expansion event.
    ///
    /// Panics unless `blossom` is focused on an inner node, with a parent,
    /// whose value is a blossom.
    pub fn blossom_expand(time: f64, blossom: Zipper) -> Self {
        assert!(
            !blossom.focus().is_outer(),
            "only inner blossoms can expand"
        );
        assert!(
            blossom.focus().value().as_blossom().is_some(),
            "can't expand a non-blossom: {}",
            blossom.focus().value()
        );
        assert!(
            blossom.parent().is_some(),
            "an expanding blossom needs a parent"
        );
        Event::BlossomExpand { time, blossom }
    }

    /// When this event is predicted to happen, relative to now.
    pub fn time(&self) -> f64 {
        match self {
            Event::Wait { time }
            | Event::TreeHitTree { time, .. }
            | Event::TreeHitSelf { time, .. }
            | Event::TreeHitMatch { time, .. }
            | Event::BlossomExpand { time, .. } => *time,
        }
    }

    /// What resolving this event does to the state.
    pub fn edit(&self) -> Edit {
        match self {
            Event::Wait { time } => Edit::new().transform(Transform::Grow(*time)),
            Event::TreeHitTree { first, second, .. } => tree_hit_tree(first, second),
            Event::TreeHitSelf { first, second, .. } => tree_hit_self(first, second),
            Event::TreeHitMatch { tree, matching, .. } => tree_hit_match(tree, matching),
            Event::BlossomExpand { blossom, .. } => blossom_expand(blossom),
        }
    }
}

fn tree_hit_tree(first: &Rc<AltTree>, second: &Rc<AltTree>) -> Edit {
    let c1 = first.closest_outer_node_to(second.as_ref());
    let c2 = second.closest_outer_node_to(c1.focus().value());

    let mut edit = Edit::new()
        .remove(Rc::clone(first))
        .remove(Rc::clone(second));
    let augmented = c1
        .as_new_augmented_root()
        .matchings()
        .into_iter()
        .chain(c2.as_new_augmented_root().matchings());
    for m in augmented {
        edit = edit.add(m);
    }
    edit.add(Matching::new(
        c1.focus().value().clone(),
        c2.focus().value().clone(),
    ))
}

fn tree_hit_self(first: &Zipper, second: &Zipper) -> Edit {
    let c = first.most_recent_common_ancestor(second);
    let p1 = first.prune_upward_to(Some(&c));
    let p2 = second.prune_upward_to(Some(&c));

    let mut orphans: Vec<_> = c
        .focus()
        .children()
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != p1.top && Some(*idx) != p2.top)
        .map(|(_, child)| Rc::clone(child))
        .collect();
    orphans.extend(p1.orphans);
    orphans.extend(p2.orphans);

    // Up one path, across the ancestor, and back down the other path.
    let mut cycle = p1.removed;
    cycle.push(c.focus().value().clone());
    cycle.extend(p2.removed.into_iter().rev());

    let blossom = Blossom::new(cycle, 0.0);
    let subtree = AltTree::new(blossom, true, orphans);
    let new_root = c.with_subtree_replaced_by(Rc::new(subtree)).root();
    Edit::new().remove(first.root()).add(new_root)
}

fn tree_hit_match(tree: &Rc<AltTree>, matching: &Rc<Matching>) -> Edit {
    let subtree = AltTree::from_matching_rooted_closest_to(matching, tree.as_ref());
    let closest = tree.closest_outer_node_to(matching.as_ref());
    let new_tree = closest.with_appended_child(Rc::new(subtree)).root();
    Edit::new()
        .remove(Rc::clone(matching))
        .remove(Rc::clone(tree))
        .add(new_tree)
}

fn blossom_expand(zipper: &Zipper) -> Edit {
    let node = zipper.focus();
    let Some(blossom) = node.value().as_blossom() else {
        panic!("can't expand a non-blossom: {}", node.value());
    };
    let Some(parent) = zipper.parent() else {
        panic!("an expanding blossom needs a parent");
    };
    let child = &node.children()[0];

    let i = blossom.closest_member_to(parent.focus().value());
    let j = blossom.closest_member_to(child.value());
    let (mut p0, mut p1) = cycle_split(blossom.cycle(), i as isize, j as isize);
    p1.reverse();
    // `p1` becomes the new chain in the tree, and it needs to be odd.
    if p1.len() % 2 == 0 {
        std::mem::swap(&mut p0, &mut p1);
    }

    let mut edit = Edit::new().remove(zipper.root());
    for k in (1..p0.len().saturating_sub(2)).step_by(2) {
        edit = edit.add(Matching::new(p0[k].clone(), p0[k + 1].clone()));
    }

    let last = p1.len() - 1;
    let mut chain = AltTree::new(p1[last].clone(), false, vec![Rc::clone(child)]);
    for k in (0..last).step_by(2).rev() {
        chain = AltTree::inner_outer(p1[k].clone(), p1[k + 1].clone(), vec![Rc::new(chain)]);
    }
    edit.add(zipper.with_subtree_replaced_by(Rc::new(chain)).root())
}

/// Splits a cycle into two arcs, between the elements at `i` and `j`.
///
/// The first arc runs forwards from `i` to `j` and the second runs forwards
/// from `j` to `i`, both inclusive, so the two arcs share their endpoints. If
/// `i` and `j` are the same, the first arc is just that element and the second
/// one goes all the way around. Indices wrap around, in both directions.
///
/// Panics if `items` is empty.
pub fn cycle_split<T: Clone>(items: &[T], i: isize, j: isize) -> (Vec<T>, Vec<T>) {
    assert!(!items.is_empty(), "can't split an empty cycle");
    let n = items.len();
    let i = i.rem_euclid(n as isize) as usize;
    let j = j.rem_euclid(n as isize) as usize;
    if i == j {
        let around = items[i..].iter().chain(&items[..=i]).cloned().collect();
        return (vec![items[i].clone()], around);
    }

    let arc = |from: usize, to: usize| {
        let mut ret = Vec::new();
        let mut k = from;
        while k != to {
            ret.push(items[k].clone());
            k = (k + 1) % n;
        }
        ret.push(items[to].clone());
        ret
    };
    (arc(i, j), arc(j, i))
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Wait { time } => write!(f, "wait {time}"),
            Event::TreeHitTree {
                time,
                first,
                second,
            } => write!(
                f,
                "tree hit tree at {time}: {} and {}",
                first.value(),
                second.value()
            ),
            Event::TreeHitSelf {
                time,
                first,
                second,
            } => write!(
                f,
                "tree hit self at {time}: {} and {}",
                first.focus().value(),
                second.focus().value()
            ),
            Event::TreeHitMatch {
                time,
                tree,
                matching,
            } => write!(f, "tree hit match at {time}: {} and {matching}", tree.value()),
            Event::BlossomExpand { time, blossom } => {
                write!(f, "blossom expand at {time}: {}", blossom.focus().value())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        edit::Member,
        piece::{Matchable, Node, Piece},
        tree::tests::TestBuilder,
    };

    #[test]
    fn cycle_split_fixtures() {
        assert_eq!(
            cycle_split(&['a', 'b', 'c'], 0, 0),
            (vec!['a'], vec!['a', 'b', 'c', 'a'])
        );
        assert_eq!(
            cycle_split(&['a', 'b', 'c'], 0, 1),
            (vec!['a', 'b'], vec!['b', 'c', 'a'])
        );

        let seven: Vec<u32> = (0..7).collect();
        let f = |i, j| cycle_split(&seven, i, j);
        assert_eq!(f(0, 0), (vec![0], vec![0, 1, 2, 3, 4, 5, 6, 0]));
        assert_eq!(f(1, 1), (vec![1], vec![1, 2, 3, 4, 5, 6, 0, 1]));
        assert_eq!(f(2, 2), (vec![2], vec![2, 3, 4, 5, 6, 0, 1, 2]));

        assert_eq!(f(0, 1), (vec![0, 1], vec![1, 2, 3, 4, 5, 6, 0]));
        assert_eq!(f(1, 2), (vec![1, 2], vec![2, 3, 4, 5, 6, 0, 1]));
        assert_eq!(f(2, 1), (vec![2, 3, 4, 5, 6, 0, 1], vec![1, 2]));

        assert_eq!(f(1, 3), (vec![1, 2, 3], vec![3, 4, 5, 6, 0, 1]));
        assert_eq!(f(1, 4), (vec![1, 2, 3, 4], vec![4, 5, 6, 0, 1]));

        assert_eq!(f(0, 6), (vec![0, 1, 2, 3, 4, 5, 6], vec![6, 0]));
        assert_eq!(f(6, 0), (vec![6, 0], vec![0, 1, 2, 3, 4, 5, 6]));

        // Negative and oversized indices wrap.
        assert_eq!(f(-1, 7), f(6, 0));
        assert_eq!(f(-13, -13), f(1, 1));
    }

    proptest! {
        #[test]
        fn cycle_split_reassembles(n in 1usize..20, i in -40isize..40, j in -40isize..40) {
            let items: Vec<usize> = (0..n).collect();
            let (a, b) = cycle_split(&items, i, j);
            prop_assert_eq!(a.first(), b.last());
            prop_assert_eq!(a.last(), b.first());
            prop_assert_eq!(a.len() + b.len(), n + 2);

            // Walking forwards along the first arc and then the second visits
            // everything exactly once.
            let mut walk = a.clone();
            walk.extend_from_slice(&b[1..b.len() - 1]);
            let start = walk[0];
            let expected: Vec<_> = (0..n).map(|k| (start + k) % n).collect();
            prop_assert_eq!(walk, expected);
        }
    }

    #[test]
    fn wait_grows_trees_only() {
        let tree: Rc<AltTree> = Rc::new(AltTree::inner_outer(
            Node::new((0.0, 0.0), 2.0),
            Node::new((5.0, 0.0), 1.0),
            vec![],
        ));
        let tree = Rc::new(AltTree::new(Node::new((-4.0, 0.0), 2.0), true, vec![tree]));
        let m = Rc::new(Matching::new(Node::new((9.0, 9.0), 1.0), Node::new((9.0, 11.0), 1.0)));

        let edit = Event::Wait { time: 0.5 }.edit();
        let grow = edit.full_transformer();
        let Member::Tree(grown) = grow(&Member::Tree(Rc::clone(&tree))) else {
            panic!("growing a tree made a non-tree");
        };
        let weights: Vec<_> = grown.all_disks().iter().map(|n| n.weight).collect();
        assert_eq!(weights, vec![2.5, 1.5, 1.5]);
        assert_eq!(grow(&Member::Match(Rc::clone(&m))), Member::Match(m));
    }

    #[test]
    fn tree_hit_tree_finalizes_paths() {
        // a => b is matched below the root r; x is a singleton near b.
        let r = Node::new((0.0, 0.0), 1.0);
        let a = Node::new((2.0, 0.0), 1.0);
        let b = Node::new((4.0, 0.0), 1.0);
        let x = Node::new((7.0, 0.0), 1.0);
        let t1 = Rc::new(AltTree::new(
            r,
            true,
            vec![Rc::new(AltTree::inner_outer(a, b, vec![]))],
        ));
        let t2 = Rc::new(AltTree::leaf(x));
        let event = Event::TreeHitTree {
            time: 0.5,
            first: Rc::clone(&t1),
            second: Rc::clone(&t2),
        };

        let edit = event.edit();
        assert!(edit.removes(&Member::Tree(t1)));
        assert!(edit.removes(&Member::Tree(t2)));
        assert_eq!(
            edit.added(),
            &[
                Member::from(Matching::new(a, r)),
                Member::from(Matching::new(b, x)),
            ]
        );
    }

    #[test]
    fn tree_hit_match_grafts_closer_end() {
        let root = Node::new((0.0, 0.0), 1.0);
        let near = Node::new((3.0, 0.0), 1.0);
        let far = Node::new((5.0, 0.0), 1.0);
        let tree = Rc::new(AltTree::leaf(root));
        let matching = Rc::new(Matching::new(far, near));
        let event = Event::TreeHitMatch {
            time: 1.0,
            tree: Rc::clone(&tree),
            matching: Rc::clone(&matching),
        };

        let edit = event.edit();
        assert!(edit.removes(&Member::Tree(tree)));
        assert!(edit.removes(&Member::Match(matching)));
        let expected = AltTree::new(
            root,
            true,
            vec![Rc::new(AltTree::inner_outer(near, far, vec![]))],
        );
        assert_eq!(edit.added(), &[Member::from(expected)]);
    }

    #[test]
    fn tree_hit_self_makes_blossom() {
        let t = TestBuilder::default();
        let tree = t.root(vec![t.t(vec![t.t(vec![]), t.t(vec![])]), t.t(vec![])]);
        let z1 = tree.descend(&[0, 0, 0, 0]);
        let z2 = tree.descend(&[0, 0, 1, 0]);
        let event = Event::TreeHitSelf {
            time: 0.0,
            first: z1.clone(),
            second: z2.clone(),
        };

        let edit = event.edit();
        assert!(edit.removes(&Member::Tree(Rc::clone(&tree))));
        let [Member::Tree(new_tree)] = edit.added() else {
            panic!("expected a single new tree, got {:?}", edit.added());
        };
        new_tree.check_invariants();
        assert_eq!(new_tree.size(), tree.size() - 4);

        let blossom_node = new_tree.descend(&[0, 0]);
        assert!(blossom_node.focus().is_outer());
        let Some(blossom) = blossom_node.focus().value().as_blossom() else {
            panic!("no blossom at the common ancestor");
        };
        let value = |path: &[usize]| tree.descend(path).focus().value().clone();
        assert_eq!(
            blossom.cycle(),
            &[
                value(&[0, 0, 0, 0]),
                value(&[0, 0, 0]),
                value(&[0, 0]),
                value(&[0, 0, 1]),
                value(&[0, 0, 1, 0]),
            ]
        );
        assert_eq!(blossom.weight_delta(), 0.0);
        assert!(blossom_node.focus().children().is_empty());

        // The rest of the tree is shared with the old one.
        assert!(Rc::ptr_eq(&new_tree.children()[1], &tree.children()[1]));
    }

    #[test]
    fn blossom_expand_literal() {
        let t = TestBuilder::default();
        let tree = t.root(vec![t.t(vec![
            t.t(vec![t.t(vec![]), t.t(vec![])]),
            t.t(vec![]),
            t.t(vec![]),
        ])]);
        let target = tree.descend(&[0, 0, 0]);
        let child = Rc::clone(&target.focus().children()[0]);

        let far = Node::new((-1.0, -1.0), -1.0);
        let n1 = Node::new((1000.0, 1001.0), 1.0);
        let n2 = Node::new((1000.0, 1002.0), 1.0);
        let n3 = Node::new((1000.0, 1003.0), 1.0);
        let n4 = Node::new((1000.0, 1004.0), 1.0);
        let blossom = Blossom::new(
            vec![Matchable::from(far), n1.into(), n2.into(), n3.into(), n4.into()],
            0.0,
        );
        let with_blossom = target
            .with_subtree_replaced_by(Rc::new(AltTree::new(blossom, false, vec![Rc::clone(&child)])))
            .root();
        let expected_tree = target
            .with_subtree_replaced_by(Rc::new(AltTree::new(far, false, vec![child])))
            .root();

        let event = Event::blossom_expand(0.0, with_blossom.descend(&[0, 0, 0]));
        assert_eq!(
            event.edit(),
            Edit::new()
                .remove(Rc::clone(&with_blossom))
                .add(Matching::new(n4, n3))
                .add(Matching::new(n2, n1))
                .add(expected_tree)
        );
    }

    #[test]
    fn blossom_expand_builds_chain() {
        // The parent touches member 0 and the child touches member 2, so the
        // short way round (0, 1, 2) goes into the tree and the long way round
        // gets matched up.
        let members: Vec<Matchable> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]
            .into_iter()
            .map(|p| Node::new(p, 0.5).into())
            .collect();
        let blossom = Blossom::new(members.clone(), 0.0);
        let parent = Node::new((-3.0, 0.0), 0.0);
        let child = Rc::new(AltTree::leaf(Node::new((5.0, 0.0), 0.0)));
        let tree = Rc::new(AltTree::new(
            parent,
            true,
            vec![Rc::new(AltTree::new(blossom, false, vec![Rc::clone(&child)]))],
        ));

        let edit = Event::blossom_expand(0.0, tree.descend(&[0])).edit();
        let (matchings, trees): (Vec<_>, Vec<_>) =
            edit.added().iter().partition(|m| matches!(m, Member::Match(_)));
        assert_eq!(matchings, vec![&Member::from(Matching::new(members[4].clone(), members[3].clone()))]);
        let [Member::Tree(new_tree)] = trees.as_slice() else {
            panic!("expected one tree, got {trees:?}");
        };
        new_tree.check_invariants();
        let chain: Vec<_> = [&[0][..], &[0, 0], &[0, 0, 0]]
            .iter()
            .map(|path| new_tree.descend(path).focus().value().clone())
            .collect();
        assert_eq!(chain, members[..3].to_vec());
        assert!(Rc::ptr_eq(new_tree.descend(&[0, 0, 0, 0]).focus(), &child));
    }

    #[test]
    #[should_panic(expected = "needs a parent")]
    fn blossom_expand_at_root() {
        let blossom = Blossom::new(
            vec![
                Matchable::from(Node::new((0.0, 0.0), 0.0)),
                Node::new((1.0, 0.0), 0.0).into(),
                Node::new((0.0, 1.0), 0.0).into(),
            ],
            0.0,
        );
        let tree = Rc::new(AltTree::new(
            blossom,
            false,
            vec![Rc::new(AltTree::leaf(Node::new((5.0, 5.0), 0.0)))],
        ));
        Event::blossom_expand(0.0, tree.zipper());
    }

    #[test]
    fn times() {
        assert_eq!(Event::Wait { time: 2.0 }.time(), 2.0);
        let t = TestBuilder::default();
        let tree = t.root(vec![]);
        let event = Event::TreeHitSelf {
            time: -0.5,
            first: tree.zipper(),
            second: tree.zipper(),
        };
        assert_eq!(event.time(), -0.5);
    }
}
