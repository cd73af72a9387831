//! The whole simulation at a single moment, and how to step it forward.

use std::rc::Rc;

use kurbo::Point;

use crate::{
    draw::Surface,
    edit::{Edit, Member},
    event::Event,
    matching::Matching,
    piece::{Node, Piece},
    tree::{self, AltTree},
};

/// The longest we'll grow for in a single step, even if nothing happens.
pub const WAIT_HORIZON: f64 = 1.0;

/// Events predicted further in the future than this get waited for, instead
/// of resolved.
pub const EVENT_EPSILON: f64 = 1e-8;

/// A forest of alternating trees, along with some finalized matchings.
///
/// Every input point lives in exactly one place: either somewhere in a tree
/// (possibly deep inside a blossom), or at one end of a matching. States are
/// immutable; [`State::advance`] returns a new one, sharing whatever didn't
/// change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    trees: Vec<Rc<AltTree>>,
    matches: Vec<Rc<Matching>>,
}

impl State {
    /// Creates a new state.
    ///
    /// Panics if any of the trees has an inner root.
    pub fn new(trees: Vec<Rc<AltTree>>, matches: Vec<Rc<Matching>>) -> Self {
        for t in &trees {
            assert!(t.is_outer(), "not an outer alternating tree: {t}");
        }
        State { trees, matches }
    }

    /// The starting state for some points: each one is in its own tree, with
    /// a disk of radius zero.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let trees = points
            .into_iter()
            .map(|p| Rc::new(AltTree::leaf(Node::new(p, 0.0))))
            .collect();
        State::new(trees, Vec::new())
    }

    /// The alternating trees, in order.
    pub fn trees(&self) -> &[Rc<AltTree>] {
        &self.trees
    }

    /// The finalized matchings, in order.
    pub fn matches(&self) -> &[Rc<Matching>] {
        &self.matches
    }

    /// Is everything matched?
    pub fn is_finished(&self) -> bool {
        self.trees.is_empty()
    }

    /// Every event that could happen next, along with when it would happen.
    ///
    /// The order is: a wait, then collisions between pairs of trees, then
    /// collisions within trees, then collisions between trees and matchings,
    /// and finally blossom expansions.
    pub fn predicted_events(&self) -> Vec<Event> {
        let mut ret = vec![Event::Wait { time: WAIT_HORIZON }];

        for (i, first) in self.trees.iter().enumerate() {
            for second in &self.trees[(i + 1)..] {
                ret.push(Event::TreeHitTree {
                    time: first.time_until_collision(second.as_ref()),
                    first: Rc::clone(first),
                    second: Rc::clone(second),
                });
            }
        }

        for tree in &self.trees {
            let outer = tree.outer_nodes_with_ancestry();
            for (i, first) in outer.iter().enumerate() {
                for second in &outer[(i + 1)..] {
                    ret.push(Event::TreeHitSelf {
                        time: first
                            .focus()
                            .value()
                            .time_until_collision(second.focus().value()),
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }

        for tree in &self.trees {
            for matching in &self.matches {
                ret.push(Event::TreeHitMatch {
                    time: tree.time_until_collision(matching.as_ref()),
                    tree: Rc::clone(tree),
                    matching: Rc::clone(matching),
                });
            }
        }

        for tree in &self.trees {
            for z in tree.nodes_with_ancestry() {
                if z.focus().is_outer() {
                    continue;
                }
                if let Some(b) = z.focus().value().as_blossom() {
                    ret.push(Event::blossom_expand(b.weight_delta(), z));
                }
            }
        }

        ret
    }

    /// The event that is predicted to happen first.
    ///
    /// Ties go to whichever event comes first in
    /// [`predicted_events`](State::predicted_events).
    pub fn earliest_event(&self) -> Event {
        let mut events = self.predicted_events().into_iter();
        // There's always at least the wait.
        let mut best = events.next().unwrap_or(Event::Wait { time: WAIT_HORIZON });
        for e in events {
            if e.time() < best.time() {
                best = e;
            }
        }
        best
    }

    /// The event that [`advance`](State::advance) will resolve.
    ///
    /// This is the earliest event if it's happening right now. Otherwise, it's
    /// a wait that lasts until the earliest event.
    pub fn next_event(&self) -> Event {
        let event = self.earliest_event();
        if event.time() > EVENT_EPSILON {
            Event::Wait { time: event.time() }
        } else {
            event
        }
    }

    /// Takes a single step of the simulation.
    pub fn advance(&self) -> State {
        let event = self.next_event();
        log::debug!("chosen event: {event}");
        let edit = event.edit();
        log::trace!("chosen edit:\n{edit}");

        let ret = self.edited(&edit);
        #[cfg(feature = "slow-asserts")]
        ret.check_invariants();
        ret
    }

    /// Applies an edit.
    ///
    /// Every tree and matching not removed by the edit gets transformed, and
    /// then the edit's new members get added at the end.
    pub fn edited(&self, edit: &Edit) -> State {
        let transform = edit.full_transformer();
        let survivors = self
            .trees
            .iter()
            .map(|t| Member::Tree(Rc::clone(t)))
            .chain(self.matches.iter().map(|m| Member::Match(Rc::clone(m))))
            .filter(|m| !edit.removes(m))
            .map(|m| transform(&m));

        let mut trees = Vec::new();
        let mut matches = Vec::new();
        for member in survivors.chain(edit.added().iter().cloned()) {
            match member {
                Member::Tree(t) => trees.push(t),
                Member::Match(m) => matches.push(m),
            }
        }
        State::new(trees, matches)
    }

    /// Checks that every tree has an outer root, that every tree's layers
    /// alternate (with one child per inner node), and that every blossom
    /// is odd.
    pub fn check_invariants(&self) {
        for t in &self.trees {
            assert!(t.is_outer());
            t.check_invariants();
        }
        for m in &self.matches {
            tree::check_blossoms(m.first());
            tree::check_blossoms(m.second());
        }
    }

    /// All the original input points, wherever they are.
    pub fn points(&self) -> Vec<Point> {
        let mut ret: Vec<_> = self.trees.iter().flat_map(|t| t.points()).collect();
        ret.extend(self.matches.iter().flat_map(|m| m.points()));
        ret
    }

    /// The finalized matchings, flattened into pairs of input points.
    ///
    /// Points that are still in trees don't appear.
    pub fn matched_pairs(&self) -> Vec<(Point, Point)> {
        self.matches.iter().flat_map(|m| m.point_pairs()).collect()
    }

    /// Draws all the trees and matchings.
    pub fn draw(&self, surface: &mut impl Surface) {
        for t in &self.trees {
            t.draw(surface);
        }
        for m in &self.matches {
            m.draw(surface);
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for t in &self.trees {
            writeln!(f, "{t}")?;
        }
        for m in &self.matches {
            writeln!(f, "{m}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{
        draw::{tests::Recorder, Layer},
        piece::Matchable,
    };

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn starting_state() {
        let state = State::from_points(pts(&[(0.0, 0.0), (3.0, 4.0)]));
        assert_eq!(state.trees().len(), 2);
        assert!(state.matches().is_empty());
        for t in state.trees() {
            assert!(t.is_outer());
            assert!(t.children().is_empty());
            assert_matches!(t.value(), Matchable::Node(n) if n.weight == 0.0);
        }
        assert!(!state.is_finished());
        assert!(State::from_points([]).is_finished());
    }

    #[test]
    #[should_panic(expected = "not an outer alternating tree")]
    fn inner_root() {
        let tree = AltTree::inner_outer(
            Node::new((0.0, 0.0), 0.0),
            Node::new((1.0, 0.0), 0.0),
            vec![],
        );
        State::new(vec![Rc::new(tree)], vec![]);
    }

    #[test]
    fn two_point_predictions() {
        let state = State::from_points(pts(&[(0.0, 0.0), (10.0, 0.0)]));
        let events = state.predicted_events();
        assert_eq!(events.len(), 2);
        assert_matches!(events[0], Event::Wait { time } if time == WAIT_HORIZON);
        assert_matches!(events[1], Event::TreeHitTree { time, .. } if time == 5.0);

        // The collision is far away, so we wait.
        assert_matches!(state.earliest_event(), Event::Wait { time } if time == 1.0);
        assert_matches!(state.next_event(), Event::Wait { time } if time == 1.0);
    }

    #[test]
    fn demotes_future_events() {
        let state = State::from_points(pts(&[(0.0, 0.0), (1.0, 0.0)]));
        assert_matches!(state.earliest_event(), Event::TreeHitTree { time, .. } if time == 0.5);
        assert_matches!(state.next_event(), Event::Wait { time } if time == 0.5);

        let state = state.advance();
        assert_matches!(state.next_event(), Event::TreeHitTree { time, .. } if time == 0.0);
        let state = state.advance();
        assert!(state.is_finished());
        assert_eq!(state.matches().len(), 1);
        assert_eq!(
            state.matched_pairs(),
            vec![(Point::new(0.0, 0.0), Point::new(1.0, 0.0))]
        );
    }

    #[test]
    fn waiting_leaves_matches_alone() {
        let m = Rc::new(Matching::new(
            Node::new((0.0, 0.0), 1.0),
            Node::new((2.0, 0.0), 1.0),
        ));
        let tree = Rc::new(AltTree::leaf(Node::new((100.0, 0.0), 0.0)));
        let state = State::new(vec![tree], vec![Rc::clone(&m)]);
        let next = state.advance();
        assert!(Rc::ptr_eq(&next.matches()[0], &m));
        assert_eq!(next.trees()[0].all_disks()[0].weight, 1.0);
    }

    #[test]
    fn edits_remove_by_identity() {
        let a = Rc::new(AltTree::leaf(Node::new((0.0, 0.0), 0.0)));
        let b = Rc::new(AltTree::leaf(Node::new((0.0, 0.0), 0.0)));
        let state = State::new(vec![Rc::clone(&a), Rc::clone(&b)], vec![]);
        let edit = Edit::new()
            .remove(Rc::clone(&a))
            .add(Matching::new(Node::new((5.0, 5.0), 0.0), Node::new((6.0, 5.0), 0.0)));

        let next = state.edited(&edit);
        assert_eq!(next.trees().len(), 1);
        assert!(Rc::ptr_eq(&next.trees()[0], &b));
        assert_eq!(next.matches().len(), 1);
    }

    #[test]
    fn deterministic() {
        let state = State::from_points(pts(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (5.0, 8.660254037844386),
            (30.0, 1.0),
        ]));
        let mut a = state.clone();
        let mut b = state;
        for _ in 0..40 {
            a = a.advance();
            b = b.advance();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn partition_is_preserved() {
        let input = pts(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (5.0, 8.0),
            (20.0, 3.0),
            (-7.0, 2.0),
            (3.0, -9.0),
        ]);
        let sorted = |mut v: Vec<Point>| {
            v.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
            v
        };
        let expected = sorted(input.clone());
        let mut state = State::from_points(input);
        for _ in 0..500 {
            if state.is_finished() {
                break;
            }
            state = state.advance();
            state.check_invariants();
            assert_eq!(sorted(state.points()), expected);
        }
        assert!(state.is_finished());
        assert_eq!(state.matched_pairs().len(), 3);
    }

    #[test]
    fn drawing() {
        let m = Rc::new(Matching::new(
            Node::new((0.0, 0.0), 1.0),
            Node::new((2.0, 0.0), 1.0),
        ));
        let tree = Rc::new(AltTree::new(
            Node::new((10.0, 0.0), 1.0),
            true,
            vec![Rc::new(AltTree::inner_outer(
                Node::new((12.0, 0.0), 1.0),
                Node::new((14.0, 0.0), 1.0),
                vec![],
            ))],
        ));
        let state = State::new(vec![tree], vec![m]);
        let mut surface = Recorder::default();
        state.draw(&mut surface);

        let layers: Vec<_> = surface.disks.iter().map(|d| d.2).collect();
        assert_eq!(
            layers,
            vec![
                Layer::Outer,
                Layer::Inner,
                Layer::Outer,
                Layer::Matched,
                Layer::Matched
            ]
        );
        assert_eq!(surface.edges.len(), 3);
    }
}
