//! Blossoms: odd cycles contracted into a single piece.

use std::rc::Rc;

use kurbo::Point;

use crate::{
    draw::{Layer, Surface},
    piece::{Matchable, Node, Piece, RatedDisk},
};

/// An odd alternating cycle, contracted into a single piece.
///
/// The disks of a blossom are the disks of everything in its cycle, each
/// inflated by the blossom's own `weight_delta`. Growing a blossom only
/// changes `weight_delta`; the cycle itself is shared between all the
/// blossoms derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Blossom {
    cycle: Rc<[Matchable]>,
    weight_delta: f64,
}

impl Blossom {
    /// Creates a new blossom.
    ///
    /// Panics unless `cycle` has odd length (at least 3) and `weight_delta` is
    /// non-negative.
    pub fn new(cycle: impl Into<Rc<[Matchable]>>, weight_delta: f64) -> Self {
        let cycle = cycle.into();
        assert!(
            weight_delta >= 0.0,
            "blossom weight delta is negative: {weight_delta}"
        );
        assert!(
            cycle.len() >= 3 && cycle.len() % 2 == 1,
            "blossom cycle must be odd with at least 3 members, but has {}",
            cycle.len()
        );
        Blossom {
            cycle,
            weight_delta,
        }
    }

    /// The contracted cycle, in order.
    pub fn cycle(&self) -> &[Matchable] {
        &self.cycle
    }

    /// How much this blossom has grown since it was contracted.
    pub fn weight_delta(&self) -> f64 {
        self.weight_delta
    }

    /// The index of the cycle member that will collide soonest with `other`.
    ///
    /// Members are compared by their own disks, without this blossom's
    /// inflation. Ties go to the earliest member.
    pub fn closest_member_to<P: Piece + ?Sized>(&self, other: &P) -> usize {
        let mut best = 0;
        let mut best_time = f64::INFINITY;
        for (idx, member) in self.cycle.iter().enumerate() {
            let time = other.time_until_collision(member);
            if time < best_time {
                best = idx;
                best_time = time;
            }
        }
        best
    }

    /// Paints the inflated outline of this blossom, and then its members one
    /// level deeper.
    pub fn draw(&self, surface: &mut impl Surface, layer: Layer, depth: usize) {
        for disk in self.all_disks() {
            surface.disk(disk.pos, disk.weight, layer, depth);
        }
        for member in self.cycle.iter() {
            member.draw(surface, layer, depth + 1);
        }
    }
}

impl Piece for Blossom {
    fn center(&self) -> Point {
        self.cycle[0].center()
    }

    fn all_disks(&self) -> Vec<Node> {
        self.cycle
            .iter()
            .flat_map(Matchable::all_disks)
            .map(|n| Node::new(n.pos, n.weight + self.weight_delta))
            .collect()
    }

    fn disks_with_rate(&self) -> Vec<RatedDisk> {
        self.all_disks()
            .into_iter()
            .map(|disk| RatedDisk { disk, rate: 1.0 })
            .collect()
    }

    fn after_growing(&self, dt: f64) -> Self {
        Blossom::new(Rc::clone(&self.cycle), self.weight_delta + dt)
    }
}

impl std::fmt::Display for Blossom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Blossom(+{}; ", self.weight_delta)?;
        for (idx, member) in self.cycle.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{member}")?;
        }
        write!(f, ")")
    }
}
