//! Pieces: the things whose disks grow, shrink, and collide.
//!
//! Every piece of the simulation (a single point, a contracted blossom, a
//! whole alternating tree, or a finalized matching) owns a collection of
//! weighted disks. Each disk changes radius at a fixed rate, and the time until
//! two pieces collide is determined entirely by those disks and rates.

use kurbo::Point;

use crate::{
    blossom::Blossom,
    draw::{Layer, Surface},
};

/// A disk, together with the rate at which its radius is changing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatedDisk {
    /// The disk itself.
    pub disk: Node,
    /// `1.0` for a growing disk, `-1.0` for a shrinking one, and `0.0` for a
    /// disk that is frozen in place.
    pub rate: f64,
}

/// Something with disks that can collide with the disks of something else.
pub trait Piece {
    /// A representative point, for drawing and tie-breaking.
    fn center(&self) -> Point;

    /// All the disks owned by this piece, at their current radii.
    fn all_disks(&self) -> Vec<Node>;

    /// All the disks owned by this piece, each tagged with its growth rate.
    fn disks_with_rate(&self) -> Vec<RatedDisk>;

    /// Returns a copy of this piece, with every owned radius changed by `dt`.
    ///
    /// The caller is responsible for choosing the sign of `dt`.
    fn after_growing(&self, dt: f64) -> Self
    where
        Self: Sized;

    /// How long until some disk of ours touches some disk of `other`, given
    /// the current growth rates.
    ///
    /// Pairs of disks that aren't converging are ignored, and if nothing
    /// converges the answer is infinite. The answer is negative if two disks
    /// already overlap.
    fn time_until_collision<P: Piece + ?Sized>(&self, other: &P) -> f64 {
        collision_time(&self.disks_with_rate(), &other.disks_with_rate(), false)
    }

    /// The smallest gap between a disk of ours and a disk of `other`,
    /// regardless of how fast they're growing.
    fn gap_to<P: Piece + ?Sized>(&self, other: &P) -> f64 {
        collision_time(&self.disks_with_rate(), &other.disks_with_rate(), true)
    }
}

fn collision_time(ours: &[RatedDisk], theirs: &[RatedDisk], ignore_rate: bool) -> f64 {
    let mut best = f64::INFINITY;
    for a in ours {
        for b in theirs {
            let rate = if ignore_rate { 1.0 } else { a.rate + b.rate };
            if rate > 0.0 {
                let gap = a.disk.pos.distance(b.disk.pos) - a.disk.weight - b.disk.weight;
                best = best.min(gap / rate);
            }
        }
    }
    best
}

/// A single input point, with its current disk radius.
///
/// The radius (which is also the point's dual variable) starts at zero. It
/// can become negative while the node sits in an inner layer of a tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Where the point is.
    pub pos: Point,
    /// The current radius of its disk.
    pub weight: f64,
}

impl Node {
    /// Creates a new node.
    pub fn new(pos: impl Into<Point>, weight: f64) -> Self {
        let pos = pos.into();
        debug_assert!(pos.is_finite());
        Node { pos, weight }
    }

    /// Paints this node's disk.
    pub fn draw(&self, surface: &mut impl Surface, layer: Layer, depth: usize) {
        surface.disk(self.pos, self.weight, layer, depth);
    }
}

impl Piece for Node {
    fn center(&self) -> Point {
        self.pos
    }

    fn all_disks(&self) -> Vec<Node> {
        vec![*self]
    }

    fn disks_with_rate(&self) -> Vec<RatedDisk> {
        vec![RatedDisk {
            disk: *self,
            rate: 1.0,
        }]
    }

    fn after_growing(&self, dt: f64) -> Self {
        Node::new(self.pos, self.weight + dt)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}; w={})", self.pos.x, self.pos.y, self.weight)
    }
}

/// A piece that can sit in a tree node or at the end of a matching.
#[derive(Clone, Debug, PartialEq)]
pub enum Matchable {
    /// A single point.
    Node(Node),
    /// An odd cycle, contracted into one piece.
    Blossom(Blossom),
}

impl Matchable {
    /// Returns the blossom, if this is one.
    pub fn as_blossom(&self) -> Option<&Blossom> {
        match self {
            Matchable::Node(_) => None,
            Matchable::Blossom(b) => Some(b),
        }
    }

    /// All the original input points inside this piece.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Matchable::Node(n) => vec![n.pos],
            Matchable::Blossom(b) => b.cycle().iter().flat_map(Matchable::points).collect(),
        }
    }

    /// Paints this piece.
    ///
    /// `depth` is the blossom nesting depth; it increases by one for each
    /// blossom we descend into.
    pub fn draw(&self, surface: &mut impl Surface, layer: Layer, depth: usize) {
        match self {
            Matchable::Node(n) => n.draw(surface, layer, depth),
            Matchable::Blossom(b) => b.draw(surface, layer, depth),
        }
    }
}

impl From<Node> for Matchable {
    fn from(n: Node) -> Self {
        Matchable::Node(n)
    }
}

impl From<Blossom> for Matchable {
    fn from(b: Blossom) -> Self {
        Matchable::Blossom(b)
    }
}

impl Piece for Matchable {
    fn center(&self) -> Point {
        match self {
            Matchable::Node(n) => n.center(),
            Matchable::Blossom(b) => b.center(),
        }
    }

    fn all_disks(&self) -> Vec<Node> {
        match self {
            Matchable::Node(n) => n.all_disks(),
            Matchable::Blossom(b) => b.all_disks(),
        }
    }

    fn disks_with_rate(&self) -> Vec<RatedDisk> {
        match self {
            Matchable::Node(n) => n.disks_with_rate(),
            Matchable::Blossom(b) => b.disks_with_rate(),
        }
    }

    fn after_growing(&self, dt: f64) -> Self {
        match self {
            Matchable::Node(n) => Matchable::Node(n.after_growing(dt)),
            Matchable::Blossom(b) => Matchable::Blossom(b.after_growing(dt)),
        }
    }
}

impl std::fmt::Display for Matchable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Matchable::Node(n) => n.fmt(f),
            Matchable::Blossom(b) => b.fmt(f),
        }
    }
}
