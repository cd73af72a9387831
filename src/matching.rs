//! Finalized matchings, and resolving them back into pairs of points.

use kurbo::Point;

use crate::{
    draw::{EdgeKind, Layer, Surface},
    piece::{Matchable, Node, Piece, RatedDisk},
};

/// Two pieces that have been matched to one another.
///
/// A matching never grows: its disks are frozen at whatever radius they had
/// when it was created. Equality ignores the order of the two ends.
#[derive(Clone, Debug)]
pub struct Matching {
    first: Matchable,
    second: Matchable,
}

impl Matching {
    /// Matches two pieces.
    pub fn new(first: impl Into<Matchable>, second: impl Into<Matchable>) -> Self {
        Matching {
            first: first.into(),
            second: second.into(),
        }
    }

    /// One end.
    pub fn first(&self) -> &Matchable {
        &self.first
    }

    /// The other end.
    pub fn second(&self) -> &Matchable {
        &self.second
    }

    /// All the original input points at either end.
    pub fn points(&self) -> Vec<Point> {
        let mut ret = self.first.points();
        ret.extend(self.second.points());
        ret
    }

    /// Flattens this matching into pairs of input points.
    ///
    /// The two ends touch through one pair of points, which gets matched. If
    /// either end is a blossom, the rest of its cycle gets matched up around
    /// the point that was used.
    pub fn point_pairs(&self) -> Vec<(Point, Point)> {
        let mut ret = Vec::new();
        match_across(&self.first, &self.second, &mut ret);
        ret
    }

    /// Paints both ends, and a line between the disks that touch.
    pub fn draw(&self, surface: &mut impl Surface) {
        self.first.draw(surface, Layer::Matched, 0);
        self.second.draw(surface, Layer::Matched, 0);
        let (p, q) = touching_disks(&self.first, &self.second);
        surface.edge(p.pos, q.pos, EdgeKind::Matched);
    }
}

impl PartialEq for Matching {
    fn eq(&self, other: &Self) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

impl Piece for Matching {
    fn center(&self) -> Point {
        self.first.center()
    }

    fn all_disks(&self) -> Vec<Node> {
        let mut ret = self.first.all_disks();
        ret.extend(self.second.all_disks());
        ret
    }

    fn disks_with_rate(&self) -> Vec<RatedDisk> {
        self.all_disks()
            .into_iter()
            .map(|disk| RatedDisk { disk, rate: 0.0 })
            .collect()
    }

    fn after_growing(&self, _dt: f64) -> Self {
        self.clone()
    }
}

impl std::fmt::Display for Matching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <=> {}", self.first, self.second)
    }
}

// The pair of disks, one from each side, with the smallest gap between them.
fn touching_disks(a: &Matchable, b: &Matchable) -> (Node, Node) {
    let mut best: Option<(f64, Node, Node)> = None;
    for p in a.all_disks() {
        for q in b.all_disks() {
            let gap = p.pos.distance(q.pos) - p.weight - q.weight;
            let better = match best {
                Some((best_gap, _, _)) => gap < best_gap,
                None => true,
            };
            if better {
                best = Some((gap, p, q));
            }
        }
    }
    match best {
        Some((_, p, q)) => (p, q),
        None => unreachable!("every piece has at least one disk"),
    }
}

fn match_across(a: &Matchable, b: &Matchable, out: &mut Vec<(Point, Point)>) {
    let (p, q) = touching_disks(a, b);
    out.push((p.pos, q.pos));
    match_around(a, p.pos, out);
    match_around(b, q.pos, out);
}

// Matches up everything in `piece` except for the point `exposed`, which has
// already been matched to something outside.
fn match_around(piece: &Matchable, exposed: Point, out: &mut Vec<(Point, Point)>) {
    let Matchable::Blossom(blossom) = piece else {
        return;
    };
    let cycle = blossom.cycle();
    let Some(k) = cycle.iter().position(|m| m.points().contains(&exposed)) else {
        panic!("exposed point {exposed:?} is not inside {blossom}");
    };
    match_around(&cycle[k], exposed, out);

    let n = cycle.len();
    for offset in (1..n).step_by(2) {
        match_across(&cycle[(k + offset) % n], &cycle[(k + offset + 1) % n], out);
    }
}
