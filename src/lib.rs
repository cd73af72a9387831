#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod blossom;
pub mod draw;
pub mod edit;
pub mod event;
pub mod matching;
pub mod piece;
pub mod state;
pub mod tree;

#[cfg(feature = "generators")]
pub mod generators;

pub use blossom::Blossom;
pub use edit::{Edit, Member, Transform};
pub use event::{cycle_split, Event};
pub use kurbo::Point;
pub use matching::Matching;
pub use piece::{Matchable, Node, Piece};
pub use state::{State, EVENT_EPSILON, WAIT_HORIZON};
pub use tree::{AltTree, Zipper};

#[derive(Clone, Copy, Debug, PartialEq)]
/// The input points were faulty, or the simulation didn't finish.
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
    /// There was an odd number of inputs, so they can't all be matched.
    OddPointCount(usize),
    /// We ran out of steps before everything was matched.
    Stalled {
        /// The number of steps that we took.
        steps: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Infinity => write!(f, "one of the inputs was infinite"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::OddPointCount(n) => {
                write!(f, "can't perfectly match an odd number of points ({n})")
            }
            Error::Stalled { steps } => {
                write!(f, "gave up after {steps} steps with points still unmatched")
            }
        }
    }
}

impl std::error::Error for Error {}

fn check_points(points: &[Point]) -> Result<(), Error> {
    if points.iter().any(|p| p.x.is_nan() || p.y.is_nan()) {
        return Err(Error::NaN);
    }
    if points.iter().any(|p| p.x.is_infinite() || p.y.is_infinite()) {
        return Err(Error::Infinity);
    }
    if points.len() % 2 != 0 {
        return Err(Error::OddPointCount(points.len()));
    }
    Ok(())
}

/// A generous bound on the number of steps needed to match `points`.
///
/// Every step is either an event or a wait, and waits last for at most
/// [`WAIT_HORIZON`], so we allow enough waits to grow across the whole input.
pub fn default_step_limit(points: &[Point]) -> usize {
    let n = points.len();
    let bbox = points
        .iter()
        .fold(None, |bbox: Option<kurbo::Rect>, p| match bbox {
            Some(r) => Some(r.union_pt(*p)),
            None => Some(kurbo::Rect::from_points(*p, *p)),
        })
        .unwrap_or_default();
    let diameter = (bbox.width().powi(2) + bbox.height().powi(2)).sqrt();
    let waits = (diameter / WAIT_HORIZON).ceil();
    let waits = if waits.is_finite() {
        waits as usize
    } else {
        usize::MAX / 2
    };
    64usize
        .saturating_mul((n + 1) * (n + 1))
        .saturating_add(waits.saturating_mul(4))
        .saturating_add(1024)
}

/// Computes a minimum-weight perfect matching of some points.
///
/// The weight of a matched pair is the distance between its points. The
/// output pairs are in no particular order.
pub fn min_weight_matching(points: &[Point]) -> Result<Vec<(Point, Point)>, Error> {
    min_weight_matching_with_limit(points, default_step_limit(points))
}

/// Computes a minimum-weight perfect matching of some points, taking at most
/// `max_steps` steps of the simulation.
pub fn min_weight_matching_with_limit(
    points: &[Point],
    max_steps: usize,
) -> Result<Vec<(Point, Point)>, Error> {
    check_points(points)?;

    let mut state = State::from_points(points.iter().copied());
    let mut steps = 0;
    while !state.is_finished() {
        if steps >= max_steps {
            return Err(Error::Stalled { steps });
        }
        state = state.advance();
        steps += 1;
    }
    log::debug!("matched {} points in {steps} steps", points.len());
    Ok(state.matched_pairs())
}
