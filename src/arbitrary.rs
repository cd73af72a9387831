//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;
use kurbo::Point;

use crate::State;

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate an arbitrary point in the square `[0, size] x [0, size]`.
pub fn point(size: f64, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(
        float_in_range(0.0, size, u)?,
        float_in_range(0.0, size, u)?,
    ))
}

/// Generate a point, but give it a chance to land on (or very close to) `orig`.
fn another_point(orig: Point, size: f64, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    match u.int_in_range(0..=3u8)? {
        0 => Ok(orig),
        1 => {
            let ulps: i32 = u.int_in_range(-32..=32)?;
            let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
            Ok(Point::new(orig.x * scale, orig.y))
        }
        _ => point(size, u),
    }
}

/// Generate an even number of points (at most `2 * max_pairs`) in the square
/// `[0, size] x [0, size]`.
///
/// Some of the points may coincide, or almost coincide.
pub fn point_set(
    size: f64,
    max_pairs: usize,
    u: &mut Unstructured<'_>,
) -> Result<Vec<Point>, arbitrary::Error> {
    let pairs = u.int_in_range(0..=max_pairs)?;
    let mut ret: Vec<Point> = Vec::with_capacity(2 * pairs);
    for _ in 0..(2 * pairs) {
        let p = if ret.is_empty() {
            point(size, u)?
        } else {
            let idx = u.choose_index(ret.len())?;
            another_point(ret[idx], size, u)?
        };
        ret.push(p);
    }
    Ok(ret)
}

fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
    points
}

/// Runs the simulation on an arbitrary point set, checking the invariants
/// after every step.
///
/// Panics if anything goes wrong, including if the simulation doesn't finish
/// in a reasonable number of steps.
pub fn matching_run(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let points = point_set(32.0, 6, u)?;
    let expected = sorted(points.clone());
    let limit = crate::default_step_limit(&points);

    let mut state = State::from_points(points.iter().copied());
    let mut steps = 0;
    while !state.is_finished() {
        assert!(steps < limit, "stalled after {steps} steps:\n{state}");
        state = state.advance();
        state.check_invariants();
        assert_eq!(sorted(state.points()), expected);
        steps += 1;
    }

    let pairs = state.matched_pairs();
    let matched = pairs.iter().flat_map(|&(p, q)| [p, q]).collect();
    assert_eq!(sorted(matched), expected);
    Ok(())
}
