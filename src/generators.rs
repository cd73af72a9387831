//! Utilities for generating examples, benchmarks, and test cases.
//!
//! Everything here is deterministic: random point sets take a seed.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::Point;

/// Generate `2 * pairs` points, scattered uniformly over a `size` by `size`
/// square at the origin.
pub fn scattered(pairs: usize, size: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..(2 * pairs))
        .map(|_| {
            let x = rng.random_range(0.0..=size);
            let y = rng.random_range(0.0..=size);
            Point::new(x, y)
        })
        .collect()
}

/// Generate `2 * pairs` points in tight clusters of (about) `cluster_size`
/// points each. The clusters are scattered over a `size` by `size` square.
///
/// Clusters make long alternating trees and lots of blossoms.
pub fn clustered(pairs: usize, cluster_size: usize, size: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = size / 50.0;
    let cluster_size = cluster_size.max(1);
    let mut center = Point::ZERO;
    (0..(2 * pairs))
        .map(|i| {
            if i % cluster_size == 0 {
                center = Point::new(rng.random_range(0.0..=size), rng.random_range(0.0..=size));
            }
            let dx = rng.random_range(-spread..=spread);
            let dy = rng.random_range(-spread..=spread);
            center + (dx, dy)
        })
        .collect()
}

/// Generate a `cols` by `rows` grid of points, `spacing` apart.
///
/// If there's an odd number of grid points, the last one is dropped.
pub fn grid(cols: usize, rows: usize, spacing: f64) -> Vec<Point> {
    let mut ret: Vec<_> = (0..rows)
        .flat_map(|j| (0..cols).map(move |i| Point::new(i as f64 * spacing, j as f64 * spacing)))
        .collect();
    if ret.len() % 2 != 0 {
        ret.pop();
    }
    ret
}

/// Generate `2 * pairs` points, evenly spaced around a circle.
///
/// Every point is equally close to both of its neighbors, so this is full of
/// ties.
pub fn ring(pairs: usize, radius: f64) -> Vec<Point> {
    let n = 2 * pairs;
    (0..n)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / n as f64;
            Point::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded() {
        assert_eq!(scattered(5, 10.0, 3), scattered(5, 10.0, 3));
        assert_ne!(scattered(5, 10.0, 3), scattered(5, 10.0, 4));
        assert_eq!(clustered(7, 3, 10.0, 0).len(), 14);
    }

    #[test]
    fn even_grid() {
        assert_eq!(grid(3, 3, 1.0).len(), 8);
        assert_eq!(grid(2, 3, 1.0).len(), 6);
        assert_eq!(ring(4, 1.0).len(), 8);
    }
}
