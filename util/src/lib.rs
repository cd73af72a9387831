use kurbo::Point;

/// The total length of some matched pairs.
pub fn matching_cost(pairs: &[(Point, Point)]) -> f64 {
    pairs.iter().map(|(p, q)| p.distance(*q)).sum()
}

/// The cost of a minimum-weight perfect matching, by exhaustive search.
///
/// This is exponential in the number of points, so don't give it more than
/// 20 or so. Panics if there's an odd number of points.
pub fn brute_force_min_cost(points: &[Point]) -> f64 {
    assert!(points.len() % 2 == 0, "odd number of points");
    assert!(points.len() <= 24, "too many points for brute force");
    let n = points.len();
    let full = (1usize << n) - 1;

    // best[mask] is the cost of matching up the points whose bits are *not*
    // set in mask.
    let mut best = vec![f64::INFINITY; 1 << n];
    best[full] = 0.0;
    for mask in (0..full).rev() {
        if mask.count_ones() % 2 != 0 {
            continue;
        }
        let i = (!mask).trailing_zeros() as usize;
        let with_i = mask | (1 << i);
        for j in (i + 1)..n {
            if with_i & (1 << j) == 0 {
                let cost = points[i].distance(points[j]) + best[with_i | (1 << j)];
                if cost < best[mask] {
                    best[mask] = cost;
                }
            }
        }
    }
    best[0]
}

fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
    points
}

/// Do these pairs use every point exactly once?
pub fn is_perfect_matching_of(pairs: &[(Point, Point)], points: &[Point]) -> bool {
    let used = pairs.iter().flat_map(|&(p, q)| [p, q]).collect();
    sorted(used) == sorted(points.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 1.0),
        ];
        assert_eq!(brute_force_min_cost(&square), 2.0);
        assert_eq!(brute_force_min_cost(&[]), 0.0);
    }
}
