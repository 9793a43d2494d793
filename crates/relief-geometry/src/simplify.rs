//! Step 5: Douglas-Peucker polyline simplification.

use crate::types::{Point, Polygon};

fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(&a);
    let len = ab.dist(&Point::new(0.0, 0.0));
    if len == 0.0 {
        return p.dist(&a);
    }
    let ap = p.sub(&a);
    (ab.cross(&ap)).abs() / len
}

fn dp_recursive(points: &[Point], epsilon: f64, keep: &mut Vec<bool>, start: usize, end: usize) {
    if end <= start + 1 {
        return;
    }
    let a = points[start];
    let b = points[end];
    let mut max_dist = 0.0;
    let mut max_idx = start;
    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], a, b);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist > epsilon {
        keep[max_idx] = true;
        dp_recursive(points, epsilon, keep, start, max_idx);
        dp_recursive(points, epsilon, keep, max_idx, end);
    }
}

/// Simplifies a closed polygon's boundary, treating it as an open chain
/// anchored at its first and last point (appropriate for a traced boundary
/// that already starts and ends near the same pixel).
pub fn simplify(polygon: &Polygon, epsilon: f64) -> Polygon {
    let points = &polygon.points;
    if points.len() < 3 {
        return polygon.clone();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    dp_recursive(points, epsilon, &mut keep, 0, points.len() - 1);

    let simplified: Vec<Point> = points
        .iter()
        .zip(keep.iter())
        .filter(|(_, &k)| k)
        .map(|(&p, _)| p)
        .collect();
    Polygon::new(simplified)
}
