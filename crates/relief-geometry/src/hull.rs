//! Step 7: convex hull via Graham scan.

use crate::types::{ConvexHull, Point, Polygon};

/// Builds the convex hull of a polygon's vertex set. Returns `None` for
/// degenerate inputs: fewer than 3 points, all collinear, or all
/// coincident.
pub fn convex_hull(polygon: &Polygon) -> Option<ConvexHull> {
    let mut points = polygon.points.clone();
    points.dedup_by(|a, b| (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    if points.len() < 3 {
        return None;
    }

    // Pivot: minimum Y, ties broken by minimum X.
    let pivot_idx = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.y.partial_cmp(&b.y).unwrap().then(a.x.partial_cmp(&b.x).unwrap()))
        .map(|(i, _)| i)
        .unwrap();
    let pivot = points[pivot_idx];

    let mut rest: Vec<Point> = points
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pivot_idx)
        .map(|(_, &p)| p)
        .collect();

    // Sort by polar angle around pivot; on ties, keep the farther point
    // (accomplished here by sorting ties by descending distance so the
    // scan below naturally discards the nearer duplicate).
    rest.sort_by(|a, b| {
        let da = a.sub(&pivot);
        let db = b.sub(&pivot);
        let angle_a = da.y.atan2(da.x);
        let angle_b = db.y.atan2(db.x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap()
            .then_with(|| pivot.dist(b).partial_cmp(&pivot.dist(a)).unwrap())
    });

    if rest.is_empty() {
        return None;
    }

    let mut stack: Vec<Point> = vec![pivot];
    for p in rest {
        loop {
            if stack.len() < 2 {
                break;
            }
            let top = stack[stack.len() - 1];
            let second = stack[stack.len() - 2];
            let turn = top.sub(&second).cross(&p.sub(&top));
            // Strict left turns only; pop points that create a right turn
            // or a straight line.
            if turn <= 0.0 {
                stack.pop();
            } else {
                break;
            }
        }
        stack.push(p);
    }

    if stack.len() < 3 {
        return None;
    }

    // All-collinear guard: every cross product in the final chain is zero.
    let all_collinear = (0..stack.len()).all(|i| {
        let a = stack[i];
        let b = stack[(i + 1) % stack.len()];
        let c = stack[(i + 2) % stack.len()];
        b.sub(&a).cross(&c.sub(&a)).abs() < 1e-9
    });
    if all_collinear {
        return None;
    }

    Some(ConvexHull::new(stack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_plus_interior_point_hull_is_the_square() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(5.0, 5.0), // interior point, must not appear in hull
        ]);
        let hull = convex_hull(&poly).expect("hull should exist");
        assert_eq!(hull.len(), 4);
        for p in &hull.points {
            assert_ne!(*p, Point::new(5.0, 5.0));
        }
    }

    #[test]
    fn all_points_contained_in_or_on_hull() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(8.0, 0.0),
            Point::new(6.0, 6.0),
            Point::new(2.0, 6.0),
        ]);
        let hull = convex_hull(&poly).unwrap();
        // Strict left turns: cross >= 0 with at least one > 0.
        let n = hull.len();
        let mut any_positive = false;
        for i in 0..n {
            let a = hull.points[i];
            let b = hull.points[(i + 1) % n];
            let c = hull.points[(i + 2) % n];
            let cross = b.sub(&a).cross(&c.sub(&a));
            assert!(cross >= -1e-9);
            if cross > 1e-9 {
                any_positive = true;
            }
        }
        assert!(any_positive);
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(convex_hull(&poly).is_none());
    }
}
