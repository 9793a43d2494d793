//! Step 8-9: minimum-area bounding rectangle via rotating calipers, then
//! reading-order canonicalization of its four corners.

use crate::types::{ConvexHull, Point, RotatedRect};

/// Computes the minimum-area rectangle enclosing a convex hull by sweeping
/// over each hull edge's direction (rotating calipers) and keeping the
/// smallest axis-aligned-in-that-frame rectangle.
pub fn min_area_rect(hull: &ConvexHull) -> Option<RotatedRect> {
    let n = hull.len();
    if n < 3 {
        return None;
    }
    let pts = &hull.points;

    let mut best_area = f64::INFINITY;
    let mut best_corners: Option<[Point; 4]> = None;

    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        let edge = b.sub(&a);
        let len = (edge.x * edge.x + edge.y * edge.y).sqrt();
        if len < 1e-12 {
            continue;
        }
        let (ux, uy) = (edge.x / len, edge.y / len);
        let (vx, vy) = (-uy, ux);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in pts {
            let d = p.sub(&a);
            let u = d.x * ux + d.y * uy;
            let v = d.x * vx + d.y * vy;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        let area = (max_u - min_u) * (max_v - min_v);
        if area < best_area {
            best_area = area;
            let corner = |u: f64, v: f64| Point::new(a.x + u * ux + v * vx, a.y + u * uy + v * vy);
            best_corners = Some([
                corner(min_u, min_v),
                corner(max_u, min_v),
                corner(max_u, max_v),
                corner(min_u, max_v),
            ]);
        }
    }

    best_corners.map(canonicalize_reading_order)
}

/// Chooses the longer pair of parallel sides as the text direction, orients
/// it to have non-negative X, and labels the corner where that direction
/// starts (with its perpendicular partner in +Y) as top-left.
fn canonicalize_reading_order(corners: [Point; 4]) -> RotatedRect {
    let [c0, c1, c2, c3] = corners;
    let pair_a_len = c0.dist(&c1); // edges (c0,c1) and (c3,c2)
    let pair_b_len = c1.dist(&c2); // edges (c1,c2) and (c0,c3)

    let candidates: [(Point, Point, Point); 4] = if pair_a_len >= pair_b_len {
        [(c0, c1, c3), (c1, c0, c2), (c3, c2, c0), (c2, c3, c1)]
    } else {
        [(c1, c2, c0), (c2, c1, c3), (c0, c3, c1), (c3, c0, c2)]
    };

    const EPS: f64 = 1e-9;
    for &(start, end, partner) in &candidates {
        let dir = end.sub(&start);
        let perp = partner.sub(&start);
        if dir.x >= -EPS && perp.y >= -EPS {
            let tl = start;
            let tr = end;
            let bl = partner;
            let br = Point::new(tr.x + bl.x - tl.x, tr.y + bl.y - tl.y);
            return RotatedRect::from_corners(tl, tr, br, bl);
        }
    }

    // Degenerate orientation (shouldn't happen for a true rectangle); fall
    // back to the hull's own corner order.
    RotatedRect::from_corners(c0, c1, c2, c3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_rectangle_round_trips() {
        let hull = ConvexHull::new(vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let rect = min_area_rect(&hull).expect("rect should exist");
        assert!((rect.width() - 20.0).abs() < 1e-6);
        assert!((rect.height() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn text_direction_is_non_negative_x() {
        let hull = ConvexHull::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 20.0),
            Point::new(10.0, 20.0),
            Point::new(10.0, 0.0),
        ]);
        let rect = min_area_rect(&hull).unwrap();
        assert!(rect.tr.x - rect.tl.x >= -1e-6);
    }

    #[test]
    fn opposite_edges_are_parallel_and_adjacent_are_orthogonal() {
        let hull = ConvexHull::new(vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let rect = min_area_rect(&hull).unwrap();
        let top = rect.tr.sub(&rect.tl);
        let bottom = rect.br.sub(&rect.bl);
        let cross = top.cross(&bottom);
        assert!(cross.abs() < 1e-6 * rect.width() * rect.height());
        let side = rect.bl.sub(&rect.tl);
        assert!(top.dot(&side).abs() < 1e-6 * rect.width() * rect.height());
    }
}
