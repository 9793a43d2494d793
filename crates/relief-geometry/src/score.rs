//! Step 4: filtering traced polygons by the mean probability they enclose
//! on the pre-binarized map.

use crate::types::{Point, Polygon, ReliefMap};

/// Point-in-polygon test via the standard even-odd ray casting rule.
fn point_in_polygon(poly: &Polygon, p: Point) -> bool {
    let n = poly.points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = poly.points[i];
        let b = poly.points[j];
        let crosses = (a.y > p.y) != (b.y > p.y);
        if crosses {
            let x_at_y = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_at_y {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Mean value of `map` over the pixels enclosed by `poly` (inclusive of the
/// polygon's own bounding box, clamped to the map's extents).
pub fn mean_enclosed_value(map: &ReliefMap, poly: &Polygon) -> f32 {
    let Some((min, max)) = poly.bounds() else {
        return 0.0;
    };
    let x0 = (min.x.floor().max(0.0)) as usize;
    let y0 = (min.y.floor().max(0.0)) as usize;
    let x1 = (max.x.ceil() as usize).min(map.width.saturating_sub(1));
    let y1 = (max.y.ceil() as usize).min(map.height.saturating_sub(1));

    if poly.points.len() < 3 {
        // Degenerate (single point / line): sample directly.
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for y in y0..=y1 {
            for x in x0..=x1 {
                sum += map.get(x, y) as f64;
                count += 1;
            }
        }
        return if count == 0 { 0.0 } else { (sum / count as f64) as f32 };
    }

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if point_in_polygon(poly, p) {
                sum += map.get(x, y) as f64;
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

/// Keeps only polygons whose mean enclosed value is at least `min_mean`.
pub fn filter_by_score(map: &ReliefMap, polygons: Vec<Polygon>, min_mean: f32) -> Vec<Polygon> {
    polygons
        .into_iter()
        .filter(|p| mean_enclosed_value(map, p) >= min_mean)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_low_mean_region() {
        let map = ReliefMap::new(4, 4, vec![0.1; 16]);
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(0.0, 3.0),
        ]);
        let kept = filter_by_score(&map, vec![square], 0.6);
        assert!(kept.is_empty());
    }

    #[test]
    fn keeps_high_mean_region() {
        let map = ReliefMap::new(4, 4, vec![0.9; 16]);
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(0.0, 3.0),
        ]);
        let kept = filter_by_score(&map, vec![square], 0.6);
        assert_eq!(kept.len(), 1);
    }
}
