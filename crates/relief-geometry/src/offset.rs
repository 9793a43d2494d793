//! Step 6: polygon dilation via the Vatti/Clipper offset algorithm.
//!
//! The geometry crate's only external-math dependency: every other stage is
//! hand-rolled, but a correct, well-tested polygon offset is worth pulling
//! from `geo`/`geo-clipper` rather than reimplementing Vatti clipping.

use geo::{LineString, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

use crate::types::{Point, Polygon};

fn to_geo(polygon: &Polygon) -> GeoPolygon<f64> {
    let mut coords: Vec<(f64, f64)> = polygon.points.iter().map(|p| (p.x, p.y)).collect();
    if coords.first() != coords.last() {
        coords.push(coords[0]);
    }
    GeoPolygon::new(LineString::from(coords), vec![])
}

fn largest_ring(multi: geo::MultiPolygon<f64>) -> Option<Polygon> {
    use geo::Area;
    multi
        .into_iter()
        .max_by(|a, b| a.unsigned_area().partial_cmp(&b.unsigned_area()).unwrap())
        .map(|p| {
            let points: Vec<Point> = p
                .exterior()
                .points()
                .map(|pt| Point::new(pt.x(), pt.y()))
                .collect();
            Polygon::new(points)
        })
}

/// Offsets `polygon` outward by `area * 1.5 / perimeter`, with round joins
/// and a closed-polygon end type. Rejects degenerate inputs and drops
/// results with fewer than 3 points.
pub fn dilate(polygon: &Polygon) -> Option<Polygon> {
    let area = polygon.area();
    let perimeter = polygon.perimeter();
    if area < 9.0 || perimeter <= 0.0 {
        return None;
    }
    let delta = area * 1.5 / perimeter;

    let geo_poly = to_geo(polygon);
    let offset = geo_poly.offset(delta, JoinType::Round(0.25), EndType::ClosedPolygon, 2.0);

    let result = largest_ring(offset)?;
    if result.len() < 3 {
        return None;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_tiny_area() {
        let tiny = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        assert!(dilate(&tiny).is_none());
    }

    #[test]
    fn expands_a_reasonable_square() {
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let dilated = dilate(&square).expect("square should dilate");
        assert!(dilated.area() > square.area());
    }
}
