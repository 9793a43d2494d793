//! Orchestrates the ten-step geometry pipeline: a raw probability map goes
//! in, a list of oriented text boundaries comes out. Every candidate drop
//! along the way is silent and non-fatal, per the detector's failure
//! semantics.

use crate::binarize::binarize;
use crate::boundary::extract_boundaries;
use crate::crop;
use crate::hull::convex_hull;
use crate::min_rect::min_area_rect;
use crate::morphology::morphological_open;
use crate::offset::dilate;
use crate::score::filter_by_score;
use crate::simplify::simplify;
use crate::types::{Point, ReliefMap, RotatedRect, TextBoundary};

const BINARIZE_THRESHOLD: f32 = 0.2;
const MIN_CONTOUR_SCORE: f32 = 0.6;
const SIMPLIFY_EPSILON: f64 = 1.0;

/// Converts a single probability map into oriented text boundaries,
/// rescaled back into the coordinates of the image the model originally
/// saw. `map` is consumed: the binarization and tracing steps mutate it
/// destructively in spirit (a fresh working copy is threaded through
/// internally, but callers should not expect to reuse `map` afterwards).
pub fn extract_boxes(map: ReliefMap, source_size: (u32, u32), inverse_resize_factor: f64) -> Vec<TextBoundary> {
    let pre_binarize = map.clone();
    let grid = binarize(&map, BINARIZE_THRESHOLD);
    let opened = morphological_open(&grid);
    let raw_polygons = extract_boundaries(&opened);
    let scored = filter_by_score(&pre_binarize, raw_polygons, MIN_CONTOUR_SCORE);

    let (src_w, src_h) = (source_size.0 as f64, source_size.1 as f64);
    let clamp_point = |p: Point| Point::new(p.x.clamp(0.0, src_w), p.y.clamp(0.0, src_h));
    let mut boundaries = Vec::new();

    for raw in scored {
        let simplified = simplify(&raw, SIMPLIFY_EPSILON);
        let Some(dilated) = dilate(&simplified) else {
            tracing::trace!("dropped candidate: dilation failed or too small");
            continue;
        };
        let Some(hull) = convex_hull(&dilated) else {
            tracing::trace!("dropped candidate: degenerate convex hull");
            continue;
        };
        let Some(rect) = min_area_rect(&hull) else {
            tracing::trace!("dropped candidate: degenerate minimum-area rectangle");
            continue;
        };

        let rescaled = rescale(rect, inverse_resize_factor);
        let rescaled = RotatedRect::from_corners(
            clamp_point(rescaled.tl),
            clamp_point(rescaled.tr),
            clamp_point(rescaled.br),
            clamp_point(rescaled.bl),
        );
        let raw_aabb = dilated
            .bounds()
            .unwrap_or((Point::new(0.0, 0.0), Point::new(0.0, 0.0)));
        let aabb = (
            clamp_point(Point::new(
                raw_aabb.0.x * inverse_resize_factor,
                raw_aabb.0.y * inverse_resize_factor,
            )),
            clamp_point(Point::new(
                raw_aabb.1.x * inverse_resize_factor,
                raw_aabb.1.y * inverse_resize_factor,
            )),
        );

        boundaries.push(TextBoundary {
            raw_polygon: raw,
            dilated_polygon: dilated,
            rect: rescaled,
            aabb,
        });
    }

    boundaries
}

fn rescale(rect: RotatedRect, inverse_resize_factor: f64) -> RotatedRect {
    rect.scale(inverse_resize_factor)
}

/// Re-exported for callers that already have an extracted rectangle and an
/// image and want the cropped word region.
pub fn crop_rect(image: &image::RgbImage, rect: &RotatedRect) -> image::RgbImage {
    crop::crop(image, rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_map_yields_no_boxes() {
        let map = ReliefMap::zeros(64, 64);
        let boxes = extract_boxes(map, (64, 64), 1.0);
        assert!(boxes.is_empty());
    }

    #[test]
    fn solid_high_confidence_block_yields_one_box() {
        let mut map = ReliefMap::zeros(40, 40);
        for y in 10..30 {
            for x in 10..30 {
                map.set(x, y, 0.95);
            }
        }
        let boxes = extract_boxes(map, (40, 40), 1.0);
        assert_eq!(boxes.len(), 1);
        let rect = &boxes[0].rect;
        assert!(rect.width() > 5.0);
        assert!(rect.height() > 5.0);
    }
}
