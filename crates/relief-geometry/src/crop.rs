//! Perspective-correct cropping of a rotated rectangle out of a source
//! image, with an axis-aligned fast path.

use image::{Rgb, RgbImage};

use crate::types::{Point, RotatedRect};

const AXIS_ALIGN_EPSILON: f64 = 1e-3;

fn is_axis_aligned(rect: &RotatedRect) -> bool {
    (rect.tl.y - rect.tr.y).abs() < AXIS_ALIGN_EPSILON
        && (rect.bl.y - rect.br.y).abs() < AXIS_ALIGN_EPSILON
        && (rect.tl.x - rect.bl.x).abs() < AXIS_ALIGN_EPSILON
        && (rect.tr.x - rect.br.x).abs() < AXIS_ALIGN_EPSILON
}

fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let at = |px: i64, py: i64| -> [f64; 3] {
        if px < 0 || py < 0 || px >= w || py >= h {
            [0.0, 0.0, 0.0]
        } else {
            let p = image.get_pixel(px as u32, py as u32);
            [p[0] as f64, p[1] as f64, p[2] as f64]
        }
    };

    let p00 = at(x0, y0);
    let p10 = at(x1, y0);
    let p01 = at(x0, y1);
    let p11 = at(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        let v = top * (1.0 - fy) + bottom * fy;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Crops the source image along `rect`. Output size is
/// `(round(width), round(height))`, each clamped to at least 1.
pub fn crop(image: &RgbImage, rect: &RotatedRect) -> RgbImage {
    let out_w = (rect.width().round() as u32).max(1);
    let out_h = (rect.height().round() as u32).max(1);

    if is_axis_aligned(rect) {
        let x0 = rect.tl.x.round().max(0.0) as u32;
        let y0 = rect.tl.y.round().max(0.0) as u32;
        let mut out = RgbImage::new(out_w, out_h);
        for y in 0..out_h {
            for x in 0..out_w {
                let sx = x0 + x;
                let sy = y0 + y;
                let pixel = if sx < image.width() && sy < image.height() {
                    *image.get_pixel(sx, sy)
                } else {
                    Rgb([0, 0, 0])
                };
                out.put_pixel(x, y, pixel);
            }
        }
        return out;
    }

    let tr_minus_tl = rect.tr.sub(&rect.tl);
    let bl_minus_tl = rect.bl.sub(&rect.tl);
    let mut out = RgbImage::new(out_w, out_h);
    for j in 0..out_h {
        for i in 0..out_w {
            let u = if out_w > 1 { i as f64 / (out_w - 1) as f64 } else { 0.0 };
            let v = if out_h > 1 { j as f64 / (out_h - 1) as f64 } else { 0.0 };
            let sample: Point = Point::new(
                rect.tl.x + u * tr_minus_tl.x + v * bl_minus_tl.x,
                rect.tl.y + u * tr_minus_tl.y + v * bl_minus_tl.y,
            );
            out.put_pixel(i, j, sample_bilinear(image, sample.x, sample.y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_crop_has_expected_dimensions() {
        let image = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        let rect = RotatedRect::from_corners(
            Point::new(10.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(40.0, 30.0),
            Point::new(10.0, 30.0),
        );
        let cropped = crop(&image, &rect);
        assert_eq!(cropped.width(), 30);
        assert_eq!(cropped.height(), 20);
    }

    #[test]
    fn rotated_crop_dimension_formula() {
        let image = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        let rect = RotatedRect::from_corners(
            Point::new(10.0, 10.0),
            Point::new(30.0, 20.0),
            Point::new(20.0, 40.0),
            Point::new(0.0, 30.0),
        );
        let cropped = crop(&image, &rect);
        let expected_w = rect.width().round() as u32;
        let expected_h = rect.height().round() as u32;
        assert_eq!(cropped.width(), expected_w.max(1));
        assert_eq!(cropped.height(), expected_h.max(1));
    }
}
