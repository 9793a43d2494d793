//! The shapes exposed across the §6 OCR result sink boundary.

use serde::{Deserialize, Serialize};

use relief_geometry::RotatedRect;

/// One recognized word: where it is, what it says, how sure the recognizer
/// is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Four corners in reading order (TL, TR, BR, BL), in the coordinate
    /// space of the original, pre-resize image.
    pub rect: [(f64, f64); 4],

    /// CTC-decoded text.
    pub text: String,

    /// Geometric mean of the per-character run-maxima, in `[0, 1]`.
    pub confidence: f32,
}

impl OcrResult {
    pub fn new(rect: &RotatedRect, text: String, confidence: f32) -> Self {
        let [tl, tr, br, bl] = rect.corners();
        Self {
            rect: [(tl.x, tl.y), (tr.x, tr.y), (br.x, br.y), (bl.x, bl.y)],
            text,
            confidence,
        }
    }
}

/// Everything produced for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub results: Vec<OcrResult>,
    pub image_size: (u32, u32),
}

impl PageResult {
    pub fn empty(image_size: (u32, u32)) -> Self {
        Self { results: Vec::new(), image_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_geometry::Point;

    #[test]
    fn ocr_result_carries_corners_in_reading_order() {
        let rect = RotatedRect::from_corners(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 5.0),
        );
        let result = OcrResult::new(&rect, "hi".to_string(), 0.9);
        assert_eq!(result.rect[0], (0.0, 0.0));
        assert_eq!(result.rect[1], (10.0, 0.0));
        assert_eq!(result.text, "hi");
    }

    #[test]
    fn page_result_serializes_as_json() {
        let page = PageResult::empty((100, 50));
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"image_size\":[100,50]"));
    }
}
