//! Recognizer preprocessing (§4.3): perspective-crop each detected word,
//! resize to a fixed height with clamped aspect-preserving width, batch
//! left-aligned on a black canvas sized to the widest crop.

use image::RgbImage;
use ndarray::Array4;
use relief_geometry::RotatedRect;

use crate::error::OcrError;
use crate::models::config::RecognizerConfig;

pub struct RecognizerPreprocessor {
    target_height: u32,
    min_width: u32,
    max_width: u32,
}

impl RecognizerPreprocessor {
    pub fn new(config: &RecognizerConfig) -> Self {
        Self {
            target_height: config.target_height,
            min_width: config.min_width,
            max_width: config.max_width,
        }
    }

    /// Crops every rectangle out of `source`, resizes each crop to
    /// `target_height` preserving aspect ratio (width clamped to
    /// `[min_width, max_width]`), and batches them left-aligned on a shared
    /// canvas sized to the widest crop. Returns `None` when `rects` is
    /// empty — there is nothing to recognize.
    pub fn preprocess(&self, source: &RgbImage, rects: &[RotatedRect]) -> Result<Option<Array4<f32>>, OcrError> {
        if rects.is_empty() {
            return Ok(None);
        }

        let mut resized_crops = Vec::with_capacity(rects.len());
        let mut max_width = self.min_width;

        for rect in rects {
            let crop = relief_geometry::crop_image(source, rect);
            let (w, h) = (crop.width().max(1), crop.height().max(1));
            let aspect = w as f32 / h as f32;
            let target_w = ((self.target_height as f32 * aspect).round() as u32)
                .clamp(self.min_width, self.max_width);

            let resized = image::imageops::resize(&crop, target_w, self.target_height, image::imageops::FilterType::CatmullRom);
            max_width = max_width.max(target_w);
            resized_crops.push(resized);
        }

        let mut tensor = Array4::<f32>::from_elem(
            (resized_crops.len(), 3, self.target_height as usize, max_width as usize),
            -1.0,
        );

        for (m, crop) in resized_crops.iter().enumerate() {
            for y in 0..self.target_height {
                for x in 0..crop.width() {
                    let px = crop.get_pixel(x, y);
                    for c in 0..3 {
                        tensor[[m, c, y as usize, x as usize]] = px[c] as f32 / 127.5 - 1.0;
                    }
                }
            }
        }

        Ok(Some(tensor))
    }
}
