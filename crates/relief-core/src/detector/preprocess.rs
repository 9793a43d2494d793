//! Detector preprocessing (§4.2): aspect-preserving resize onto a fixed
//! black canvas, ImageNet normalization, NCHW layout.

use image::{imageops::FilterType, RgbImage};
use ndarray::Array4;

use crate::error::OcrError;
use crate::models::config::DetectorConfig;

const MEAN: [f32; 3] = [123.675, 116.28, 103.53];
const STD: [f32; 3] = [58.395, 57.12, 57.375];

/// Per-image bookkeeping needed to rescale detector output geometry back
/// into the original image's coordinate space.
#[derive(Debug, Clone, Copy)]
pub struct ResizeInfo {
    /// Original (pre-resize) image size the detector saw.
    pub source_size: (u32, u32),
    /// `new / original`, the scale factor the resize applied.
    pub resize_factor: f64,
}

impl ResizeInfo {
    pub fn inverse_resize_factor(&self) -> f64 {
        1.0 / self.resize_factor
    }
}

pub struct DetectorPreprocessor {
    target_size: u32,
}

impl DetectorPreprocessor {
    pub fn new(config: &DetectorConfig) -> Self {
        Self { target_size: config.input_size }
    }

    /// Preprocesses a batch of images into a single `[N,3,S,S]` NCHW
    /// tensor, returning each image's [`ResizeInfo`] alongside.
    pub fn preprocess(&self, images: &[RgbImage]) -> Result<(Array4<f32>, Vec<ResizeInfo>), OcrError> {
        if images.is_empty() {
            return Err(OcrError::InvalidInput("empty image batch".to_string()));
        }

        let size = self.target_size as usize;
        // Pad with normalized black, not raw zero, so the unfilled canvas
        // margin carries the same value a true black pixel would.
        let mut tensor = Array4::<f32>::zeros((images.len(), 3, size, size));
        for c in 0..3 {
            tensor.slice_mut(ndarray::s![.., c, .., ..]).fill((0.0 - MEAN[c]) / STD[c]);
        }
        let mut infos = Vec::with_capacity(images.len());

        for (n, image) in images.iter().enumerate() {
            let (w, h) = (image.width(), image.height());
            if w == 0 || h == 0 {
                return Err(OcrError::InvalidInput("zero-dimension image".to_string()));
            }

            let scale = (self.target_size as f32 / w.max(h) as f32).min(1.0);
            let new_w = ((w as f32 * scale).round() as u32).max(1);
            let new_h = ((h as f32 * scale).round() as u32).max(1);

            let resized = image::imageops::resize(image, new_w, new_h, FilterType::CatmullRom);

            for y in 0..new_h {
                for x in 0..new_w {
                    let px = resized.get_pixel(x, y);
                    for c in 0..3 {
                        let value = px[c] as f32;
                        tensor[[n, c, y as usize, x as usize]] = (value - MEAN[c]) / STD[c];
                    }
                }
            }

            infos.push(ResizeInfo {
                source_size: (w, h),
                resize_factor: new_w as f64 / w as f64,
            });
        }

        Ok((tensor, infos))
    }
}
