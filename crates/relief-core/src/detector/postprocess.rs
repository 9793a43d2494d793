//! Detector postprocessing (§4.2): wrap each image's probability slice as a
//! `ReliefMap` and hand it to the geometry pipeline.

use ndarray::ArrayD;
use relief_geometry::{extract_boxes, ReliefMap, TextBoundary};

use crate::detector::preprocess::ResizeInfo;
use crate::error::OcrError;

/// Runs the geometry pipeline (§4.1) for every image in a `[N,H,W]`
/// probability batch, rescaling each image's boundaries back into its own
/// original coordinate space.
pub fn postprocess(output: &ArrayD<f32>, infos: &[ResizeInfo]) -> Result<Vec<Vec<TextBoundary>>, OcrError> {
    let shape = output.shape();
    if shape.len() != 3 {
        return Err(OcrError::InvalidInput(format!(
            "expected detector output rank 3 [N,H,W], got {:?}",
            shape
        )));
    }
    let (n, h, w) = (shape[0], shape[1], shape[2]);
    if n != infos.len() {
        return Err(OcrError::InvalidInput(format!(
            "detector output batch size {n} does not match {} resize infos",
            infos.len()
        )));
    }

    let mut per_image = Vec::with_capacity(n);
    for (i, info) in infos.iter().enumerate() {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(output[[i, y, x]]);
            }
        }
        let map = ReliefMap::new(w, h, data);
        let boundaries = extract_boxes(map, info.source_size, info.inverse_resize_factor());
        per_image.push(boundaries);
    }

    Ok(per_image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn blank_probability_map_yields_no_boundaries() {
        let output = Array3::<f32>::zeros((1, 64, 64)).into_dyn();
        let infos = vec![ResizeInfo { source_size: (64, 64), resize_factor: 1.0 }];
        let result = postprocess(&output, &infos).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_empty());
    }

    #[test]
    fn batch_size_mismatch_is_invalid_input() {
        let output = Array3::<f32>::zeros((2, 8, 8)).into_dyn();
        let infos = vec![ResizeInfo { source_size: (8, 8), resize_factor: 1.0 }];
        assert!(postprocess(&output, &infos).is_err());
    }
}
