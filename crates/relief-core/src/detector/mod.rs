//! Text detection: combines the §4.2 pre/post-processors with a bounded-
//! parallelism inference engine over a DBNet-family model.

pub mod postprocess;
pub mod preprocess;

use image::RgbImage;
use ndarray::ArrayD;
use relief_geometry::TextBoundary;
use relief_inference::{InferenceBackend, InferenceEngine, InputTensor, OutputTensor};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::DetectorConfig;
use preprocess::DetectorPreprocessor;

/// Wraps a detection model: preprocess → bounded inference → geometry.
pub struct TextDetector<B> {
    engine: InferenceEngine<B>,
    preprocessor: DetectorPreprocessor,
    input_name: String,
}

impl<B> TextDetector<B>
where
    B: InferenceBackend + 'static,
{
    pub fn new(engine: InferenceEngine<B>, config: &DetectorConfig, input_name: impl Into<String>) -> Self {
        Self {
            engine,
            preprocessor: DetectorPreprocessor::new(config),
            input_name: input_name.into(),
        }
    }

    /// Runs detection on a batch of images, returning one ordered boundary
    /// list per image, in the original (pre-resize) coordinate space.
    pub async fn detect(&self, images: &[RgbImage], cancel: &CancellationToken) -> Result<Vec<Vec<TextBoundary>>, OcrError> {
        let (tensor, infos) = self.preprocessor.preprocess(images)?;
        debug!(batch = images.len(), shape = ?tensor.shape(), "running detector inference");

        let outputs = self
            .engine
            .run(vec![(self.input_name.clone(), InputTensor::Float32(tensor.into_dyn()))], cancel)
            .await
            .map_err(|e| match e {
                relief_inference::InferenceError::Cancelled => OcrError::Cancelled,
                other => OcrError::InferenceFailed(other),
            })?;

        let (_, output) = outputs
            .first()
            .ok_or_else(|| OcrError::InvalidInput("detector produced no output tensors".to_string()))?;

        let probability_map = squeeze_channel(match output {
            OutputTensor::Float32(arr) => arr,
            _ => return Err(OcrError::InvalidInput("detector output was not float32".to_string())),
        })?;

        let boundaries = postprocess::postprocess(&probability_map, &infos)?;
        debug!(regions = boundaries.iter().map(Vec::len).sum::<usize>(), "detection complete");
        Ok(boundaries)
    }
}

/// The model emits `[N, 1, H, W]`; the geometry pipeline wants `[N, H, W]`.
fn squeeze_channel(arr: &ArrayD<f32>) -> Result<ArrayD<f32>, OcrError> {
    match arr.shape() {
        [_, _, _] => Ok(arr.clone()),
        [n, 1, h, w] => {
            let (n, h, w) = (*n, *h, *w);
            let data: Vec<f32> = arr.iter().copied().collect();
            ArrayD::from_shape_vec(ndarray::IxDyn(&[n, h, w]), data)
                .map_err(|e| OcrError::InvalidInput(format!("failed to squeeze detector output: {e}")))
        }
        other => Err(OcrError::InvalidInput(format!("unexpected detector output shape {:?}", other))),
    }
}
