//! Text recognition: combines the §4.3 pre/post-processors with a bounded-
//! parallelism inference engine over an SVTRv2-CTC model.

pub mod postprocess;
pub mod preprocess;

use image::RgbImage;
use relief_geometry::RotatedRect;
use relief_inference::{InferenceBackend, InferenceEngine, InputTensor, OutputTensor};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::dictionary::CharacterDictionary;
use crate::error::OcrError;
use crate::models::config::RecognizerConfig;
use postprocess::Decoded;
use preprocess::RecognizerPreprocessor;

/// Wraps a recognition model: perspective-crop → resize/normalize → bounded
/// inference → CTC decode.
pub struct TextRecognizer<B> {
    engine: InferenceEngine<B>,
    preprocessor: RecognizerPreprocessor,
    dictionary: CharacterDictionary,
    input_name: String,
}

impl<B> TextRecognizer<B>
where
    B: InferenceBackend + 'static,
{
    pub fn new(engine: InferenceEngine<B>, config: &RecognizerConfig, dictionary: CharacterDictionary, input_name: impl Into<String>) -> Self {
        Self {
            engine,
            preprocessor: RecognizerPreprocessor::new(config),
            dictionary,
            input_name: input_name.into(),
        }
    }

    /// Recognizes every rectangle cropped out of `source`, in the same
    /// order the rectangles were given. Returns an empty vec for an empty
    /// rectangle list without touching the backend.
    pub async fn recognize(&self, source: &RgbImage, rects: &[RotatedRect], cancel: &CancellationToken) -> Result<Vec<Decoded>, OcrError> {
        let Some(tensor) = self.preprocessor.preprocess(source, rects)? else {
            return Ok(Vec::new());
        };

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
            .ok_or_else(|| OcrError::InvalidInput("recognizer produced no output tensors".to_string()))?;

        let probs = match output {
            OutputTensor::Float32(arr) => arr,
            _ => return Err(OcrError::InvalidInput("recognizer output was not float32".to_string())),
        };

        let decoded = postprocess::decode(probs, &self.dictionary)?;
        for d in &decoded {
            trace!(text = %d.text, confidence = d.confidence, "recognized word");
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use ndarray::ArrayD;
    use relief_geometry::Point;
    use relief_inference::{OutputTensor, Result as InfResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingBackend {
        calls: Arc<AtomicUsize>,
    }

    impl InferenceBackend for CountingBackend {
        fn run(&self, inputs: &[(&str, InputTensor)]) -> InfResult<Vec<(String, OutputTensor)>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let shape = inputs[0].1.shape().to_vec();
            let m = shape[0];
            // 4-class dictionary (blank + a,b,c); always argmax index 1 ('a').
            let t = 2usize;
            let k = 4usize;
            let mut data = vec![0.0f32; m * t * k];
            for seq in 0..m {
                for step in 0..t {
                    data[seq * t * k + step * k + 1] = 0.9;
                }
            }
            let arr = ArrayD::from_shape_vec(ndarray::IxDyn(&[m, t, k]), data).unwrap();
            Ok(vec![("out".to_string(), OutputTensor::Float32(arr))])
        }

        fn input_names(&self) -> &[String] {
            &[]
        }
        fn output_names(&self) -> &[String] {
            &[]
        }
    }

    fn dict() -> (std::path::PathBuf, CharacterDictionary) {
        let path = std::env::temp_dir().join(format!("relief-recognizer-test-{}.txt", std::process::id()));
        std::fs::write(&path, "a\nb\nc\n").unwrap();
        let dict = CharacterDictionary::load(&path).unwrap();
        (path, dict)
    }

    fn axis_aligned(w: f64, h: f64) -> RotatedRect {
        RotatedRect::from_corners(
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        )
    }

    #[tokio::test]
    async fn empty_rects_short_circuits_without_calling_backend() {
        let (path, dict) = dict();
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = InferenceEngine::new(CountingBackend { calls: calls.clone() }, 2, false);
        let recognizer = TextRecognizer::new(engine, &RecognizerConfig::default(), dict, "x");
        let image = RgbImage::from_pixel(50, 50, Rgb([10, 10, 10]));

        let result = recognizer.recognize(&image, &[], &CancellationToken::new()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn recognizes_each_rect_in_order() {
        let (path, dict) = dict();
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = InferenceEngine::new(CountingBackend { calls }, 2, false);
        let recognizer = TextRecognizer::new(engine, &RecognizerConfig::default(), dict, "x");
        let image = RgbImage::from_pixel(200, 50, Rgb([10, 10, 10]));
        let rects = vec![axis_aligned(60.0, 20.0), axis_aligned(40.0, 20.0)];

        let result = recognizer.recognize(&image, &rects, &CancellationToken::new()).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "a");
        assert_eq!(result[1].text, "a");
        let _ = std::fs::remove_file(path);
    }
}
