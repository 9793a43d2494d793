//! §4.7 end-to-end orchestration: wires the detector, the geometry pipeline
//! and the recognizer into a single pipeline, either run directly for one
//! image or built as a long-lived `relief-dataflow` graph shared behind a
//! `relief_dataflow::Multiplexer`.

use std::sync::Arc;

use image::RgbImage;
use relief_dataflow::{fork_join, link, transform, DataflowFault, Source, Target};
use relief_geometry::{RotatedRect, TextBoundary};
use relief_inference::InferenceBackend;
use tokio_util::sync::CancellationToken;

use crate::detector::TextDetector;
use crate::error::OcrError;
use crate::recognizer::postprocess::Decoded;
use crate::recognizer::TextRecognizer;
use crate::result::{OcrResult, PageResult};

/// A built detector + recognizer pair, ready to process images.
pub struct OcrPipeline<B> {
    detector: Arc<TextDetector<B>>,
    recognizer: Arc<TextRecognizer<B>>,
    queue_capacity: usize,
}

impl<B> OcrPipeline<B>
where
    B: InferenceBackend + 'static,
{
    pub fn new(detector: TextDetector<B>, recognizer: TextRecognizer<B>, queue_capacity: usize) -> Self {
        Self {
            detector: Arc::new(detector),
            recognizer: Arc::new(recognizer),
            queue_capacity,
        }
    }

    /// Runs one image through detection and recognition directly, without
    /// building a dataflow graph. Used by the single-shot `process` command.
    pub async fn process_image(&self, image: RgbImage, cancel: &CancellationToken) -> Result<PageResult, OcrError> {
        let (width, height) = image.dimensions();

        let mut boundaries = self.detector.detect(std::slice::from_ref(&image), cancel).await?;
        let boundaries = boundaries.pop().unwrap_or_default();
        let rects: Vec<RotatedRect> = boundaries.iter().map(|b| b.rect).collect();

        let decoded = self.recognizer.recognize(&image, &rects, cancel).await?;
        let results = zip_results(&rects, decoded);

        Ok(PageResult { results, image_size: (width, height) })
    }

    /// Builds the same detect → recognize pipeline as a `relief-dataflow`
    /// graph tagged end to end with a sequence number, so it can be wired
    /// into a `relief_dataflow::Multiplexer` (used by `serve`). The graph
    /// forks after detection: per-image metadata (the sequence number, the
    /// image size, the detected rectangles) travels on one branch while the
    /// crops travel through the recognizer on the other, re-merging into
    /// the final `PageResult` at the sink.
    pub fn build_pipeline(&self, cancel: CancellationToken) -> (Target<(u64, RgbImage)>, Source<(u64, PageResult)>) {
        let (target, source) = link::<(u64, RgbImage)>(self.queue_capacity);
        let capacity = self.queue_capacity;

        let detector = self.detector.clone();
        let detect_cancel = cancel.clone();
        let detected = transform(source, capacity, capacity, move |(seq, image): (u64, RgbImage)| {
            let detector = detector.clone();
            let cancel = detect_cancel.clone();
            async move {
                let (width, height) = image.dimensions();
                let mut boundaries = detector
                    .detect(std::slice::from_ref(&image), &cancel)
                    .await
                    .map_err(DataflowFault::from_display)?;
                let boundaries = boundaries.pop().unwrap_or_default();
                Ok::<_, Arc<DataflowFault>>((seq, image, (width, height), boundaries))
            }
        });

        let recognizer = self.recognizer.clone();
        let recognize_cancel = cancel.clone();
        let merged = fork_join(
            detected,
            capacity,
            split_for_recognition,
            |metadata_source| metadata_source,
            move |data_source: Source<(RgbImage, Vec<RotatedRect>)>| {
                let recognizer = recognizer.clone();
                let cancel = recognize_cancel.clone();
                transform(data_source, capacity, capacity, move |(image, rects): (RgbImage, Vec<RotatedRect>)| {
                    let recognizer = recognizer.clone();
                    let cancel = cancel.clone();
                    async move {
                        recognizer
                            .recognize(&image, &rects, &cancel)
                            .await
                            .map_err(DataflowFault::from_display)
                    }
                })
            },
            merge_into_page_result,
        );

        (target, merged)
    }
}

type Metadata = (u64, (u32, u32), Vec<RotatedRect>);
type RecognizerInput = (RgbImage, Vec<RotatedRect>);

fn split_for_recognition(item: (u64, RgbImage, (u32, u32), Vec<TextBoundary>)) -> (Metadata, RecognizerInput) {
    let (seq, image, size, boundaries) = item;
    let rects: Vec<RotatedRect> = boundaries.iter().map(|b| b.rect).collect();
    ((seq, size, rects.clone()), (image, rects))
}

fn merge_into_page_result(metadata: Metadata, decoded: Vec<Decoded>) -> (u64, PageResult) {
    let (seq, size, rects) = metadata;
    let results = zip_results(&rects, decoded);
    (seq, PageResult { results, image_size: size })
}

fn zip_results(rects: &[RotatedRect], decoded: Vec<Decoded>) -> Vec<OcrResult> {
    rects
        .iter()
        .zip(decoded.into_iter())
        .map(|(rect, d)| OcrResult::new(rect, d.text, d.confidence))
        .collect()
}
