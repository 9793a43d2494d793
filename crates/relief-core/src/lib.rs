//! Detector/recognizer pre- and post-processing and end-to-end orchestration
//! for the relief OCR engine.
//!
//! This crate owns the two numeric contracts the models require
//! (normalization, layout, CTC decode) and wires `relief-inference`,
//! `relief-geometry` and `relief-dataflow` into a single pipeline that turns
//! an image into an ordered list of `(rotated rectangle, text, confidence)`.

pub mod detector;
pub mod dictionary;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod recognizer;
pub mod result;

pub use detector::TextDetector;
pub use dictionary::CharacterDictionary;
pub use error::{OcrError, Result};
pub use models::config::{DetectorConfig, InferenceConfig, RecognizerConfig, ServeConfig};
pub use pipeline::OcrPipeline;
pub use recognizer::TextRecognizer;
pub use result::{OcrResult, PageResult};

pub use relief_inference::{InferenceBackend, InputTensor, OutputTensor};
