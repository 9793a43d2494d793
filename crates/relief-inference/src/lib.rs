//! Bounded-parallelism ONNX inference for relief, built on `ort` with the
//! XNNPACK execution provider.

mod backend;
mod engine;
mod error;
mod tensor;

pub use backend::{ort::OrtBackend, InferenceBackend};
pub use engine::InferenceEngine;
pub use error::InferenceError;
pub use tensor::{nchw_to_nhwc, nhwc_to_nchw, InputTensor, OutputTensor, TensorType};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
