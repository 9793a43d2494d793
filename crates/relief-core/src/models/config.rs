//! `serde`-derived configuration, one struct per concern, each loadable
//! from JSON with `#[serde(default)]` and a `Default` impl.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Detector preprocess/postprocess knobs (§4.1, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path to the DBNet-family detection ONNX model.
    pub model_path: PathBuf,

    /// Fixed square input the model was trained against.
    pub input_size: u32,

    /// Binarization threshold (§4.1 step 1). The DBNet paper's recommended
    /// value; changing it changes which pixels are considered "text".
    pub binarize_threshold: f32,

    /// Minimum mean probability a traced contour must have to survive
    /// filtering (§4.1 step 4).
    pub min_contour_score: f32,

    /// Douglas-Peucker simplification epsilon (§4.1 step 5).
    pub simplify_epsilon: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/det.onnx"),
            input_size: 640,
            binarize_threshold: 0.2,
            min_contour_score: 0.6,
            simplify_epsilon: 1.0,
        }
    }
}

/// Recognizer preprocess/postprocess knobs (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Path to the SVTRv2-CTC recognition ONNX model.
    pub model_path: PathBuf,

    /// Path to the character dictionary file (index 0 is the CTC blank).
    pub dictionary_path: PathBuf,

    /// Fixed crop height every recognizer input is resized to.
    pub target_height: u32,

    /// Minimum and maximum crop width after aspect-preserving resize.
    pub min_width: u32,
    pub max_width: u32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/rec.onnx"),
            dictionary_path: PathBuf::from("models/dict.txt"),
            target_height: 48,
            min_width: 12,
            max_width: 320,
        }
    }
}

/// Bounded-parallelism inference engine knobs shared by both models (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Maximum number of concurrent `run` calls against a backend. Zero
    /// means "use the number of physical CPU cores detected at startup".
    pub max_parallelism: usize,

    /// Memoize the first successful inference per input shape; useful as a
    /// warm-up short-circuit in tests and benchmarks, never in production.
    pub cache_first: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 0,
            cache_first: false,
        }
    }
}

impl InferenceConfig {
    /// Resolves `max_parallelism`, substituting the physical core count
    /// when the configured value is zero.
    pub fn resolved_parallelism(&self) -> usize {
        if self.max_parallelism == 0 {
            num_cpus::get()
        } else {
            self.max_parallelism
        }
    }
}

/// Knobs for the `serve` external interface (§6): bind address and the
/// bounded queue depths used to build the dataflow pipeline the
/// multiplexer shares across connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Socket address to bind the HTTP/WebSocket server to. Overridable by
    /// the `RELIEF_BIND_ADDR` environment variable at the CLI boundary.
    pub bind_addr: String,

    /// Bounded queue capacity used for every dataflow block in the
    /// orchestration pipeline (§4.5 default: small, ~2).
    pub queue_capacity: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            queue_capacity: 2,
        }
    }
}
