//! Wires a loaded [`Config`] into a ready-to-use `relief_core::OcrPipeline`.

use anyhow::{Context, Result};
use relief_core::{CharacterDictionary, OcrPipeline, TextDetector, TextRecognizer};
use relief_inference::{InferenceBackend, InferenceEngine, OrtBackend};

use crate::config::Config;

pub fn build_pipeline(config: &Config) -> Result<OcrPipeline<OrtBackend>> {
    let parallelism = config.inference.resolved_parallelism();

    let det_backend = OrtBackend::from_file(&config.detector.model_path)
        .with_context(|| format!("loading detector model {}", config.detector.model_path.display()))?;
    let det_input_name = input_name_of(&det_backend);
    let det_engine = InferenceEngine::new(det_backend, parallelism, config.inference.cache_first);
    let detector = TextDetector::new(det_engine, &config.detector, det_input_name);

    let rec_backend = OrtBackend::from_file(&config.recognizer.model_path)
        .with_context(|| format!("loading recognizer model {}", config.recognizer.model_path.display()))?;
    let rec_input_name = input_name_of(&rec_backend);
    let rec_engine = InferenceEngine::new(rec_backend, parallelism, config.inference.cache_first);
    let dictionary = CharacterDictionary::load(&config.recognizer.dictionary_path)
        .with_context(|| format!("loading dictionary {}", config.recognizer.dictionary_path.display()))?;
    let recognizer = TextRecognizer::new(rec_engine, &config.recognizer, dictionary, rec_input_name);

    Ok(OcrPipeline::new(detector, recognizer, config.serve.queue_capacity))
}

fn input_name_of(backend: &OrtBackend) -> String {
    backend
        .input_names()
        .first()
        .cloned()
        .unwrap_or_else(|| "input".to_string())
}
