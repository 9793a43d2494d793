//! The CLI's on-disk config file: one JSON document bundling every
//! `relief-core` config struct, each defaulted independently.

use std::path::Path;

use anyhow::{Context, Result};
use relief_core::{DetectorConfig, InferenceConfig, RecognizerConfig, ServeConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub recognizer: RecognizerConfig,
    pub inference: InferenceConfig,
    pub serve: ServeConfig,
}

impl Config {
    /// Loads the config at `path`, or the all-defaults config when `path`
    /// is `None`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("reading config file {path}"))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing config file {path}"))
    }
}
