//! `process`: single-shot OCR over one or more image files, no multiplexer.

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::setup::build_pipeline;

#[derive(Args)]
pub struct ProcessArgs {
    /// Image files to run OCR over.
    #[arg(required = true)]
    pub images: Vec<String>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> Result<()> {
    let config = Config::load(config_path)?;
    let pipeline = build_pipeline(&config)?;
    let cancel = CancellationToken::new();

    for path in &args.images {
        info!(path, "processing image");
        let image = image::open(path)
            .with_context(|| format!("opening image {path}"))?
            .to_rgb8();

        let page = pipeline.process_image(image, &cancel).await?;
        println!("{}", serde_json::to_string(&page)?);
    }

    Ok(())
}
