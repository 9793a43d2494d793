//! `serve`: wraps the orchestration pipeline in a multiplexer and exposes
//! it over HTTP/WebSocket.

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use relief_dataflow::Multiplexer;

use crate::config::Config;
use crate::server::{start, ServerState};
use crate::setup::build_pipeline;

#[derive(Args)]
pub struct ServeArgs {
    /// Socket address to bind to. Falls back to the config file's
    /// `serve.bind_addr`, then `RELIEF_BIND_ADDR`, then `127.0.0.1:8080`.
    #[arg(long)]
    pub bind: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> Result<()> {
    let config = Config::load(config_path)?;
    let addr = args
        .bind
        .or_else(|| std::env::var("RELIEF_BIND_ADDR").ok())
        .unwrap_or_else(|| config.serve.bind_addr.clone());

    let pipeline = build_pipeline(&config)?;
    let shutdown = CancellationToken::new();
    let (target, source) = pipeline.build_pipeline(shutdown.clone());
    let mux = Multiplexer::new(target, source);
    let state = ServerState::new(mux, shutdown);

    start(&addr, state).await?;
    Ok(())
}
