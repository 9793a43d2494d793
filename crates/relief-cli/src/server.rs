//! The `serve` HTTP/WebSocket surface: a thin shell over a shared
//! `relief_dataflow::Multiplexer`-wrapped OCR pipeline.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use image::RgbImage;
use relief_core::PageResult;
use relief_dataflow::{Multiplexer, MultiplexerFault};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared across every connection: one multiplexer wrapping one long-lived
/// pipeline, plus the shutdown signal that faults every pending caller.
#[derive(Clone)]
pub struct ServerState {
    mux: Arc<Multiplexer<RgbImage, PageResult>>,
    shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(mux: Multiplexer<RgbImage, PageResult>, shutdown: CancellationToken) -> Self {
        Self { mux: Arc::new(mux), shutdown }
    }
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/ocr", post(handle_ocr))
        .route("/ws", get(handle_ws))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start(addr: &str, state: ServerState) -> std::io::Result<()> {
    info!(addr, "starting relief OCR server");
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// `POST /ocr`: multipart upload with a single `image` field, replies with
/// one `PageResult` as JSON.
async fn handle_ocr(State(state): State<ServerState>, mut multipart: Multipart) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut image_bytes = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))? {
        if field.name() == Some("image") {
            image_bytes = Some(field.bytes().await.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?);
            break;
        }
    }
    let bytes = image_bytes.ok_or((StatusCode::BAD_REQUEST, "missing `image` field".to_string()))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid image: {e}")))?
        .to_rgb8();

    let page = submit(&state, image).await.map_err(fault_to_response)?;
    Ok(Json(page))
}

/// `GET /ws`: a stream of binary image frames, one `PageResult` JSON text
/// message replied per frame, in the order frames arrived.
async fn handle_ws(ws: WebSocketUpgrade, State(state): State<ServerState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_loop(socket, state))
}

async fn ws_loop(mut socket: WebSocket, state: ServerState) {
    while let Some(Ok(message)) = socket.recv().await {
        let bytes = match message {
            Message::Binary(bytes) => bytes,
            Message::Close(_) => break,
            _ => continue,
        };
        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image.to_rgb8(),
            Err(e) => {
                warn!(error = %e, "dropping unreadable frame");
                continue;
            }
        };

        match submit(&state, image).await {
            Ok(page) => {
                let Ok(json) = serde_json::to_string(&page) else { continue };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            Err(fault) => {
                error!(%fault, "pipeline failed mid-stream, closing connection");
                break;
            }
        }
    }
}

async fn submit(state: &ServerState, image: RgbImage) -> Result<PageResult, MultiplexerFault> {
    let inner = state.mux.process_one(image, CancellationToken::new(), state.shutdown.clone()).await?;
    inner.await
}

fn fault_to_response(fault: MultiplexerFault) -> (StatusCode, String) {
    (StatusCode::SERVICE_UNAVAILABLE, fault.to_string())
}
