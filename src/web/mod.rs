//! HTTP front end for the converter.
//!
//! `GET /converter/formats` lists the units as JSON, `GET /converter/length`
//! answers one query as plain text, the same line the RPC service would send.

use crate::core::parser::InputParser;
use crate::core::ConvertLengths;
use crate::utils::error::Result;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct WebState {
    converter: Arc<dyn ConvertLengths>,
}

impl WebState {
    pub fn new(converter: Arc<dyn ConvertLengths>) -> Self {
        Self { converter }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthParams {
    pub length: f64,
    pub input_format: String,
    pub output_format: String,
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/converter/formats", get(formats_handler))
        .route("/converter/length", get(length_handler))
        .route(
            "/health",
            get(|| async {
                Json(serde_json::json!({
                    "status": "ok",
                    "service": "length-convert",
                    "version": env!("CARGO_PKG_VERSION"),
                }))
            }),
        )
        .with_state(state)
}

async fn formats_handler(State(state): State<WebState>) -> Json<Vec<String>> {
    Json(state.converter.available_units())
}

async fn length_handler(
    State(state): State<WebState>,
    Query(params): Query<LengthParams>,
) -> String {
    // 與 RPC 相同的輸入路徑，含空白的單位會得到格式提示
    let input = format!(
        "{} {} in {}",
        params.length, params.input_format, params.output_format
    );
    let answer = InputParser::new(state.converter.as_ref()).convert_input(&input);
    tracing::debug!("HTTP length query answered: {}", answer);
    answer
}

/// Serves the HTTP API on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, state: WebState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🌐 HTTP API listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
