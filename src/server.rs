//! HTTP surface: a single `POST /download` endpoint.
//!
//! The request stays open until the download and mux finish; there is no
//! timeout and no job polling.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::downloader::Downloader;
use crate::error::Result;
use crate::progress;

pub const URL_REQUIRED: &str = "URL is required";
pub const INVALID_URL: &str = "Invalid YouTube URL";

#[derive(Clone)]
pub struct AppState {
    pub downloader: Downloader,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadRequest {
    #[serde(default)]
    url: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
}

#[derive(Debug, PartialEq)]
pub enum ApiError {
    /// Client-side input problem, reported as `{"error": ...}`
    BadRequest(String),
    /// Anything that went wrong downstream, reported with its details
    DownloadFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::DownloadFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Download failed", "details": details })),
            )
                .into_response(),
        }
    }
}

pub fn router(downloader: Downloader) -> Router {
    Router::new()
        .route("/download", post(download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { downloader })
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: &Config, downloader: Downloader) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("tubemux backend running at http://{}", listener.local_addr()?);

    axum::serve(listener, router(downloader)).await?;
    Ok(())
}

/// Pull the url out of a request body.
///
/// Unparseable bodies and falsy values (`null`, `""`, `false`, `0`) count as
/// a missing url; any other non-string value is an invalid url.
fn requested_url(body: &[u8]) -> std::result::Result<String, ApiError> {
    let request: DownloadRequest = serde_json::from_slice(body).unwrap_or_default();

    match request.url {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            Err(ApiError::BadRequest(URL_REQUIRED.to_string()))
        }
        Some(Value::String(url)) if url.is_empty() => {
            Err(ApiError::BadRequest(URL_REQUIRED.to_string()))
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            Err(ApiError::BadRequest(URL_REQUIRED.to_string()))
        }
        Some(Value::String(url)) => Ok(url),
        Some(_) => Err(ApiError::BadRequest(INVALID_URL.to_string())),
    }
}

/// Only `application/json` bodies are read; anything else is treated as empty.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<DownloadResponse>, ApiError> {
    let body: &[u8] = if is_json(&headers) { &body } else { &[] };
    let url = requested_url(body)?;
    if !state.downloader.is_valid_url(&url) {
        return Err(ApiError::BadRequest(INVALID_URL.to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("download", %request_id);
    info!(parent: &span, "Received download request for: {}", url);

    let (tx, mut events) = progress::channel();
    tokio::spawn(
        async move {
            while let Some(event) = events.next().await {
                debug!("Processing: {}", event.timemark);
            }
        }
        .instrument(span.clone()),
    );

    // Runs on its own task: a client disconnect does not cancel the download
    let downloader = state.downloader.clone();
    let task = tokio::spawn(
        async move { downloader.download(&url, Some(tx)).await }.instrument(span.clone()),
    );

    match task.await {
        Ok(Ok(path)) => Ok(Json(DownloadResponse {
            success: true,
            message: "Download completed".to_string(),
            path: path.to_string_lossy().into_owned(),
        })),
        Ok(Err(e)) if e.is_validation() => Err(ApiError::BadRequest(e.details())),
        Ok(Err(e)) => {
            error!(parent: &span, "Download failed: {}", e);
            Err(ApiError::DownloadFailed(e.details()))
        }
        Err(e) => {
            error!(parent: &span, "Download task failed: {}", e);
            Err(ApiError::DownloadFailed(e.to_string()))
        }
    }
}
