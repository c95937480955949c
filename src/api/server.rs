//! HTTP server setup: router, embedded static assets, and image routes.

use super::state::ApiState;
use super::{images, picture, upload};
use crate::config::Config;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use rust_embed::Embed;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Landing page and stylesheet, compiled into the binary.
#[derive(Embed)]
#[folder = "assets/"]
struct SiteAssets;

const INDEX_PAGE: &str = "index.html";

/// Build the application router. The body limit applies to uploads.
pub fn router(state: Arc<ApiState>, max_upload_bytes: usize) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/status", get(status));

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload::upload_image))
        .route("/img/{id}", get(images::get_image))
        .route("/picture/{image_id}", get(picture::get_picture))
        .nest("/api", api_routes)
        .fallback(static_handler)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Returns a handle that resolves when the server shuts down. The caller
/// passes a `tokio::sync::watch::Receiver<bool>` for graceful shutdown.
pub async fn start_http_server(
    config: &Config,
    state: Arc<ApiState>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    let bind = listener.local_addr()?;
    tracing::info!(%bind, "HTTP server listening");

    let handle = tokio::spawn(async move {
        let mut shutdown = shutdown_rx;
        if let Err(error) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|v| *v).await;
            })
            .await
        {
            tracing::error!(%error, "HTTP server exited with error");
        }
    });

    Ok(handle)
}

// -- API handlers --

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn status(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let images = state.library.count().await.map_err(|error| {
        tracing::error!(%error, "failed to count image records");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let uptime = state.started_at.elapsed();
    Ok(Json(serde_json::json!({
        "status": "running",
        "pid": std::process::id(),
        "uptime_seconds": uptime.as_secs(),
        "images": images,
    })))
}

// -- Static file serving --

async fn index() -> Response {
    embedded_asset(INDEX_PAGE)
}

async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return embedded_asset(INDEX_PAGE);
    }
    embedded_asset(path)
}

fn embedded_asset(path: &str) -> Response {
    match SiteAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
