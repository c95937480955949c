//! GET /img/{id}
//!
//! Serves the stored image bytes with a content type derived from the
//! recorded extension. Unknown ids and missing files are 404.

use super::state::ApiState;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

pub(super) async fn get_image(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Response {
    let record = match state.library.find(&id).await {
        Ok(Some(record)) => record,
        Ok(None) => return (StatusCode::NOT_FOUND, "image not found").into_response(),
        Err(error) => {
            tracing::error!(%error, %id, "failed to read image metadata");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state.library.read_image(&record).await {
        Ok(Some(image)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, image.content_type),
                // Stored files never change once written.
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            image.bytes,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "image file not found").into_response(),
        Err(error) => {
            tracing::error!(%error, %id, "failed to read image file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
