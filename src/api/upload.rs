//! POST /upload   (multipart/form-data, fields "imgtitle" and "imgToUpload")
//!
//! Validates the title and file extension, stores the image under a fresh
//! id, and redirects to its details page.

use super::state::ApiState;
use crate::images::ImageFormat;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use std::sync::Arc;

const TITLE_FIELD: &str = "imgtitle";
const FILE_FIELD: &str = "imgToUpload";

struct UploadedFile {
    file_name: String,
    data: Bytes,
}

pub(super) async fn upload_image(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, StatusCode> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "upload is not a multipart form");
        StatusCode::BAD_REQUEST
    })?;

    let mut title: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(%error, "failed to read upload form");
                return Err(error.status());
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            TITLE_FIELD => {
                let text = field.text().await.map_err(|error| {
                    tracing::warn!(%error, "failed to read image title");
                    error.status()
                })?;
                title = Some(text);
            }
            FILE_FIELD => {
                let file_name = field.file_name().unwrap_or("").to_string();
                if file_name.is_empty() {
                    continue;
                }
                let data = field.bytes().await.map_err(|error| {
                    tracing::warn!(%error, "failed to read image upload bytes");
                    error.status()
                })?;
                file = Some(UploadedFile { file_name, data });
            }
            _ => {}
        }
    }

    let title = title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| {
            tracing::debug!("upload rejected: missing title");
            StatusCode::BAD_REQUEST
        })?;

    let file = file.ok_or_else(|| {
        tracing::debug!("upload rejected: missing file");
        StatusCode::BAD_REQUEST
    })?;

    let format = ImageFormat::from_file_name(&file.file_name).ok_or_else(|| {
        tracing::debug!(file_name = %file.file_name, "upload rejected: file type not permitted");
        StatusCode::BAD_REQUEST
    })?;

    let record = state
        .library
        .save_upload(&title, format, &file.data)
        .await
        .map_err(|error| {
            tracing::error!(%error, "failed to store uploaded image");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!(
        id = %record.id(),
        content_type = format.content_type(),
        title_len = title.len(),
        bytes = file.data.len(),
        "image uploaded"
    );

    Ok(Redirect::to(&format!("/picture/{}", record.id())))
}
