//! GET /picture/{image_id}
//!
//! Renders the details page for one image. Titles are HTML-escaped by the
//! template environment.

use super::state::{ApiState, PICTURE_TEMPLATE};
use crate::images::ImageRecord;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use minijinja::{Environment, context};
use std::sync::Arc;

pub(super) async fn get_picture(
    State(state): State<Arc<ApiState>>,
    Path(image_id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let record = state
        .library
        .find(&image_id)
        .await
        .map_err(|error| {
            tracing::error!(%error, id = %image_id, "failed to read image metadata");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let page = render_details(&state.templates, &record).map_err(|error| {
        tracing::error!(%error, id = %image_id, "failed to render details page");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(page))
}

fn render_details(
    templates: &Environment<'_>,
    record: &ImageRecord,
) -> crate::error::Result<String> {
    let template = templates.get_template(PICTURE_TEMPLATE)?;
    Ok(template.render(context! {
        id => record.id(),
        title => record.title(),
    })?)
}
