//! Shared state for the HTTP API.

use crate::images::ImageLibrary;

use minijinja::Environment;
use std::time::Instant;

pub(super) const PICTURE_TEMPLATE: &str = "picture.html";

/// State shared across all API handlers.
pub struct ApiState {
    pub started_at: Instant,
    pub library: ImageLibrary,
    pub(super) templates: Environment<'static>,
}

impl ApiState {
    pub fn new(library: ImageLibrary) -> crate::error::Result<Self> {
        let mut templates = Environment::new();
        templates.add_template(
            PICTURE_TEMPLATE,
            include_str!("../../templates/picture.html"),
        )?;

        Ok(Self {
            started_at: Instant::now(),
            library,
            templates,
        })
    }
}
