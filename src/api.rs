//! HTTP surface: landing page, upload form handler, image and details pages.

mod images;
mod picture;
mod server;
mod state;
mod upload;

pub use server::{router, start_http_server};
pub use state::ApiState;
