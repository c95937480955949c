//! Image upload service: stores uploaded images on disk, records their
//! metadata in a JSON file, and serves them back with a details page.

pub mod api;
pub mod config;
pub mod error;
pub mod images;

pub use error::{Error, Result};
