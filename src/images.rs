//! Uploaded images and their JSON metadata.
//!
//! Files live flat under `{data_dir}/uploads/{id}{ext}`; records live in
//! `{data_dir}/images.json` and are found by linear scan.

pub mod library;
pub mod metadata;
pub mod models;

pub use library::{ImageLibrary, StoredImage};
pub use metadata::MetadataStore;
pub use models::{ImageFormat, ImageRecord, content_type_for_extension};
