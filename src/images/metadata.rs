//! JSON-array metadata file.
//!
//! Every append rewrites the whole array. Writers are serialized through
//! `write_lock` and land via a temp file + rename, so readers never see a
//! half-written file.

use super::models::ImageRecord;
use crate::error::Result;

use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    /// All records. A missing or empty file is an empty list.
    pub async fn load(&self) -> Result<Vec<ImageRecord>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn find(&self, id: &str) -> Result<Option<ImageRecord>> {
        let records = self.load().await?;
        Ok(records
            .into_iter()
            .find(|record| record.id.as_deref() == Some(id)))
    }

    pub async fn append(&self, record: ImageRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        records.push(record);
        self.write_all(&records).await
    }

    async fn write_all(&self, records: &[ImageRecord]) -> Result<()> {
        let json = serde_json::to_vec(records)?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}
