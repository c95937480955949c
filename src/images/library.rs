//! Upload directory plus its metadata file.

use super::metadata::MetadataStore;
use super::models::{ImageFormat, ImageRecord};
use crate::error::Result;

use std::path::{Path, PathBuf};

const UPLOADS_DIR: &str = "uploads";
const METADATA_FILE: &str = "images.json";

#[derive(Debug)]
pub struct ImageLibrary {
    upload_dir: PathBuf,
    metadata: MetadataStore,
}

/// Image bytes ready to serve.
#[derive(Debug)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl ImageLibrary {
    /// Open the library rooted at `data_dir`, creating `uploads/` if needed.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let upload_dir = data_dir.join(UPLOADS_DIR);
        tokio::fs::create_dir_all(&upload_dir).await?;
        let upload_dir = tokio::fs::canonicalize(&upload_dir).await?;
        let metadata = MetadataStore::new(upload_dir.with_file_name(METADATA_FILE));

        Ok(Self {
            upload_dir,
            metadata,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn metadata_path(&self) -> &Path {
        self.metadata.path()
    }

    /// Write the file under a fresh id and append its record.
    ///
    /// The two writes are not atomic together: if the metadata append fails
    /// the image file stays behind unreferenced.
    pub async fn save_upload(
        &self,
        title: &str,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<ImageRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let file_path = self
            .upload_dir
            .join(format!("{id}{}", format.extension()));

        tokio::fs::write(&file_path, bytes).await?;

        let record = ImageRecord::new(
            id,
            title.to_string(),
            file_path.to_string_lossy().to_string(),
            format,
        );
        self.metadata.append(record.clone()).await?;

        Ok(record)
    }

    /// Look up a record. `None` when the id is unknown or nothing was ever uploaded.
    pub async fn find(&self, id: &str) -> Result<Option<ImageRecord>> {
        if !self.metadata.exists().await? {
            return Ok(None);
        }
        self.metadata.find(id).await
    }

    /// Read the file behind a record. `None` when it is gone or lives outside
    /// the upload directory.
    pub async fn read_image(&self, record: &ImageRecord) -> Result<Option<StoredImage>> {
        let Some(path) = record.imgpath.as_deref() else {
            return Ok(None);
        };

        let canonical = match tokio::fs::canonicalize(path).await {
            Ok(canonical) => canonical,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        if !canonical.starts_with(&self.upload_dir) {
            tracing::warn!(
                id = %record.id(),
                path = %canonical.display(),
                "image path outside upload directory"
            );
            return Ok(None);
        }

        match tokio::fs::read(&canonical).await {
            Ok(bytes) => Ok(Some(StoredImage {
                bytes,
                content_type: record.content_type(),
            })),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.metadata.load().await?.len())
    }
}
