//! Image record and the upload format allow-list.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry in the metadata file.
///
/// Keys are PascalCase on disk (`Id`, `Title`, `Imgpath`, `FileExtension`)
/// so existing `images.json` files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub imgpath: Option<String>,
    #[serde(default)]
    pub file_extension: Option<String>,
}

impl ImageRecord {
    pub fn new(id: String, title: String, imgpath: String, format: ImageFormat) -> Self {
        Self {
            id: Some(id),
            title: Some(title),
            imgpath: Some(imgpath),
            file_extension: Some(format.extension().to_string()),
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for_extension(self.file_extension.as_deref().unwrap_or(""))
    }
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Jpg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Resolve the format from a client-supplied file name, case-insensitively.
    ///
    /// A bare `.gif` counts as a gif with an empty stem.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let path = Path::new(name);
        let ext = path
            .extension()
            .or_else(|| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix('.'))
                    .filter(|rest| !rest.is_empty() && !rest.contains('.'))
                    .map(std::ffi::OsStr::new)
            })
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())?;

        match ext.as_str() {
            "jpeg" => Some(Self::Jpeg),
            "jpg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpeg",
            Self::Jpg => ".jpg",
            Self::Png => ".png",
            Self::Gif => ".gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        content_type_for_extension(self.extension())
    }
}

/// Content type for a stored extension; unknown extensions are served as raw bytes.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        ".jpeg" | ".jpg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
