//! Media storage abstraction for avatar and cover-image uploads.
//!
//! The service only needs "store these bytes, give me a public URL", so the
//! store is a trait and the default implementation writes to a local uploads
//! directory. Swapping in an object-storage backend is an implementation of
//! the same trait.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::Result;

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Media store configuration.
#[derive(Debug, Clone)]
pub struct MediaStoreConfig {
    /// Directory uploaded files are written to
    pub uploads_dir: PathBuf,
    /// Public base URL served files are reachable under
    pub public_base_url: String,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl Default for MediaStoreConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("./uploads"),
            public_base_url: "/media".to_string(),
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl MediaStoreConfig {
    /// Load media store config from environment variables, falling back to
    /// defaults.
    ///
    /// Supported env vars:
    /// - `UPLOADS_DIR` (e.g. "./uploads")
    /// - `MEDIA_BASE_URL` (e.g. "https://cdn.example.com/media")
    /// - `MAX_UPLOAD_BYTES`
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("UPLOADS_DIR")
            && !dir.trim().is_empty()
        {
            config.uploads_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("MEDIA_BASE_URL")
            && !url.trim().is_empty()
        {
            config.public_base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(max) = std::env::var("MAX_UPLOAD_BYTES")
            && let Ok(parsed) = max.parse::<usize>()
        {
            config.max_upload_bytes = parsed;
        }

        config
    }
}

/// Media store abstraction.
///
/// Returns `Ok(None)` when the upload completed but no accessible URL could
/// be produced; callers treat that the same as a failed upload.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the file and return its public URL.
    async fn store(&self, file: &UploadedFile) -> Result<Option<String>>;
}

/// Media store writing to a local uploads directory.
pub struct LocalMediaStore {
    config: MediaStoreConfig,
}

impl LocalMediaStore {
    /// Create a new LocalMediaStore.
    pub fn new(config: MediaStoreConfig) -> Self {
        Self { config }
    }
}

/// Extract a safe lowercase file extension from an uploaded filename.
fn file_extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, file: &UploadedFile) -> Result<Option<String>> {
        if file.data.is_empty() {
            return Ok(None);
        }
        if file.data.len() > self.config.max_upload_bytes {
            return Err(crate::Error::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_bytes
            )));
        }

        tokio::fs::create_dir_all(&self.config.uploads_dir).await?;

        // Stored names are uuid-based; the original filename only
        // contributes its extension.
        let stored_name = format!(
            "{}.{}",
            uuid::Uuid::new_v4(),
            file_extension(&file.filename)
        );
        let path = self.config.uploads_dir.join(&stored_name);
        tokio::fs::write(&path, &file.data).await?;

        tracing::debug!(
            filename = %file.filename,
            stored = %stored_name,
            bytes = file.data.len(),
            "Stored uploaded file"
        );

        Ok(Some(format!(
            "{}/{}",
            self.config.public_base_url, stored_name
        )))
    }
}
