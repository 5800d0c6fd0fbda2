//! # Upload Acceptance
//!
//! The file-upload collaborator consumed by the AcceptUpload middleware:
//! a media-type allow-list and a sink that persists accepted bytes.
//! Rejection happens before any byte reaches the sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Default allow-list for avatar and preview images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Result type for upload persistence
pub type UploadResult<T> = Result<T, UploadError>;

/// Faults while persisting an accepted upload
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to persist upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Media-type allow-list: `accept` either passes or reports the allowed set
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed: Vec<String>,
}

impl UploadPolicy {
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// The image allow-list used for avatars
    pub fn images() -> Self {
        Self::new(ALLOWED_IMAGE_TYPES.iter().copied())
    }

    /// Check a declared media type. The error carries the allowed set so
    /// the rejection can name it.
    pub fn accept(&self, media_type: &str) -> Result<(), &[String]> {
        if self.allowed.iter().any(|allowed| allowed == media_type) {
            Ok(())
        } else {
            Err(&self.allowed)
        }
    }
}

/// A persisted upload, attached to the request context after acceptance
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub path: String,
    pub media_type: String,
}

/// Where accepted bytes go. Storage/streaming details live behind this
/// seam; the pipeline only sees the stored path.
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn store(&self, bytes: Bytes, media_type: &str) -> UploadResult<StoredFile>;
}

/// Writes uploads into a configured directory under fresh UUID names
pub struct LocalFileSink {
    dir: PathBuf,
}

impl LocalFileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        _ => "bin",
    }
}

#[async_trait]
impl FileSink for LocalFileSink {
    async fn store(&self, bytes: Bytes, media_type: &str) -> UploadResult<StoredFile> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = format!("{}.{}", Uuid::new_v4(), extension_for(media_type));
        let path = self.dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;
        Ok(StoredFile {
            path: path.to_string_lossy().into_owned(),
            media_type: media_type.to_string(),
        })
    }
}
