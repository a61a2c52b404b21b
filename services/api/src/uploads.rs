//! Image storage for issue photos

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// URL prefix stored images are served under
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Image storage backend
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image and return the public URL it is served from
    async fn store(&self, data: Vec<u8>, content_type: &str) -> Result<String>;
}

/// File extension for an accepted image content type.
///
/// Only raster formats are stored. SVG and unknown `image/*` types are
/// rejected since they are served back from the API origin.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

/// Stores images as flat files in one directory
#[derive(Clone)]
pub struct DiskImageStore {
    base_path: PathBuf,
}

impl DiskImageStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn store(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        let extension = image_extension(content_type)
            .with_context(|| format!("Not an image content type: {}", content_type))?;

        fs::create_dir_all(&self.base_path)
            .await
            .context("Failed to create upload directory")?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.base_path.join(&file_name), data)
            .await
            .with_context(|| format!("Failed to write upload {}", file_name))?;

        Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
    }
}
