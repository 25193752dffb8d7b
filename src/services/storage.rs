//! Blob storage for cover images
//!
//! Covers live on the local filesystem under the configured root and are
//! served as static files. The database only stores relative paths so
//! the root can move without rewriting rows.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Subdirectory of the storage root holding cover images
const COVERS_DIR: &str = "covers";

/// Upload size cap for covers (2 MiB, matching the reference behavior)
pub const MAX_COVER_BYTES: usize = 2 * 1024 * 1024;

/// Map an image content type to the file extension we store
pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    public_base: String,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            public_base: config.public_base.trim_end_matches('/').to_string(),
        }
    }

    /// Filesystem root served as static files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directories if missing
    pub async fn init(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(self.root.join(COVERS_DIR))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create storage directory: {}", e)))
    }

    /// Store a cover blob under a fresh name, returning its relative path
    pub async fn store_cover(&self, data: &[u8], extension: &str) -> AppResult<String> {
        let relative = format!("{}/{}.{}", COVERS_DIR, Uuid::new_v4(), extension);
        tokio::fs::write(self.root.join(&relative), data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store cover: {}", e)))?;
        Ok(relative)
    }

    /// Remove a stored blob. Best effort: a missing file is logged, not
    /// an error, so row deletion never fails on blob cleanup.
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove blob {}: {}", path.display(), e);
        }
    }

    /// Public URL for a stored relative path
    pub fn public_url(&self, relative: &str) -> String {
        format!("{}/{}", self.public_base, relative)
    }

    /// Resolve an optional cover path to its public URL
    pub fn cover_url(&self, cover: Option<&str>) -> Option<String> {
        cover.map(|c| self.public_url(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    fn service(root: &Path) -> StorageService {
        StorageService::new(&StorageConfig {
            root: root.to_string_lossy().into_owned(),
            public_base: "/storage/".to_string(),
        })
    }

    #[test]
    fn known_image_mimes_map_to_extensions() {
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("image/png"), Some("png"));
        assert_eq!(extension_for_mime("image/gif"), None);
        assert_eq!(extension_for_mime("application/pdf"), None);
    }

    #[test]
    fn public_url_joins_without_double_slash() {
        let svc = service(Path::new("storage"));
        assert_eq!(svc.public_url("covers/x.jpg"), "/storage/covers/x.jpg");
    }

    #[tokio::test]
    async fn store_and_remove_cover() {
        let root = std::env::temp_dir().join(format!("perpus-test-{}", Uuid::new_v4()));
        let svc = service(&root);
        svc.init().await.unwrap();

        let relative = svc.store_cover(b"not-really-a-jpeg", "jpg").await.unwrap();
        assert!(relative.starts_with("covers/"));
        assert!(relative.ends_with(".jpg"));

        let on_disk = root.join(&relative);
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"not-really-a-jpeg");

        svc.remove(&relative).await;
        assert!(!on_disk.exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
