//! Image uploads stored on the local filesystem.
//!
//! Files are renamed to `<uuid>.<ext>` on save, so client-supplied names
//! never reach the filesystem. Deletion accepts only bare file names.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Accepted image extensions (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Maximum accepted upload size in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Errors from storing or removing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was selected")]
    MissingFile,

    #[error("Unsupported file type. Only JPG, JPEG, PNG, GIF and WebP are allowed")]
    UnsupportedExtension,

    #[error("File is too large (max {} MB)", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("Invalid file name")]
    InvalidFilename,

    #[error("File not found")]
    NotFound,

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored image and the URL it is served under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub filename: String,
    pub url: String,
}

/// Writes validated images into the configured upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
}

impl UploadStore {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            url_prefix: config.url_prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Public URL of a stored file.
    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.url_prefix)
    }

    /// Validate and store an image under a fresh name.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for a missing name, disallowed extension
    /// or oversized body, and `UploadError::Io` if writing fails.
    pub async fn save(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, UploadError> {
        if original_name.is_empty() {
            return Err(UploadError::MissingFile);
        }
        let extension = allowed_extension(original_name)?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!("{}.{extension}", Uuid::new_v4());
        let path = self.dir.join(&filename);
        if let Err(e) = tokio::fs::write(&path, bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        tracing::info!(filename = %filename, size = bytes.len(), "Stored upload");
        Ok(StoredImage {
            url: self.url_for(&filename),
            filename,
        })
    }

    /// Remove a stored file.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidFilename` for anything but a bare file
    /// name, and `UploadError::NotFound` if no such file exists.
    pub async fn delete(&self, filename: &str) -> Result<(), UploadError> {
        if !is_plain_filename(filename) {
            return Err(UploadError::InvalidFilename);
        }

        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(UploadError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lowercased extension of `name` if it is an accepted image type.
fn allowed_extension(name: &str) -> Result<String, UploadError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(UploadError::UnsupportedExtension)?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(UploadError::UnsupportedExtension)
    }
}

/// A single normal path component: no separators, no `..`.
fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(dir: PathBuf) -> UploadStore {
        UploadStore::new(&UploadConfig {
            dir,
            url_prefix: "/static/images/".to_owned(),
        })
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("menuhub-upload-test-{name}-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(allowed_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(allowed_extension("a.b.WebP").unwrap(), "webp");
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert!(matches!(
            allowed_extension("script.exe"),
            Err(UploadError::UnsupportedExtension)
        ));
        assert!(matches!(
            allowed_extension("no_extension"),
            Err(UploadError::UnsupportedExtension)
        ));
    }

    #[test]
    fn test_plain_filename() {
        assert!(is_plain_filename("0f8c.png"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("../secret.png"));
        assert!(!is_plain_filename("nested/file.png"));
        assert!(!is_plain_filename("..\\file.png"));
        assert!(!is_plain_filename("/etc/passwd"));
    }

    #[test]
    fn test_url_prefix_trailing_slash_is_trimmed() {
        let store = store(PathBuf::from("unused"));
        assert_eq!(store.url_for("x.png"), "/static/images/x.png");
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let dir = scratch_dir("roundtrip");
        let store = store(dir.clone());

        let stored = store.save("Menu.PNG", b"\x89PNG fake").await.unwrap();
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.url, format!("/static/images/{}", stored.filename));
        assert!(dir.join(&stored.filename).exists());

        store.delete(&stored.filename).await.unwrap();
        assert!(matches!(
            store.delete(&stored.filename).await,
            Err(UploadError::NotFound)
        ));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_save_rejects_oversized() {
        let dir = scratch_dir("oversized");
        let store = store(dir.clone());
        let bytes = vec![0_u8; MAX_UPLOAD_BYTES + 1];

        assert!(matches!(
            store.save("big.jpg", &bytes).await,
            Err(UploadError::TooLarge)
        ));
        assert!(!dir.exists());
    }
}
