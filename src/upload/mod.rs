//! Image upload module
//!
//! Validates the uploaded file name against an extension allow-list,
//! sanitizes it, and writes the file under the public upload directory.

mod filename;
mod multipart;

pub use filename::{has_allowed_extension, secure_filename};
pub use multipart::{read_file_field, read_text_fields, UploadedFile};

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

use crate::config::ContentConfig;

/// Form field carrying the image
pub const IMAGE_FIELD: &str = "image";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("File type not allowed")]
    DisallowedType,

    #[error("Invalid file name")]
    InvalidFilename,

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("Failed to save upload {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Whether the request itself was at fault (400) rather than the server
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

/// Result body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    #[serde(rename = "filePath")]
    pub file_path: String,
}

/// Where uploads go and which extensions are accepted
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    dir: PathBuf,
    url_prefix: String,
    allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str, allowed_extensions: &[String]) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(
            &config.upload_dir,
            &config.upload_url_prefix,
            &config.allowed_extensions,
        )
    }

    /// Validate and persist one uploaded file.
    ///
    /// An existing file with the same sanitized name is overwritten.
    pub async fn save(&self, file: &UploadedFile) -> Result<StoredUpload, UploadError> {
        if file.file_name.is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        if !has_allowed_extension(&file.file_name, &self.allowed_extensions) {
            return Err(UploadError::DisallowedType);
        }

        let name = secure_filename(&file.file_name);
        if name.is_empty() {
            return Err(UploadError::InvalidFilename);
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| UploadError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let target = self.dir.join(&name);
        fs::write(&target, &file.data)
            .await
            .map_err(|source| UploadError::Io {
                path: target.clone(),
                source,
            })?;

        Ok(StoredUpload {
            file_path: format!("{}/{name}", self.url_prefix),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use tempfile::TempDir;

    fn policy(dir: &TempDir) -> UploadPolicy {
        let allowed: Vec<String> = ["png", "jpg", "jpeg", "gif", "webp"]
            .iter()
            .map(ToString::to_string)
            .collect();
        UploadPolicy::new(dir.path().join("uploads"), "/uploads/", &allowed)
    }

    fn file(name: &str, data: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn test_save_accepts_uppercase_extension() {
        let dir = TempDir::new().unwrap();
        let stored = policy(&dir).save(&file("photo.PNG", b"png-bytes")).await.unwrap();

        assert_eq!(stored.file_path, "/uploads/photo.PNG");
        let on_disk = std::fs::read(dir.path().join("uploads").join("photo.PNG")).unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[tokio::test]
    async fn test_save_rejects_executable() {
        let dir = TempDir::new().unwrap();
        let err = policy(&dir).save(&file("script.exe", b"MZ")).await.unwrap_err();
        assert!(matches!(err, UploadError::DisallowedType));
        assert!(err.is_client_error());
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_save_rejects_empty_and_extensionless_names() {
        let dir = TempDir::new().unwrap();
        let p = policy(&dir);
        assert!(matches!(
            p.save(&file("", b"x")).await.unwrap_err(),
            UploadError::EmptyFilename
        ));
        assert!(matches!(
            p.save(&file("png", b"x")).await.unwrap_err(),
            UploadError::DisallowedType
        ));
    }

    #[tokio::test]
    async fn test_save_non_ascii_name() {
        let dir = TempDir::new().unwrap();
        let p = policy(&dir);
        // empty extension after the last dot
        assert!(matches!(
            p.save(&file("日本.", b"x")).await.unwrap_err(),
            UploadError::DisallowedType
        ));

        let stored = p.save(&file("写真 1.png", b"x")).await.unwrap();
        assert_eq!(stored.file_path, "/uploads/1.png");
    }

    #[tokio::test]
    async fn test_save_rejects_name_that_sanitizes_to_nothing() {
        let dir = TempDir::new().unwrap();
        let allowed = vec!["ß".to_string()];
        let p = UploadPolicy::new(dir.path(), "/uploads", &allowed);
        assert!(matches!(
            p.save(&file("._.ß", b"x")).await.unwrap_err(),
            UploadError::InvalidFilename
        ));
    }

    #[tokio::test]
    async fn test_save_strips_traversal() {
        let dir = TempDir::new().unwrap();
        let stored = policy(&dir)
            .save(&file("../../etc/evil.png", b"x"))
            .await
            .unwrap();
        assert_eq!(stored.file_path, "/uploads/etc_evil.png");
        assert!(dir.path().join("uploads").join("etc_evil.png").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let p = policy(&dir);
        p.save(&file("a.gif", b"first")).await.unwrap();
        p.save(&file("a.gif", b"second")).await.unwrap();
        let on_disk = std::fs::read(dir.path().join("uploads").join("a.gif")).unwrap();
        assert_eq!(on_disk, b"second");
    }

    #[test]
    fn test_stored_upload_json_shape() {
        let stored = StoredUpload {
            file_path: "/uploads/a.png".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&stored).unwrap(),
            r#"{"filePath":"/uploads/a.png"}"#
        );
    }
}
