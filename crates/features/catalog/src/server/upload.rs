//! Logo uploads: reading the multipart field, checking it against [`UploadConfig`] and
//! writing it into the `brand` storage namespace.

use axum::extract::Multipart;
use axum::http::StatusCode;
use showroom_domain::config::UploadConfig;
use showroom_domain::constants::BRAND;
use showroom_storage::{NamespacedStorage, Storage, StorageError};
use std::borrow::Cow;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

/// Multipart field carrying the image.
pub const LOGO_FIELD: &str = "logo";

#[showroom_derive::showroom_error]
pub enum UploadError {
    #[error("No file was uploaded{}", format_context(.context))]
    Missing { context: Option<Cow<'static, str>> },

    #[error("Unsupported upload{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Upload exceeds {limit} bytes{}", format_context(.context))]
    TooLarge { limit: usize, context: Option<Cow<'static, str>> },

    #[error("Upload storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

impl UploadError {
    /// Text shown next to the upload form.
    #[must_use]
    pub fn message(&self) -> Cow<'static, str> {
        match self {
            Self::Missing { .. } => "No file was uploaded.".into(),
            Self::Unsupported { .. } => "Only image files are allowed!".into(),
            Self::TooLarge { limit, .. } => {
                format!("File is too large (max {} KB).", limit.div_ceil(1024)).into()
            }
            Self::Storage { .. } => "The file could not be saved, please try again.".into(),
        }
    }
}

/// A file received from the client, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    fn extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Drains `multipart` and returns the `logo` field.
///
/// Stops reading as soon as the field grows past `max_bytes`. Other fields are skipped.
///
/// # Errors
/// [`UploadError::Missing`] when no non-empty `logo` field was sent or the body is not
/// valid multipart, [`UploadError::TooLarge`] past the limit.
pub async fn read_logo(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadedFile, UploadError> {
    let too_large = || UploadError::TooLarge { limit: max_bytes, context: None };

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::Missing { context: None }),
            Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(too_large()),
            Err(err) => {
                warn!(error = %err, "Malformed multipart body");
                return Err(UploadError::Missing { context: Some(err.body_text().into()) });
            }
        };

        if field.name() != Some(LOGO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let mut bytes = Vec::new();

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(too_large());
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    return Err(too_large());
                }
                Err(err) => {
                    warn!(error = %err, "Upload interrupted");
                    return Err(UploadError::Missing { context: Some(err.body_text().into()) });
                }
            }
        }

        if bytes.is_empty() {
            return Err(UploadError::Missing { context: Some("empty file".into()) });
        }

        return Ok(UploadedFile { file_name, content_type, bytes });
    }
}

/// Validates and persists logo images.
#[derive(Debug, Clone)]
pub struct LogoUploader {
    storage: NamespacedStorage,
    rules: UploadConfig,
}

impl LogoUploader {
    /// # Errors
    /// Only if the `brand` namespace cannot be created under `storage`.
    pub fn new(storage: &Storage, rules: UploadConfig) -> Result<Self, StorageError> {
        Ok(Self { storage: storage.namespace(BRAND)?, rules })
    }

    #[must_use]
    pub const fn rules(&self) -> &UploadConfig {
        &self.rules
    }

    fn is_allowed(&self, mime: &str) -> bool {
        self.rules.allowed_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }

    /// Checks `file` and returns the lowercased extension it will be stored under.
    ///
    /// # Errors
    /// See [`UploadError`]; storage is never touched here.
    pub fn check(&self, file: &UploadedFile) -> Result<String, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Missing { context: None });
        }
        if file.bytes.len() > self.rules.max_bytes {
            return Err(UploadError::TooLarge { limit: self.rules.max_bytes, context: None });
        }

        let content_type = file.content_type.as_deref().unwrap_or_default();
        if !self.is_allowed(content_type) {
            return Err(UploadError::Unsupported {
                message: format!("content type '{content_type}'").into(),
                context: None,
            });
        }

        let ext = file.extension().unwrap_or_default();
        match mime_for_extension(&ext) {
            Some(mime) if self.is_allowed(mime) => Ok(ext),
            _ => Err(UploadError::Unsupported {
                message: format!("extension '{ext}'").into(),
                context: None,
            }),
        }
    }

    /// Writes the file as `logo-<unix millis>.<ext>` and returns that name.
    ///
    /// # Errors
    /// Rejections from [`Self::check`] or [`UploadError::Storage`].
    #[instrument(skip_all, fields(size = file.bytes.len()))]
    pub async fn store(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let ext = self.check(file)?;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis());
        let name = format!("logo-{millis}.{ext}");

        self.storage.write(&name, &file.bytes).await.context("Saving logo")?;

        info!(file = %name, "Logo stored");
        debug!(namespace = %self.storage.name(), "Upload namespace");
        Ok(name)
    }

    /// Removes a stored logo nothing refers to. Failures are only logged.
    pub async fn discard(&self, name: &str) {
        if let Err(err) = self.storage.delete(name).await {
            warn!(file = %name, error = %err, "Orphaned logo could not be removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_owned()),
            content_type: Some(content_type.to_owned()),
            bytes: b"\x89PNG\r\n".to_vec(),
        }
    }

    async fn uploader(max_bytes: usize) -> (tempfile::TempDir, LogoUploader) {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::builder().root(tmp.path().join("uploads")).connect().await.unwrap();
        let rules = UploadConfig { max_bytes, ..UploadConfig::default() };
        (tmp, LogoUploader::new(&storage, rules).unwrap())
    }

    #[tokio::test]
    async fn stores_under_timestamped_name() {
        let (tmp, uploader) = uploader(1024).await;

        let name = uploader.store(&png("Acme.PNG", "image/png")).await.unwrap();

        let digits = name.strip_prefix("logo-").and_then(|rest| rest.strip_suffix(".png")).unwrap();
        assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()));
        let written = std::fs::read(tmp.path().join("uploads/brand").join(&name)).unwrap();
        assert_eq!(written, b"\x89PNG\r\n");
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let (_tmp, uploader) = uploader(1024).await;

        let err = uploader.check(&png("notes.txt", "text/plain")).unwrap_err();
        assert_eq!(err.message(), "Only image files are allowed!");

        let err = uploader.check(&png("logo.exe", "image/png")).unwrap_err();
        assert_eq!(err.message(), "Only image files are allowed!");

        let mut file = png("logo.png", "image/png");
        file.content_type = None;
        assert!(matches!(uploader.check(&file), Err(UploadError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_files() {
        let (_tmp, uploader) = uploader(4).await;

        let mut file = png("logo.png", "image/png");
        assert!(uploader.check(&file).unwrap_err().message().starts_with("File is too large"));

        file.bytes.clear();
        assert_eq!(uploader.check(&file).unwrap_err().message(), "No file was uploaded.");
    }

    #[tokio::test]
    async fn jpeg_aliases_share_one_type() {
        let (_tmp, uploader) = uploader(1024).await;
        assert_eq!(uploader.check(&png("a.JPG", "image/jpeg")).unwrap(), "jpg");
        assert_eq!(uploader.check(&png("a.jpeg", "IMAGE/JPEG")).unwrap(), "jpeg");
    }
}
