//! Image upload gating and reference naming.

use std::path::Path;

use chrono::Utc;

use crate::error::DomainError;

/// Multipart field that carries the recipe image.
pub const IMAGE_FIELD: &str = "image";

/// Hard ceiling on an image upload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image received with a create or update request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Accepts or rejects image uploads and names accepted ones.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_bytes: usize,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(MAX_IMAGE_BYTES)
    }
}

impl UploadValidator {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Only `image/*` content types are accepted.
    pub fn check_content_type(&self, content_type: &str) -> Result<(), DomainError> {
        if content_type.trim().to_ascii_lowercase().starts_with("image/") {
            Ok(())
        } else {
            Err(DomainError::UnsupportedMediaType(content_type.to_string()))
        }
    }

    /// Checked while streaming so oversized bodies are dropped early.
    pub fn check_size(&self, len: usize) -> Result<(), DomainError> {
        if len > self.max_bytes {
            Err(DomainError::PayloadTooLarge {
                limit: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a complete upload and return the reference it should be stored under.
    pub fn accept(&self, upload: &ImageUpload) -> Result<String, DomainError> {
        self.check_content_type(&upload.content_type)?;
        self.check_size(upload.bytes.len())?;
        Ok(reference_for(upload.file_name.as_deref()))
    }
}

/// `recipe-<unix millis>-<random>` plus the original extension, if any.
pub fn reference_for(file_name: Option<&str>) -> String {
    let suffix: u32 = rand::random::<u32>() % 1_000_000_000;
    let stem = format!("recipe-{}-{}", Utc::now().timestamp_millis(), suffix);

    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: Some("photo.JPG".to_string()),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn test_accepts_images() {
        let reference = UploadValidator::default()
            .accept(&upload("image/jpeg", 1024))
            .unwrap();
        assert!(reference.starts_with("recipe-"));
        assert!(reference.ends_with(".jpg"));
    }

    #[test]
    fn test_rejects_non_images() {
        let err = UploadValidator::default()
            .accept(&upload("application/pdf", 10))
            .unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_rejects_oversized() {
        let validator = UploadValidator::default();
        assert!(validator.check_size(MAX_IMAGE_BYTES).is_ok());
        let err = validator
            .accept(&upload("image/png", MAX_IMAGE_BYTES + 1))
            .unwrap_err();
        assert!(matches!(err, DomainError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_references_are_unique_and_keep_extension() {
        let a = reference_for(Some("cake.png"));
        let b = reference_for(Some("cake.png"));
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert!(!reference_for(None).contains('.'));
        assert!(!reference_for(Some("../../etc/passwd")).contains('/'));
    }
}
