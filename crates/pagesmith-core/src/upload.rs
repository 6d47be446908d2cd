//! Image upload contract.
//!
//! The core never stores image bytes in the tree; it asks an [`Uploader`]
//! for a URL and writes only that URL into a block's props.

use crate::storage::BoxFuture;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upload errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("File is empty")]
    EmptyFile,
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Upload failed: {0}")]
    Backend(String),
}

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Where an uploaded file can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}

/// Something that turns file bytes into a URL.
pub trait Uploader: Send + Sync {
    fn upload(&self, data: &[u8], file_name: &str) -> BoxFuture<'_, UploadResult<UploadedFile>>;
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Svg,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    /// Detect format from magic bytes. SVG is text and has none.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }

    /// Magic bytes first, then the file name's extension.
    pub fn detect(data: &[u8], file_name: &str) -> Option<Self> {
        Self::from_magic_bytes(data).or_else(|| {
            file_name
                .rsplit_once('.')
                .and_then(|(_, ext)| Self::from_extension(ext))
        })
    }
}

/// Inlines uploads as base64 `data:` URLs. Needs no server, so it suits
/// offline hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlUploader;

impl DataUrlUploader {
    pub fn new() -> Self {
        Self
    }

    /// Encode synchronously.
    pub fn encode(data: &[u8], file_name: &str) -> UploadResult<UploadedFile> {
        if data.is_empty() {
            return Err(UploadError::EmptyFile);
        }
        let format = ImageFormat::detect(data, file_name)
            .ok_or_else(|| UploadError::UnsupportedFormat(file_name.to_string()))?;
        Ok(UploadedFile {
            url: format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data)),
        })
    }
}

impl Uploader for DataUrlUploader {
    fn upload(&self, data: &[u8], file_name: &str) -> BoxFuture<'_, UploadResult<UploadedFile>> {
        let result = Self::encode(data, file_name);
        Box::pin(async move { result })
    }
}
