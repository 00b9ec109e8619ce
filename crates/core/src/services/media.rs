//! Image uploads: avatars and rich-text editor images.

use std::sync::Arc;

use chrono::Utc;
use inkpost_common::{
    AppError, AppResult, IdGenerator, StorageBackend, StoredFile, dated_storage_key,
};
use serde::Serialize;

/// Largest accepted avatar, in bytes.
pub const MAX_AVATAR_SIZE: usize = 2 * 1024 * 1024;

/// Largest accepted editor image, in bytes.
pub const MAX_EDITOR_IMAGE_SIZE: usize = 5 * 1024 * 1024;

const AVATAR_PREFIX: &str = "avatars";
const EDITOR_IMAGE_PREFIX: &str = "uploads/images";

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// GIF format
    Gif,
    /// WebP format
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    /// Get file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detect format from the file's magic bytes.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }
}

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side file name
    pub file_name: Option<String>,
    /// Declared content type
    pub content_type: Option<String>,
    /// File contents
    pub data: Vec<u8>,
}

impl Upload {
    fn extension(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
    }
}

/// Response payload the rich-text editor expects.
#[derive(Debug, Clone, Serialize)]
pub struct EditorImage {
    pub url: String,
    pub alt: String,
    pub href: String,
}

/// Media service.
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate and store an avatar.
    ///
    /// The declared content type must be an accepted image type and the
    /// bytes must actually be one. The stored extension follows the bytes.
    pub async fn store_avatar(&self, upload: &Upload) -> AppResult<StoredFile> {
        let declared = upload
            .content_type
            .as_deref()
            .and_then(ImageFormat::from_mime_type)
            .ok_or_else(|| {
                AppError::UnsupportedMediaType(
                    "only jpg, png, gif and webp images are allowed".to_string(),
                )
            })?;

        if upload.data.len() > MAX_AVATAR_SIZE {
            return Err(AppError::PayloadTooLarge(
                "avatar must not exceed 2MB".to_string(),
            ));
        }

        let format = ImageFormat::sniff(&upload.data).ok_or_else(|| {
            AppError::UnsupportedMediaType("please upload a valid image file".to_string())
        })?;
        if format != declared {
            tracing::debug!(
                declared = declared.mime_type(),
                actual = format.mime_type(),
                "Avatar content type does not match its bytes"
            );
        }

        self.store(AVATAR_PREFIX, format, &upload.data).await
    }

    /// Validate and store an image pasted into the editor.
    pub async fn store_editor_image(&self, upload: &Upload) -> AppResult<EditorImage> {
        let format = upload
            .extension()
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| {
                AppError::UnsupportedMediaType(
                    "only jpg, jpeg, png, gif and webp images are allowed".to_string(),
                )
            })?;

        if upload.data.len() > MAX_EDITOR_IMAGE_SIZE {
            return Err(AppError::PayloadTooLarge(
                "image must not exceed 5MB".to_string(),
            ));
        }

        if ImageFormat::sniff(&upload.data).is_none() {
            return Err(AppError::UnsupportedMediaType(
                "please upload a valid image file".to_string(),
            ));
        }

        let stored = self.store(EDITOR_IMAGE_PREFIX, format, &upload.data).await?;
        let alt = upload.file_name.clone().unwrap_or_default();

        Ok(EditorImage {
            href: stored.url.clone(),
            url: stored.url,
            alt,
        })
    }

    /// Delete a stored file.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.storage.delete(key).await
    }

    /// Public URL for a storage key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }

    async fn store(&self, prefix: &str, format: ImageFormat, data: &[u8]) -> AppResult<StoredFile> {
        let key = dated_storage_key(
            prefix,
            Utc::now(),
            &self.id_gen.generate_file_stem(),
            format.extension(),
        );
        let stored = self.storage.upload(&key, data).await?;
        tracing::debug!(key = %stored.key, size = stored.size, "Image stored");
        Ok(stored)
    }
}
