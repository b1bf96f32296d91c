//! Uploaded file value type and image format detection.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique upload IDs.
static UPLOAD_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a staged upload.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct UploadId(String);

impl UploadId {
    /// Creates a unique auto-generated upload ID.
    ///
    /// The format is `upload-{counter}` where counter is monotonically
    /// increasing for the lifetime of the process.
    pub fn auto() -> Self {
        let counter = UPLOAD_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("upload-{}", counter))
    }

    /// Returns the string value of this upload ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadId({})", self.0)
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raster image container format.
///
/// Used both for the content type of uploaded sources and for the
/// requested output encoding of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Detects the format from the leading magic bytes of the payload.
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }
        None
    }

    /// Detects the format from a file name's extension.
    pub fn from_extension(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// MIME type string for HTTP payloads.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A user-selected file staged for upscaling.
///
/// Owned exclusively by the [`super::UploadRegistry`]. The raw payload is
/// reference-counted, so cloning a snapshot of this struct is cheap.
/// `dimensions` starts empty and is populated at most once, after the
/// payload has been decoded.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Unique ID for this selection.
    pub id: UploadId,
    /// Original file name as selected by the user.
    pub file_name: String,
    /// Detected container format.
    pub format: ImageFormat,
    /// Opaque handle a preview layer can use to address this selection.
    pub preview_uri: String,
    /// Raw image payload.
    pub bytes: Bytes,
    /// Pixel dimensions, populated once decoding succeeds.
    pub dimensions: Option<(u32, u32)>,
}

impl UploadedFile {
    /// Stages a new upload, detecting the image format.
    ///
    /// Format detection prefers magic bytes and falls back to the file
    /// extension. Returns `None` when neither identifies a supported
    /// format.
    pub fn new(file_name: impl Into<String>, bytes: Bytes) -> Option<Self> {
        let file_name = file_name.into();
        let format = ImageFormat::from_magic_bytes(&bytes)
            .or_else(|| ImageFormat::from_extension(&file_name))?;
        let id = UploadId::auto();
        let preview_uri = format!("preview://{}", id);
        Some(Self {
            id,
            file_name,
            format,
            preview_uri,
            bytes,
            dimensions: None,
        })
    }

    /// Payload size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_upload_ids_are_unique() {
        let a = UploadId::auto();
        let b = UploadId::auto();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("upload-"));
    }

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("photo.JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("art.webp"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_extension("notes.txt"), None);
        assert_eq!(ImageFormat::from_extension("no_extension"), None);
    }

    #[test]
    fn test_new_prefers_magic_bytes_over_extension() {
        // PNG payload with a misleading .jpg name
        let file = UploadedFile::new("mislabeled.jpg", Bytes::from_static(PNG_MAGIC)).unwrap();
        assert_eq!(file.format, ImageFormat::Png);
    }

    #[test]
    fn test_new_falls_back_to_extension() {
        let file = UploadedFile::new("tiny.png", Bytes::from_static(b"xx")).unwrap();
        assert_eq!(file.format, ImageFormat::Png);
    }

    #[test]
    fn test_new_rejects_unsupported_format() {
        assert!(UploadedFile::new("clip.gif", Bytes::from_static(b"GIF89a")).is_none());
    }

    #[test]
    fn test_size_and_preview_uri() {
        let file = UploadedFile::new("a.png", Bytes::from_static(PNG_MAGIC)).unwrap();
        assert_eq!(file.size_bytes(), PNG_MAGIC.len() as u64);
        assert!(file.preview_uri.starts_with("preview://upload-"));
        assert!(file.dimensions.is_none());
    }
}
