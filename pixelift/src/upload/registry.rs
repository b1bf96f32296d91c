//! Single-slot registry for the staged upload.

use super::file::{UploadId, UploadedFile};
use bytes::Bytes;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised while staging or inspecting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Neither magic bytes nor extension identify a supported format
    #[error("unsupported image format for '{0}'")]
    UnsupportedFormat(String),

    /// Payload could not be decoded as an image
    #[error("failed to decode image: {0}")]
    DecodeFailed(String),

    /// No file is currently staged
    #[error("no file is currently selected")]
    NoSelection,
}

/// Holds the one file the user has selected for upscaling.
///
/// Selecting a new file replaces the previous one outright; there is no
/// merging and no multi-file staging. Snapshots returned by [`current`]
/// share the underlying payload, so they are cheap to hand out.
///
/// [`current`]: UploadRegistry::current
#[derive(Debug, Default)]
pub struct UploadRegistry {
    slot: Mutex<Option<UploadedFile>>,
}

impl UploadRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a new file, replacing any previous selection.
    pub fn select(
        &self,
        file_name: impl Into<String>,
        bytes: Bytes,
    ) -> Result<UploadId, UploadError> {
        let file_name = file_name.into();
        let file = UploadedFile::new(file_name.clone(), bytes)
            .ok_or(UploadError::UnsupportedFormat(file_name))?;
        let id = file.id.clone();

        let mut slot = self.slot.lock().unwrap();
        if let Some(previous) = slot.replace(file) {
            tracing::debug!(
                replaced = %previous.id,
                selected = %id,
                "upload selection replaced"
            );
        } else {
            tracing::debug!(selected = %id, "upload selected");
        }
        Ok(id)
    }

    /// Returns a snapshot of the current selection, if any.
    pub fn current(&self) -> Option<UploadedFile> {
        self.slot.lock().unwrap().clone()
    }

    /// Drops the current selection.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap();
        if slot.take().is_some() {
            tracing::debug!("upload selection cleared");
        }
    }

    /// Decodes and records the staged image's pixel dimensions.
    ///
    /// Decoding runs on the blocking pool. The dimensions are written back
    /// only if the same selection is still staged and has not been
    /// populated in the meantime; once set they never change. Returns the
    /// dimensions that ended up recorded for the selection.
    pub async fn probe_dimensions(&self) -> Result<(u32, u32), UploadError> {
        let (id, bytes) = {
            let slot = self.slot.lock().unwrap();
            let file = slot.as_ref().ok_or(UploadError::NoSelection)?;
            if let Some(dims) = file.dimensions {
                return Ok(dims);
            }
            (file.id.clone(), file.bytes.clone())
        };

        let decoded = tokio::task::spawn_blocking(move || decode_dimensions(&bytes))
            .await
            .map_err(|e| UploadError::DecodeFailed(e.to_string()))??;

        let mut slot = self.slot.lock().unwrap();
        match slot.as_mut() {
            Some(file) if file.id == id => {
                let dims = *file.dimensions.get_or_insert(decoded);
                tracing::debug!(
                    upload = %id,
                    width = dims.0,
                    height = dims.1,
                    "upload dimensions recorded"
                );
                Ok(dims)
            }
            // Selection changed while decoding; report what we decoded
            // without touching the new selection.
            _ => Ok(decoded),
        }
    }
}

fn decode_dimensions(bytes: &Bytes) -> Result<(u32, u32), UploadError> {
    use image::GenericImageView;

    let img = image::load_from_memory(bytes).map_err(|e| UploadError::DecodeFailed(e.to_string()))?;
    Ok(img.dimensions())
}
