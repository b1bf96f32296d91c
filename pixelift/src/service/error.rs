//! Service error types.

use crate::config::ConfigFileError;
use crate::history::HistoryError;
use crate::queue::{CancelError, SubmitError};
use crate::remote::RemoteError;
use crate::upload::UploadError;
use crate::validator::ValidationError;
use thiserror::Error;

/// Errors that can occur during service operations.
///
/// Validation refusals and queue refusals surface here unchanged, so a
/// front end can match on the concrete reason.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No file is staged for upscaling
    #[error("no file is currently selected")]
    NoUpload,

    /// The staged file's pixel dimensions could not be determined
    #[error("image dimensions are not known yet")]
    DimensionsUnknown,

    /// The request failed validation
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// The request is only processable as tiles, which this service
    /// does not execute
    #[error("image is too large for a single pass ({segments} tiles would be needed)")]
    SegmentationUnsupported { segments: u32 },

    /// Staging the upload failed
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The queue refused the submission
    #[error(transparent)]
    Queue(#[from] SubmitError),

    /// The cancellation was not possible
    #[error(transparent)]
    Cancel(#[from] CancelError),

    /// A history operation failed
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A remote call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigFileError),
}
