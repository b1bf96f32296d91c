//! Upload selection and staging.
//!
//! The [`UploadRegistry`] holds the single user-selected file awaiting
//! submission. Selecting a new file always replaces the previous one; the
//! registry never accumulates. Pixel dimensions are decoded asynchronously
//! after selection and are immutable once populated.

mod file;
mod registry;

pub use file::{ImageFormat, UploadId, UploadedFile};
pub use registry::{UploadError, UploadRegistry};
