//! Wire types and traits for the remote collaborators.

use crate::plan::QualityPreset;
use crate::upload::ImageFormat;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the remote collaborators.
///
/// The queue maps every variant to the same `failed` job transition; the
/// distinctions exist for log and display text only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The collaborator's own deadline elapsed
    #[error("the upscale service timed out")]
    Timeout,

    /// Response body could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The collaborator answered but reported an error
    #[error("service error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// Pixel dimensions as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<Dimensions> for (u32, u32) {
    fn from(d: Dimensions) -> Self {
        (d.width, d.height)
    }
}

/// One upscale invocation.
#[derive(Debug, Clone)]
pub struct UpscaleRequest {
    /// Account the work is billed against.
    pub user_id: String,
    /// Original file name, forwarded for result naming.
    pub file_name: String,
    /// Raw source image payload.
    pub image: Bytes,
    /// Requested scale factor.
    pub scale: u32,
    /// Model family to use.
    pub quality: QualityPreset,
    /// Requested result encoding.
    pub output_format: ImageFormat,
}

/// The collaborator's answer to an upscale invocation.
///
/// `success = false` with an `error` message is a routine outcome, not a
/// transport failure; it becomes a failed job with that message attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upscaled_dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_upscales: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-user usage numbers as reported by the usage collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    /// Upscales consumed in the current period.
    pub upscales_used: u32,
    /// Period quota. `None` means unmetered.
    #[serde(default)]
    pub monthly_limit: Option<u32>,
    /// Upscales left in the current period. `None` means unmetered.
    #[serde(default)]
    pub remaining_upscales: Option<u32>,
}

/// The opaque upscaling computation.
///
/// One call, two outcomes. Implementations own their own timeout; the
/// core imposes none of its own and treats an elapsed deadline like any
/// other error.
#[async_trait]
pub trait UpscaleClient: Send + Sync {
    /// Runs one upscale and returns the collaborator's verdict.
    async fn upscale(&self, request: &UpscaleRequest) -> Result<UpscaleResponse, RemoteError>;

    /// Fetches a result image for dimension probing.
    async fn fetch_image(&self, url: &str) -> Result<Bytes, RemoteError>;
}

/// Usage accounting collaborator.
#[async_trait]
pub trait UsageTracker: Send + Sync {
    /// Records one consumed upscale. Called exactly once per completion.
    async fn increment_upscale_count(&self, user_id: &str) -> Result<(), RemoteError>;

    /// Reads current usage numbers, typically right after an increment.
    async fn usage_stats(&self, user_id: &str) -> Result<UsageStats, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes_wire_shape() {
        let body = r#"{
            "success": true,
            "imageUrl": "https://cdn.example.com/r/42.png",
            "originalDimensions": {"width": 800, "height": 600},
            "upscaledDimensions": {"width": 3200, "height": 2400},
            "remainingUpscales": 17
        }"#;
        let resp: UpscaleResponse = serde_json::from_str(body).unwrap();
        assert!(resp.success);
        assert_eq!(resp.image_url.as_deref(), Some("https://cdn.example.com/r/42.png"));
        assert_eq!(resp.upscaled_dimensions, Some(Dimensions { width: 3200, height: 2400 }));
        assert_eq!(resp.remaining_upscales, Some(17));
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_response_tolerates_minimal_failure_body() {
        let resp: UpscaleResponse =
            serde_json::from_str(r#"{"success": false, "error": "quota exhausted"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("quota exhausted"));
        assert!(resp.image_url.is_none());
    }

    #[test]
    fn test_usage_stats_unmetered() {
        let stats: UsageStats = serde_json::from_str(r#"{"upscalesUsed": 9}"#).unwrap();
        assert_eq!(stats.upscales_used, 9);
        assert_eq!(stats.monthly_limit, None);
        assert_eq!(stats.remaining_upscales, None);
    }

    #[test]
    fn test_dimensions_tuple_round_trip() {
        let dims: Dimensions = (640, 480).into();
        assert_eq!(<(u32, u32)>::from(dims), (640, 480));
    }
}
