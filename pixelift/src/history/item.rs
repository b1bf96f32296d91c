//! Frozen history record of one completed upscale.

use crate::upload::ImageFormat;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One completed upscale, as retained in history.
///
/// Created when a job completes and never mutated afterwards; it only
/// ever leaves the set through eviction or an explicit user delete. Only
/// primitive fields and the result URL are persisted, never image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Job ID this record was frozen from.
    pub id: String,
    /// Original source file name.
    pub file_name: String,
    /// Externally hosted result image.
    pub url: String,
    /// Completion time. All retention math keys off this.
    pub timestamp: DateTime<Utc>,
    /// Source payload size.
    pub file_size_bytes: u64,
    /// Scale factor that was applied.
    pub scale: u32,
    /// Source content type.
    pub image_type: ImageFormat,
}

impl HistoryItem {
    /// The instant this record becomes eligible for age-based removal.
    pub fn expires_at(&self, retention_days: u32) -> DateTime<Utc> {
        self.timestamp + Duration::days(i64::from(retention_days))
    }

    /// Whether the record has outlived the retention window at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, retention_days: u32) -> bool {
        now > self.expires_at(retention_days)
    }

    /// Whole days until expiry, negative once expired.
    pub fn days_until_expiry(&self, now: DateTime<Utc>, retention_days: u32) -> i64 {
        (self.expires_at(retention_days) - now).num_days()
    }
}
