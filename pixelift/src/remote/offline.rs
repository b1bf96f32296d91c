//! In-process collaborator for demos and tests.

use super::types::{
    RemoteError, UpscaleClient, UpscaleRequest, UpscaleResponse, UsageStats, UsageTracker,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Canned upscale collaborator that never leaves the process.
///
/// Answers every request successfully after a fixed delay, hands out
/// `offline://` result URLs, and keeps usage counts in memory. Result
/// URLs are not fetchable, which pushes callers through their
/// source-times-scale dimension fallback. Useful for exercising the full
/// job lifecycle without the real service.
#[derive(Debug)]
pub struct OfflineUpscaleClient {
    delay: Duration,
    fail_with: Option<String>,
    monthly_limit: Option<u32>,
    used: AtomicU32,
}

impl OfflineUpscaleClient {
    /// Creates a client that succeeds after a short delay.
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(1200),
            fail_with: None,
            monthly_limit: Some(50),
            used: AtomicU32::new(0),
        }
    }

    /// Overrides the simulated processing delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every upscale call report failure with this message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Overrides the simulated monthly quota.
    pub fn with_monthly_limit(mut self, limit: Option<u32>) -> Self {
        self.monthly_limit = limit;
        self
    }

    fn stats(&self) -> UsageStats {
        let used = self.used.load(Ordering::Relaxed);
        UsageStats {
            upscales_used: used,
            monthly_limit: self.monthly_limit,
            remaining_upscales: self.monthly_limit.map(|l| l.saturating_sub(used)),
        }
    }
}

impl Default for OfflineUpscaleClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpscaleClient for OfflineUpscaleClient {
    async fn upscale(&self, request: &UpscaleRequest) -> Result<UpscaleResponse, RemoteError> {
        tokio::time::sleep(self.delay).await;

        if let Some(message) = &self.fail_with {
            return Ok(UpscaleResponse {
                success: false,
                error: Some(message.clone()),
                ..Default::default()
            });
        }

        let stem = request
            .file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&request.file_name);
        let url = format!(
            "offline://results/{}_x{}.{}",
            stem,
            request.scale,
            request.output_format.extension()
        );

        Ok(UpscaleResponse {
            success: true,
            image_url: Some(url),
            remaining_upscales: self.stats().remaining_upscales,
            ..Default::default()
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, RemoteError> {
        Err(RemoteError::Http(format!(
            "offline results are not fetchable: {}",
            url
        )))
    }
}

#[async_trait]
impl UsageTracker for OfflineUpscaleClient {
    async fn increment_upscale_count(&self, _user_id: &str) -> Result<(), RemoteError> {
        self.used.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn usage_stats(&self, _user_id: &str) -> Result<UsageStats, RemoteError> {
        Ok(self.stats())
    }
}
