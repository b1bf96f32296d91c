//! Scripted collaborator for unit tests.

use super::types::{
    RemoteError, UpscaleClient, UpscaleRequest, UpscaleResponse, UsageStats, UsageTracker,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Test double for both collaborator traits.
///
/// Responses are scripted in FIFO order; when the script is empty a
/// generic success is produced. With [`MockRemote::hold`], each upscale
/// call blocks until the test releases it, which makes races between
/// cancellation and resolution deterministic.
#[derive(Default)]
pub(crate) struct MockRemote {
    responses: Mutex<VecDeque<Result<UpscaleResponse, RemoteError>>>,
    fetches: Mutex<VecDeque<Result<Bytes, RemoteError>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    upscale_calls: AtomicU32,
    increments: AtomicU32,
}

impl MockRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful response with the given result URL.
    pub(crate) fn push_success(&self, url: &str) {
        self.responses.lock().unwrap().push_back(Ok(UpscaleResponse {
            success: true,
            image_url: Some(url.to_string()),
            ..Default::default()
        }));
    }

    /// Scripts a full response.
    pub(crate) fn push_response(&self, response: UpscaleResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Scripts a `success = false` response with an error message.
    pub(crate) fn push_failure(&self, message: &str) {
        self.responses.lock().unwrap().push_back(Ok(UpscaleResponse {
            success: false,
            error: Some(message.to_string()),
            ..Default::default()
        }));
    }

    /// Scripts a transport-level error.
    pub(crate) fn push_error(&self, error: RemoteError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Scripts the next `fetch_image` outcome.
    pub(crate) fn push_fetch(&self, outcome: Result<Bytes, RemoteError>) {
        self.fetches.lock().unwrap().push_back(outcome);
    }

    /// Makes every upscale call wait for one `notify_one` on the
    /// returned handle before answering.
    pub(crate) fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub(crate) fn upscale_calls(&self) -> u32 {
        self.upscale_calls.load(Ordering::Relaxed)
    }

    pub(crate) fn increments(&self) -> u32 {
        self.increments.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UpscaleClient for MockRemote {
    async fn upscale(&self, _request: &UpscaleRequest) -> Result<UpscaleResponse, RemoteError> {
        self.upscale_calls.fetch_add(1, Ordering::Relaxed);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok(UpscaleResponse {
                success: true,
                image_url: Some("mock://results/out.png".to_string()),
                ..Default::default()
            }),
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, RemoteError> {
        let scripted = self.fetches.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Err(RemoteError::Http(format!("no scripted fetch for {}", url)))
        })
    }
}

#[async_trait]
impl UsageTracker for MockRemote {
    async fn increment_upscale_count(&self, _user_id: &str) -> Result<(), RemoteError> {
        self.increments.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn usage_stats(&self, _user_id: &str) -> Result<UsageStats, RemoteError> {
        let used = self.increments.load(Ordering::Relaxed);
        Ok(UsageStats {
            upscales_used: used,
            monthly_limit: Some(50),
            remaining_upscales: Some(50u32.saturating_sub(used)),
        })
    }
}
