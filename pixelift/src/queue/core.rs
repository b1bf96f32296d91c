//! Single-flight job queue.
//!
//! One job processes at a time; submissions beyond the active job wait in
//! FIFO order. Each dispatched job gets a driver task that simulates
//! progress ticks while the remote call is in flight, then applies the
//! terminal transition and its side effects. Side effects key off the
//! guarded state machine in [`UpscaleJob`], so a completion racing a user
//! cancel resolves to exactly one of the two, never both.

use super::handle::JobHandle;
use super::job::{JobId, JobRequest, JobStatus, UpscaleJob, CANCELLED_REASON};
use super::progress::{initial_eta_seconds, progress_step, QueueSettings};
use crate::events::{CoreEvent, EventSink};
use crate::history::{HistoryCache, HistoryItem};
use crate::remote::{UpscaleClient, UpscaleRequest, UpscaleResponse, UsageTracker};
use bytes::Bytes;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors from job submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The pending queue is at capacity
    #[error("queue is full ({depth} jobs waiting)")]
    QueueFull { depth: usize },
}

/// Errors from job cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelError {
    /// No job with this ID was ever submitted
    #[error("unknown job: {0}")]
    UnknownJob(JobId),

    /// Only the actively processing job can be cancelled
    #[error("job {job_id} is not processing (status: {status})")]
    NotProcessing { job_id: JobId, status: JobStatus },
}

#[derive(Default)]
struct QueueState {
    jobs: HashMap<JobId, UpscaleJob>,
    pending: VecDeque<JobId>,
    active: Option<JobId>,
    status_txs: HashMap<JobId, watch::Sender<JobStatus>>,
    cancel_tokens: HashMap<JobId, CancellationToken>,
}

struct QueueInner {
    remote: Arc<dyn UpscaleClient>,
    usage: Arc<dyn UsageTracker>,
    history: Arc<HistoryCache>,
    sink: Arc<dyn EventSink>,
    settings: QueueSettings,
    user_id: String,
    state: Mutex<QueueState>,
}

/// Single-flight upscale queue.
///
/// Cloning is cheap; all clones share the same queue.
#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<QueueInner>,
}

impl JobQueue {
    /// Creates a queue over the given collaborators.
    pub fn new(
        remote: Arc<dyn UpscaleClient>,
        usage: Arc<dyn UsageTracker>,
        history: Arc<HistoryCache>,
        sink: Arc<dyn EventSink>,
        settings: QueueSettings,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                remote,
                usage,
                history,
                sink,
                settings,
                user_id: user_id.into(),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// The tunables this queue was built with.
    pub fn settings(&self) -> &QueueSettings {
        &self.inner.settings
    }

    /// Number of jobs waiting behind the active one.
    pub fn queue_depth(&self) -> usize {
        self.inner.state.lock().unwrap().pending.len()
    }

    /// Whether a job is currently processing.
    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().unwrap().active.is_some()
    }

    /// Snapshot of the actively processing job, if any.
    pub fn current(&self) -> Option<UpscaleJob> {
        let state = self.inner.state.lock().unwrap();
        state
            .active
            .as_ref()
            .and_then(|id| state.jobs.get(id))
            .cloned()
    }

    /// Snapshot of any job submitted this session.
    pub fn job(&self, job_id: &JobId) -> Option<UpscaleJob> {
        self.inner.state.lock().unwrap().jobs.get(job_id).cloned()
    }

    /// Enqueues a job and returns a handle for watching it.
    ///
    /// The job starts immediately when the queue is idle, otherwise it
    /// waits its turn in FIFO order.
    pub fn submit(&self, request: JobRequest) -> Result<JobHandle, SubmitError> {
        let file_name = request.file_name.clone();
        let scale = request.scale;
        let job = UpscaleJob::new(request);
        let job_id = job.id().clone();

        let handle = {
            let mut state = self.inner.state.lock().unwrap();
            if state.pending.len() >= self.inner.settings.max_depth {
                return Err(SubmitError::QueueFull {
                    depth: state.pending.len(),
                });
            }

            let (status_tx, status_rx) = watch::channel(JobStatus::Pending);
            state.status_txs.insert(job_id.clone(), status_tx);
            state
                .cancel_tokens
                .insert(job_id.clone(), CancellationToken::new());
            state.pending.push_back(job_id.clone());
            state.jobs.insert(job_id.clone(), job);
            JobHandle::new(job_id.clone(), status_rx)
        };

        debug!(job_id = %job_id, file = %file_name, scale = scale, "Job enqueued");
        self.inner.sink.emit(CoreEvent::JobSubmitted {
            job_id,
            file_name,
            scale,
        });
        self.dispatch_next();
        Ok(handle)
    }

    /// Cancels the actively processing job.
    ///
    /// Pending jobs cannot be cancelled, and cancelling a job that has
    /// already finished is a harmless no-op, so a cancel arriving just
    /// after completion does not surface an error.
    pub fn cancel(&self, job_id: &JobId) -> Result<(), CancelError> {
        let cancelled = {
            let mut state = self.inner.state.lock().unwrap();
            let Some(job) = state.jobs.get_mut(job_id) else {
                return Err(CancelError::UnknownJob(job_id.clone()));
            };

            match job.status() {
                JobStatus::Pending => {
                    return Err(CancelError::NotProcessing {
                        job_id: job_id.clone(),
                        status: JobStatus::Pending,
                    });
                }
                status if status.is_terminal() => false,
                _ => {
                    if job.fail(CANCELLED_REASON, Utc::now()) {
                        if let Some(tx) = state.status_txs.get(job_id) {
                            let _ = tx.send(JobStatus::Failed);
                        }
                        if let Some(token) = state.cancel_tokens.get(job_id) {
                            token.cancel();
                        }
                        true
                    } else {
                        false
                    }
                }
            }
        };

        if cancelled {
            info!(job_id = %job_id, "Job cancelled by user");
            self.inner
                .sink
                .emit(CoreEvent::JobCancelled {
                    job_id: job_id.clone(),
                });
        }
        Ok(())
    }

    /// Starts the next pending job if nothing is active.
    fn dispatch_next(&self) {
        let dispatch = {
            let mut state = self.inner.state.lock().unwrap();
            if state.active.is_some() {
                None
            } else {
                loop {
                    match state.pending.pop_front() {
                        Some(id) => {
                            let startable = state
                                .jobs
                                .get(&id)
                                .is_some_and(|job| job.status() == JobStatus::Pending);
                            if startable {
                                state.active = Some(id.clone());
                                let token = state
                                    .cancel_tokens
                                    .get(&id)
                                    .cloned()
                                    .unwrap_or_default();
                                break Some((id, token));
                            }
                        }
                        None => break None,
                    }
                }
            }
        };

        if let Some((job_id, token)) = dispatch {
            let queue = self.clone();
            tokio::spawn(async move {
                queue.drive(job_id, token).await;
            });
        }
    }

    /// Runs one job to its terminal state.
    async fn drive(self, job_id: JobId, cancel: CancellationToken) {
        let inputs = {
            let mut state = self.inner.state.lock().unwrap();
            match state.jobs.get_mut(&job_id) {
                Some(job) => {
                    let eta =
                        initial_eta_seconds(job.size_bytes(), job.scale(), &self.inner.settings);
                    if job.begin_processing(eta) {
                        let request = UpscaleRequest {
                            user_id: self.inner.user_id.clone(),
                            file_name: job.file_name().to_string(),
                            image: job.source_bytes.clone(),
                            scale: job.scale(),
                            quality: job.quality(),
                            output_format: job.output_format(),
                        };
                        let source_dimensions = job.source_dimensions();
                        if let Some(tx) = state.status_txs.get(&job_id) {
                            let _ = tx.send(JobStatus::Processing);
                        }
                        Some((request, eta, source_dimensions))
                    } else {
                        None
                    }
                }
                None => None,
            }
        };

        let Some((request, eta, source_dimensions)) = inputs else {
            self.finish_active(&job_id);
            return;
        };

        info!(job_id = %job_id, file = %request.file_name, scale = request.scale, "Job started");
        self.inner.sink.emit(CoreEvent::JobStarted {
            job_id: job_id.clone(),
            eta_seconds: eta,
        });
        self.spawn_ticker(job_id.clone(), cancel.clone());

        let outcome = tokio::select! {
            biased;

            _ = cancel.cancelled() => None,

            result = self.inner.remote.upscale(&request) => Some(result),
        };

        match outcome {
            None => {
                // User cancel already applied the terminal transition.
                debug!(job_id = %job_id, "Remote call abandoned after cancellation");
            }
            Some(Ok(response)) if response.success => {
                self.finish_success(&job_id, response, source_dimensions, request.scale)
                    .await;
            }
            Some(Ok(response)) => {
                let reason = response
                    .error
                    .unwrap_or_else(|| "upscale failed".to_string());
                self.finish_failure(&job_id, reason);
            }
            Some(Err(e)) => {
                self.finish_failure(&job_id, e.to_string());
            }
        }

        cancel.cancel();
        self.finish_active(&job_id);
    }

    /// Animates progress until the job leaves the processing state.
    fn spawn_ticker(&self, job_id: JobId, token: CancellationToken) {
        let queue = self.clone();
        let tick = Duration::from_millis(self.inner.settings.progress_tick_ms.max(10));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // Skip the first immediate tick
            interval.tick().await;

            let mut tick_no: u64 = 0;
            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = interval.tick() => {
                        tick_no += 1;
                        if !queue.tick_progress(&job_id, tick_no) {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Applies one progress tick. Returns false once the job is no
    /// longer processing.
    fn tick_progress(&self, job_id: &JobId, tick_no: u64) -> bool {
        let update = {
            let mut state = self.inner.state.lock().unwrap();
            let Some(job) = state.jobs.get_mut(job_id) else {
                return false;
            };
            if !job.advance_progress(progress_step(tick_no), self.inner.settings.progress_tick_ms)
            {
                return false;
            }
            (job.progress(), job.eta_seconds().unwrap_or(0), job.phase())
        };

        let (progress, eta_seconds, phase) = update;
        self.inner.sink.emit(CoreEvent::JobProgress {
            job_id: job_id.clone(),
            progress,
            eta_seconds,
            phase,
        });
        true
    }

    /// Applies the completed transition and its side effects.
    async fn finish_success(
        &self,
        job_id: &JobId,
        response: UpscaleResponse,
        source_dimensions: (u32, u32),
        scale: u32,
    ) {
        let Some(result_url) = response.image_url.clone() else {
            self.finish_failure(job_id, "service returned no image URL".to_string());
            return;
        };

        let dimensions = self
            .resolve_result_dimensions(&response, source_dimensions, scale)
            .await;

        let now = Utc::now();
        let record = {
            let mut state = self.inner.state.lock().unwrap();
            let Some(job) = state.jobs.get_mut(job_id) else {
                return;
            };
            if !job.complete(result_url.clone(), dimensions, now) {
                // Lost the race against a cancel; its side effects won.
                return;
            }
            let record = HistoryItem {
                // The job id disambiguates completions within one millisecond.
                id: format!("hist-{}-{}", now.timestamp_millis(), job_id),
                file_name: job.file_name().to_string(),
                url: result_url.clone(),
                timestamp: now,
                file_size_bytes: job.size_bytes(),
                scale: job.scale(),
                image_type: job.output_format(),
            };
            if let Some(tx) = state.status_txs.get(job_id) {
                let _ = tx.send(JobStatus::Completed);
            }
            record
        };

        info!(job_id = %job_id, url = %result_url, "Job completed");
        self.inner.sink.emit(CoreEvent::JobCompleted {
            job_id: job_id.clone(),
            result_url,
        });

        if let Err(e) = self.inner.history.append(record).await {
            warn!(job_id = %job_id, error = %e, "Failed to record history entry");
        }

        match self
            .inner
            .usage
            .increment_upscale_count(&self.inner.user_id)
            .await
        {
            Ok(()) => match self.inner.usage.usage_stats(&self.inner.user_id).await {
                Ok(stats) => {
                    self.inner.sink.emit(CoreEvent::UsageUpdated {
                        used: stats.upscales_used,
                        remaining: stats.remaining_upscales,
                    });
                }
                Err(e) => {
                    debug!(error = %e, "Usage refresh failed after increment");
                }
            },
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Usage increment failed");
            }
        }

        // Rate-limited by the cache, so most attempts are no-ops.
        match self.inner.history.run_cleanup().await {
            Ok(report) if report.ran => {
                debug!(
                    expired = report.expired,
                    evicted = report.evicted,
                    "Post-completion cleanup pass finished"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Post-completion cleanup failed");
            }
        }
    }

    /// Applies the failed transition unless the job already finished.
    fn finish_failure(&self, job_id: &JobId, reason: String) {
        let failed = {
            let mut state = self.inner.state.lock().unwrap();
            let Some(job) = state.jobs.get_mut(job_id) else {
                return;
            };
            if job.fail(reason.clone(), Utc::now()) {
                if let Some(tx) = state.status_txs.get(job_id) {
                    let _ = tx.send(JobStatus::Failed);
                }
                true
            } else {
                false
            }
        };

        if failed {
            info!(job_id = %job_id, error = %reason, "Job failed");
            self.inner.sink.emit(CoreEvent::JobFailed {
                job_id: job_id.clone(),
                error: reason,
            });
        }
    }

    /// Releases the active slot and starts the next pending job.
    fn finish_active(&self, job_id: &JobId) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.active.as_ref() == Some(job_id) {
                state.active = None;
            }
            state.status_txs.remove(job_id);
            state.cancel_tokens.remove(job_id);
        }
        self.dispatch_next();
    }

    /// Resolves the result's pixel dimensions.
    ///
    /// Tries the response first, then a decode of the fetched result,
    /// and finally falls back to source times scale. Always yields an
    /// answer; probe failures only cost accuracy.
    async fn resolve_result_dimensions(
        &self,
        response: &UpscaleResponse,
        source: (u32, u32),
        scale: u32,
    ) -> (u32, u32) {
        if let Some(dims) = response.upscaled_dimensions {
            return dims.into();
        }

        if let Some(url) = response.image_url.as_deref() {
            match self.inner.remote.fetch_image(url).await {
                Ok(bytes) => match probe_dimensions(bytes).await {
                    Some(dims) => return dims,
                    None => {
                        debug!(url = url, "Result image could not be decoded for size probing")
                    }
                },
                Err(e) => {
                    debug!(url = url, error = %e, "Result image could not be fetched for size probing")
                }
            }
        }

        (
            source.0.saturating_mul(scale),
            source.1.saturating_mul(scale),
        )
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("settings", &self.inner.settings)
            .field("user_id", &self.inner.user_id)
            .finish()
    }
}

/// Decodes image bytes off the async runtime to read their dimensions.
async fn probe_dimensions(bytes: Bytes) -> Option<(u32, u32)> {
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).ok().map(|img| {
            use image::GenericImageView;
            img.dimensions()
        })
    })
    .await
    .ok()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullEventSink;
    use crate::history::{HistorySettings, MemoryStateStore};
    use crate::plan::QualityPreset;
    use crate::remote::{MockRemote, RemoteError};
    use crate::upload::ImageFormat;
    use std::sync::Mutex as StdMutex;

    struct CollectingSink {
        events: StdMutex<Vec<CoreEvent>>,
    }

    impl CollectingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: StdMutex::new(Vec::new()),
            })
        }

        fn count(&self, event_type: &str) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.event_type() == event_type)
                .count()
        }

        fn progress_values(&self) -> Vec<u8> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    CoreEvent::JobProgress { progress, .. } => Some(*progress),
                    _ => None,
                })
                .collect()
        }
    }

    impl EventSink for CollectingSink {
        fn emit(&self, event: CoreEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn request(name: &str) -> JobRequest {
        JobRequest {
            file_name: name.to_string(),
            image: Bytes::from(vec![0u8; 2048]),
            dimensions: (800, 600),
            scale: 4,
            quality: QualityPreset::Photo,
            output_format: ImageFormat::Png,
        }
    }

    fn tiny_png(width: u32, height: u32) -> Bytes {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    async fn queue_with(
        mock: Arc<MockRemote>,
        sink: Arc<dyn EventSink>,
        settings: QueueSettings,
    ) -> JobQueue {
        let history = Arc::new(
            HistoryCache::load(
                Arc::new(MemoryStateStore::new()),
                sink.clone(),
                HistorySettings::default(),
            )
            .await
            .unwrap(),
        );
        JobQueue::new(
            mock.clone(),
            mock,
            history,
            sink,
            settings,
            "user-test",
        )
    }

    fn fast_settings() -> QueueSettings {
        QueueSettings {
            progress_tick_ms: 20,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_and_complete() {
        let mock = Arc::new(MockRemote::new());
        mock.push_success("https://cdn.example.com/result.png");
        let sink = CollectingSink::new();
        let queue = queue_with(mock.clone(), sink.clone(), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        let status = handle.wait().await;

        assert_eq!(status, JobStatus::Completed);
        let job = queue.job(handle.id()).unwrap();
        assert_eq!(job.progress(), 100);
        assert_eq!(job.result_url(), Some("https://cdn.example.com/result.png"));
        assert_eq!(mock.upscale_calls(), 1);
        assert_eq!(mock.increments(), 1);
        assert_eq!(sink.count("job_completed"), 1);
        assert_eq!(sink.count("usage_updated"), 1);
        assert_eq!(sink.count("history_changed"), 1);
    }

    #[tokio::test]
    async fn test_single_flight_fifo() {
        let mock = Arc::new(MockRemote::new());
        let gate = mock.hold();
        let queue = queue_with(
            mock.clone(),
            Arc::new(NullEventSink),
            fast_settings(),
        )
        .await;

        let mut first = queue.submit(request("first.png")).unwrap();
        let mut second = queue.submit(request("second.png")).unwrap();
        let third = queue.submit(request("third.png")).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(first.status(), JobStatus::Processing);
        assert_eq!(second.status(), JobStatus::Pending);
        assert_eq!(third.status(), JobStatus::Pending);
        assert_eq!(queue.queue_depth(), 2);
        assert_eq!(
            queue.current().map(|job| job.file_name().to_string()),
            Some("first.png".to_string())
        );

        gate.notify_one();
        assert_eq!(first.wait().await, JobStatus::Completed);

        // Second starts only after first resolved.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(second.status(), JobStatus::Processing);
        assert_eq!(queue.queue_depth(), 1);

        gate.notify_one();
        assert_eq!(second.wait().await, JobStatus::Completed);
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.upscale_calls(), 3);
    }

    #[tokio::test]
    async fn test_submit_fails_when_queue_full() {
        let mock = Arc::new(MockRemote::new());
        let gate = mock.hold();
        let settings = QueueSettings {
            max_depth: 1,
            ..fast_settings()
        };
        let queue = queue_with(mock.clone(), Arc::new(NullEventSink), settings).await;

        let _active = queue.submit(request("active.png")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _waiting = queue.submit(request("waiting.png")).unwrap();

        let err = queue.submit(request("overflow.png")).unwrap_err();
        assert_eq!(err, SubmitError::QueueFull { depth: 1 });

        gate.notify_one();
        gate.notify_one();
    }

    #[tokio::test]
    async fn test_cancel_processing_job() {
        let mock = Arc::new(MockRemote::new());
        let gate = mock.hold();
        let sink = CollectingSink::new();
        let queue = queue_with(mock.clone(), sink.clone(), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.status(), JobStatus::Processing);

        queue.cancel(handle.id()).unwrap();
        assert_eq!(handle.wait().await, JobStatus::Failed);

        let job = queue.job(handle.id()).unwrap();
        assert_eq!(job.error(), Some(CANCELLED_REASON));
        assert_eq!(sink.count("job_cancelled"), 1);
        assert_eq!(sink.count("job_completed"), 0);
        assert_eq!(sink.count("job_failed"), 0);

        // No completion side effects for a cancelled job.
        assert_eq!(mock.increments(), 0);
        assert_eq!(sink.count("history_changed"), 0);

        gate.notify_one();
    }

    #[tokio::test]
    async fn test_cancel_pending_job_is_rejected() {
        let mock = Arc::new(MockRemote::new());
        let gate = mock.hold();
        let queue = queue_with(mock.clone(), Arc::new(NullEventSink), fast_settings()).await;

        let _active = queue.submit(request("active.png")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let waiting = queue.submit(request("waiting.png")).unwrap();

        let err = queue.cancel(waiting.id()).unwrap_err();
        assert!(matches!(err, CancelError::NotProcessing { .. }));
        assert_eq!(waiting.status(), JobStatus::Pending);

        gate.notify_one();
        gate.notify_one();
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let mock = Arc::new(MockRemote::new());
        let queue = queue_with(mock, Arc::new(NullEventSink), fast_settings()).await;

        let err = queue.cancel(&JobId::new("nope")).unwrap_err();
        assert!(matches!(err, CancelError::UnknownJob(_)));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let mock = Arc::new(MockRemote::new());
        mock.push_success("mock://done.png");
        let sink = CollectingSink::new();
        let queue = queue_with(mock, sink.clone(), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        assert_eq!(handle.wait().await, JobStatus::Completed);

        // Cancel button pressed just after the job resolved.
        assert!(queue.cancel(handle.id()).is_ok());
        assert_eq!(queue.job(handle.id()).unwrap().status(), JobStatus::Completed);
        assert_eq!(sink.count("job_cancelled"), 0);
    }

    #[tokio::test]
    async fn test_failure_response_marks_job_failed() {
        let mock = Arc::new(MockRemote::new());
        mock.push_failure("quota exhausted");
        let sink = CollectingSink::new();
        let queue = queue_with(mock.clone(), sink.clone(), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        assert_eq!(handle.wait().await, JobStatus::Failed);

        let job = queue.job(handle.id()).unwrap();
        assert_eq!(job.error(), Some("quota exhausted"));
        assert_eq!(mock.increments(), 0);
        assert_eq!(sink.count("job_failed"), 1);
        assert_eq!(sink.count("history_changed"), 0);
    }

    #[tokio::test]
    async fn test_remote_error_marks_job_failed() {
        let mock = Arc::new(MockRemote::new());
        mock.push_error(RemoteError::Timeout);
        let queue = queue_with(mock, Arc::new(NullEventSink), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        assert_eq!(handle.wait().await, JobStatus::Failed);

        let job = queue.job(handle.id()).unwrap();
        assert!(job.error().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_response_dimensions_win() {
        let mock = Arc::new(MockRemote::new());
        mock.push_response(UpscaleResponse {
            success: true,
            image_url: Some("mock://done.png".to_string()),
            upscaled_dimensions: Some((3201, 2399).into()),
            ..Default::default()
        });
        let queue = queue_with(mock, Arc::new(NullEventSink), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        handle.wait().await;

        let job = queue.job(handle.id()).unwrap();
        assert_eq!(job.result_dimensions(), Some((3201, 2399)));
    }

    #[tokio::test]
    async fn test_result_dimensions_probed_from_fetched_image() {
        let mock = Arc::new(MockRemote::new());
        // Success without dimensions, but the result image is fetchable.
        mock.push_success("mock://done.png");
        mock.push_fetch(Ok(tiny_png(10, 8)));
        let queue = queue_with(mock, Arc::new(NullEventSink), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        handle.wait().await;

        let job = queue.job(handle.id()).unwrap();
        assert_eq!(job.result_dimensions(), Some((10, 8)));
    }

    #[tokio::test]
    async fn test_result_dimensions_fall_back_to_arithmetic() {
        let mock = Arc::new(MockRemote::new());
        // Success without dimensions; the fetch probe fails too.
        mock.push_success("mock://done.png");
        let queue = queue_with(mock, Arc::new(NullEventSink), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        handle.wait().await;

        let job = queue.job(handle.id()).unwrap();
        assert_eq!(job.result_dimensions(), Some((800 * 4, 600 * 4)));
    }

    #[tokio::test]
    async fn test_progress_advances_monotonically() {
        let mock = Arc::new(MockRemote::new());
        let gate = mock.hold();
        let sink = CollectingSink::new();
        let queue = queue_with(mock, sink.clone(), fast_settings()).await;

        let mut handle = queue.submit(request("photo.png")).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        gate.notify_one();
        handle.wait().await;

        let values = sink.progress_values();
        assert!(!values.is_empty());
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        // Simulated progress never claims completion on its own.
        assert!(values.iter().all(|&p| p <= 90));
        assert_eq!(sink.count("job_started"), 1);
    }
}
