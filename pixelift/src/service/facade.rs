//! Pixelift service facade implementation.

use super::error::ServiceError;
use crate::config::ConfigFile;
use crate::events::EventSink;
use crate::history::{
    CleanupReport, HistoryCache, HistoryFilter, HistoryItem, HistoryJanitor, HistorySort,
    StateStore,
};
use crate::plan::{PlanTier, QualityPreset};
use crate::queue::{JobHandle, JobId, JobQueue, JobRequest, UpscaleJob};
use crate::remote::{UpscaleClient, UsageStats, UsageTracker};
use crate::upload::{ImageFormat, UploadRegistry, UploadedFile};
use crate::validator::{ScaleConstraintValidator, Verdict};
use bytes::Bytes;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// High-level facade over the upscaling core.
///
/// Owns the upload slot, validator, queue, and history cache, and wires
/// them together so a front end only talks to this one type. All
/// collaborators are injected through [`new`]; nothing here reaches for
/// globals.
///
/// Submission is gated: [`submit`] re-validates the staged upload, so a
/// request that validation refuses (or that would need tiled processing)
/// never reaches the queue.
///
/// [`new`]: UpscaleService::new
/// [`submit`]: UpscaleService::submit
///
/// # Example
///
/// ```ignore
/// use pixelift::service::UpscaleService;
///
/// let service = UpscaleService::new(&config, remote, usage, store, sink).await?;
/// service.select_upload("photo.png", bytes).await?;
/// let handle = service.submit(4, QualityPreset::Photo, None)?;
/// ```
pub struct UpscaleService {
    uploads: UploadRegistry,
    validator: ScaleConstraintValidator,
    queue: JobQueue,
    history: Arc<HistoryCache>,
    usage: Arc<dyn UsageTracker>,
    tier: PlanTier,
    user_id: String,
}

impl UpscaleService {
    /// Creates a service from configuration and injected collaborators.
    ///
    /// Loads persisted history from the store before returning, so the
    /// facade starts with the previous session's records in place.
    pub async fn new(
        config: &ConfigFile,
        remote: Arc<dyn UpscaleClient>,
        usage: Arc<dyn UsageTracker>,
        store: Arc<dyn StateStore>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ServiceError> {
        let tier = config.plan_tier();
        let history = Arc::new(HistoryCache::load(store, sink.clone(), config.history).await?);
        let validator = ScaleConstraintValidator::new(
            config.validator.pixel_ceiling,
            config.validator.memory_budget_bytes(),
            config.validator.max_segments,
        );
        let queue = JobQueue::new(
            remote,
            usage.clone(),
            history.clone(),
            sink,
            config.queue,
            config.account.user_id.clone(),
        );

        info!(user_id = %config.account.user_id, tier = %tier, "Upscale service ready");

        Ok(Self {
            uploads: UploadRegistry::new(),
            validator,
            queue,
            history,
            usage,
            tier,
            user_id: config.account.user_id.clone(),
        })
    }

    /// The plan tier resolved from configuration.
    pub fn tier(&self) -> PlanTier {
        self.tier
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// Stages a file for upscaling, replacing any previous selection,
    /// then decodes its pixel dimensions.
    ///
    /// A payload that passes format detection but cannot be decoded stays
    /// staged with unknown dimensions and the decode error is returned;
    /// submission refuses such a selection until a decodable file
    /// replaces it.
    pub async fn select_upload(
        &self,
        file_name: impl Into<String>,
        bytes: Bytes,
    ) -> Result<UploadedFile, ServiceError> {
        self.uploads.select(file_name, bytes)?;
        self.uploads.probe_dimensions().await?;
        // The selection may have been replaced while decoding; report
        // whatever is staged now.
        self.uploads.current().ok_or(ServiceError::NoUpload)
    }

    /// Snapshot of the staged upload, if any.
    pub fn current_upload(&self) -> Option<UploadedFile> {
        self.uploads.current()
    }

    /// Drops the staged upload.
    pub fn clear_upload(&self) {
        self.uploads.clear();
    }

    // ========================================================================
    // Validation and submission
    // ========================================================================

    /// Validates a scale and preset against the staged upload.
    ///
    /// Returns the full [`Verdict`] so callers can distinguish a refusal
    /// from a tiled-processing proposal.
    pub fn validate_scale(
        &self,
        scale: u32,
        preset: QualityPreset,
    ) -> Result<Verdict, ServiceError> {
        let upload = self.uploads.current().ok_or(ServiceError::NoUpload)?;
        let (width, height) = upload.dimensions.ok_or(ServiceError::DimensionsUnknown)?;
        Ok(self
            .validator
            .validate(self.tier, preset, width, height, scale))
    }

    /// Validates the staged upload and enqueues it as a job.
    ///
    /// `output_format` defaults to the upload's own format. The staged
    /// file stays selected, so the same source can be submitted again at
    /// a different scale.
    pub fn submit(
        &self,
        scale: u32,
        preset: QualityPreset,
        output_format: Option<ImageFormat>,
    ) -> Result<JobHandle, ServiceError> {
        let upload = self.uploads.current().ok_or(ServiceError::NoUpload)?;
        let dimensions = upload.dimensions.ok_or(ServiceError::DimensionsUnknown)?;

        match self
            .validator
            .validate(self.tier, preset, dimensions.0, dimensions.1, scale)
        {
            Verdict::Accepted => {}
            Verdict::Rejected(reason) => return Err(ServiceError::Rejected(reason)),
            Verdict::SegmentRequired(plan) => {
                return Err(ServiceError::SegmentationUnsupported {
                    segments: plan.segments(),
                });
            }
        }

        let handle = self.queue.submit(JobRequest {
            file_name: upload.file_name.clone(),
            image: upload.bytes.clone(),
            dimensions,
            scale,
            quality: preset,
            output_format: output_format.unwrap_or(upload.format),
        })?;
        Ok(handle)
    }

    /// Cancels the actively processing job.
    pub fn cancel(&self, job_id: &JobId) -> Result<(), ServiceError> {
        self.queue.cancel(job_id)?;
        Ok(())
    }

    /// Snapshot of the actively processing job, if any.
    pub fn current_job(&self) -> Option<UpscaleJob> {
        self.queue.current()
    }

    /// Snapshot of any job submitted this session.
    pub fn job(&self, job_id: &JobId) -> Option<UpscaleJob> {
        self.queue.job(job_id)
    }

    /// Number of jobs waiting behind the active one.
    pub fn queue_depth(&self) -> usize {
        self.queue.queue_depth()
    }

    /// Whether a job is currently processing.
    pub fn is_busy(&self) -> bool {
        self.queue.is_busy()
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Filtered, sorted view of the upscale history.
    pub async fn history(&self, filter: &HistoryFilter, sort: HistorySort) -> Vec<HistoryItem> {
        self.history.query(filter, sort).await
    }

    /// Removes the given history items; unknown IDs are ignored.
    pub async fn delete_history(&self, ids: &[String]) -> Result<usize, ServiceError> {
        Ok(self.history.delete(ids).await?)
    }

    /// Removes all history items.
    pub async fn clear_history(&self) -> Result<usize, ServiceError> {
        Ok(self.history.clear_all().await?)
    }

    /// Attempts a rate-limited history cleanup pass now.
    pub async fn run_cleanup(&self) -> Result<CleanupReport, ServiceError> {
        Ok(self.history.run_cleanup().await?)
    }

    /// Spawns the background cleanup janitor.
    ///
    /// The task runs until `shutdown` is cancelled.
    pub fn spawn_janitor(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let janitor = HistoryJanitor::new(self.history.clone());
        tokio::spawn(janitor.run(shutdown))
    }

    // ========================================================================
    // Usage
    // ========================================================================

    /// Fetches current usage numbers for this account.
    pub async fn usage(&self) -> Result<UsageStats, ServiceError> {
        Ok(self.usage.usage_stats(&self.user_id).await?)
    }
}

impl std::fmt::Debug for UpscaleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpscaleService")
            .field("user_id", &self.user_id)
            .field("tier", &self.tier)
            .finish()
    }
}
