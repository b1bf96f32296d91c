//! Job record and its state machine.
//!
//! A job moves `Pending → Processing → {Completed, Failed}`. Every
//! transition method is guarded: it checks the current state, applies the
//! change only when legal, and reports whether it did. Callers key
//! exactly-once side effects (history append, usage increment, terminal
//! notifications) off that return value, so a lost race is always a
//! silent no-op rather than a duplicated effect. Terminal states are
//! final; nothing mutates a completed or failed job.

use crate::plan::QualityPreset;
use crate::upload::ImageFormat;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Simulated progress never passes this before the remote call resolves.
pub(crate) const PROGRESS_CEILING: u8 = 90;

/// Failure reason recorded when the user cancels a job.
pub const CANCELLED_REASON: &str = "Cancelled by user";

/// Unique identifier for a job.
///
/// # Example
///
/// ```ignore
/// use pixelift::queue::JobId;
///
/// // Auto-generated unique ID
/// let id = JobId::auto();
///
/// // ID from meaningful data
/// let id = JobId::new("job-replay-17");
/// ```
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct JobId(String);

impl JobId {
    /// Creates a new job ID with the given string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a unique auto-generated job ID.
    ///
    /// The ID format is `job-{counter}` where counter is a monotonically
    /// increasing number.
    pub fn auto() -> Self {
        let counter = JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("job-{}", counter))
    }

    /// Returns the string value of this job ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job execution status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting in the queue behind the active job.
    #[default]
    Pending,

    /// The remote call is in flight; progress is being simulated.
    Processing,

    /// The remote call succeeded and the result was recorded.
    Completed,

    /// The job failed, including user cancellation.
    Failed,
}

impl JobStatus {
    /// Returns true if this is a terminal state (job is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the job has not reached a terminal state.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Returns true if the job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Processing => write!(f, "Processing"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Display label for the progress bar, derived from the percentage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessingPhase {
    #[default]
    Preparing,
    Uploading,
    Enhancing,
    Finalizing,
}

impl ProcessingPhase {
    /// Maps a progress percentage to its phase.
    pub fn for_progress(progress: u8) -> Self {
        match progress {
            0..=14 => Self::Preparing,
            15..=29 => Self::Uploading,
            30..=69 => Self::Enhancing,
            _ => Self::Finalizing,
        }
    }
}

impl fmt::Display for ProcessingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preparing => write!(f, "Preparing"),
            Self::Uploading => write!(f, "Uploading"),
            Self::Enhancing => write!(f, "Enhancing"),
            Self::Finalizing => write!(f, "Finalizing"),
        }
    }
}

/// What the queue needs to start a job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Original file name, carried through to the result record.
    pub file_name: String,
    /// Raw source image payload.
    pub image: Bytes,
    /// Source dimensions in pixels.
    pub dimensions: (u32, u32),
    /// Requested scale factor.
    pub scale: u32,
    /// Model family to use.
    pub quality: QualityPreset,
    /// Requested result encoding.
    pub output_format: ImageFormat,
}

/// One upscale job with its full lifecycle state.
#[derive(Debug, Clone)]
pub struct UpscaleJob {
    id: JobId,
    file_name: String,
    pub(crate) source_bytes: Bytes,
    source_dimensions: (u32, u32),
    scale: u32,
    quality: QualityPreset,
    output_format: ImageFormat,
    status: JobStatus,
    progress: u8,
    phase: ProcessingPhase,
    eta_ms: Option<u64>,
    result_url: Option<String>,
    result_dimensions: Option<(u32, u32)>,
    error: Option<String>,
    submitted_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl UpscaleJob {
    pub(crate) fn new(request: JobRequest) -> Self {
        Self {
            id: JobId::auto(),
            file_name: request.file_name,
            source_bytes: request.image,
            source_dimensions: request.dimensions,
            scale: request.scale,
            quality: request.quality,
            output_format: request.output_format,
            status: JobStatus::Pending,
            progress: 0,
            phase: ProcessingPhase::Preparing,
            eta_ms: None,
            result_url: None,
            result_dimensions: None,
            error: None,
            submitted_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Source payload size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.source_bytes.len() as u64
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        self.source_dimensions
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn quality(&self) -> QualityPreset {
        self.quality
    }

    pub fn output_format(&self) -> ImageFormat {
        self.output_format
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Progress percentage, 0 to 100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn phase(&self) -> ProcessingPhase {
        self.phase
    }

    /// Estimated seconds remaining, if processing.
    pub fn eta_seconds(&self) -> Option<u32> {
        self.eta_ms
            .map(|ms| (ms.div_ceil(1000)).min(u64::from(u32::MAX)) as u32)
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    pub fn result_dimensions(&self) -> Option<(u32, u32)> {
        self.result_dimensions
    }

    /// Failure reason, if failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Transitions `Pending → Processing` and arms the countdown.
    ///
    /// Returns false without changes when the job is not pending.
    pub(crate) fn begin_processing(&mut self, eta_seconds: u32) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::Processing;
        self.phase = ProcessingPhase::Preparing;
        self.eta_ms = Some(u64::from(eta_seconds) * 1000);
        true
    }

    /// Advances simulated progress by one tick.
    ///
    /// Progress is capped below 100 so the bar never claims completion
    /// before the remote call resolves. Returns false without changes
    /// when the job is not processing.
    pub(crate) fn advance_progress(&mut self, step: u8, elapsed_ms: u64) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.progress = self.progress.saturating_add(step).min(PROGRESS_CEILING);
        self.phase = ProcessingPhase::for_progress(self.progress);
        if let Some(eta_ms) = self.eta_ms.as_mut() {
            *eta_ms = eta_ms.saturating_sub(elapsed_ms);
        }
        true
    }

    /// Transitions `Processing → Completed` with the result attached.
    ///
    /// Returns false without changes when the job is not processing.
    pub(crate) fn complete(
        &mut self,
        result_url: String,
        dimensions: (u32, u32),
        at: DateTime<Utc>,
    ) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.phase = ProcessingPhase::Finalizing;
        self.eta_ms = None;
        self.result_url = Some(result_url);
        self.result_dimensions = Some(dimensions);
        self.completed_at = Some(at);
        true
    }

    /// Transitions `Processing → Failed` with the reason attached.
    ///
    /// Returns false without changes when the job is not processing.
    pub(crate) fn fail(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.status = JobStatus::Failed;
        self.eta_ms = None;
        self.error = Some(reason.into());
        self.completed_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_job() -> UpscaleJob {
        UpscaleJob::new(JobRequest {
            file_name: "photo.png".to_string(),
            image: Bytes::from_static(&[1, 2, 3, 4]),
            dimensions: (800, 600),
            scale: 4,
            quality: QualityPreset::Photo,
            output_format: ImageFormat::Png,
        })
    }

    #[test]
    fn test_job_id_new() {
        let id = JobId::new("test-job");
        assert_eq!(id.as_str(), "test-job");
    }

    #[test]
    fn test_job_id_auto_is_unique() {
        let id1 = JobId::auto();
        let id2 = JobId::auto();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("job-"));
    }

    #[test]
    fn test_job_id_display() {
        let id = JobId::new("my-job-123");
        assert_eq!(format!("{}", id), "my-job-123");
    }

    #[test]
    fn test_job_status_is_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_job_status_is_active() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Processing.is_active());
        assert!(!JobStatus::Completed.is_active());
        assert!(!JobStatus::Failed.is_active());
    }

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(ProcessingPhase::for_progress(0), ProcessingPhase::Preparing);
        assert_eq!(ProcessingPhase::for_progress(14), ProcessingPhase::Preparing);
        assert_eq!(ProcessingPhase::for_progress(15), ProcessingPhase::Uploading);
        assert_eq!(ProcessingPhase::for_progress(29), ProcessingPhase::Uploading);
        assert_eq!(ProcessingPhase::for_progress(30), ProcessingPhase::Enhancing);
        assert_eq!(ProcessingPhase::for_progress(69), ProcessingPhase::Enhancing);
        assert_eq!(ProcessingPhase::for_progress(70), ProcessingPhase::Finalizing);
        assert_eq!(ProcessingPhase::for_progress(100), ProcessingPhase::Finalizing);
    }

    #[test]
    fn test_begin_processing_only_from_pending() {
        let mut job = pending_job();
        assert!(job.begin_processing(10));
        assert_eq!(job.status(), JobStatus::Processing);
        assert_eq!(job.eta_seconds(), Some(10));

        // A second begin is refused.
        assert!(!job.begin_processing(10));
    }

    #[test]
    fn test_progress_caps_below_completion() {
        let mut job = pending_job();
        job.begin_processing(10);

        for _ in 0..100 {
            job.advance_progress(8, 1000);
        }
        assert_eq!(job.progress(), PROGRESS_CEILING);
        assert_eq!(job.phase(), ProcessingPhase::Finalizing);
    }

    #[test]
    fn test_progress_counts_eta_down() {
        let mut job = pending_job();
        job.begin_processing(5);

        job.advance_progress(3, 1000);
        assert_eq!(job.eta_seconds(), Some(4));

        // ETA bottoms out at zero, it never wraps.
        for _ in 0..10 {
            job.advance_progress(3, 1000);
        }
        assert_eq!(job.eta_seconds(), Some(0));
    }

    #[test]
    fn test_progress_requires_processing() {
        let mut job = pending_job();
        assert!(!job.advance_progress(5, 1000));
        assert_eq!(job.progress(), 0);
    }

    #[test]
    fn test_complete_sets_result() {
        let mut job = pending_job();
        job.begin_processing(10);

        let at = Utc::now();
        assert!(job.complete("https://cdn.example.com/out.png".to_string(), (3200, 2400), at));
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.progress(), 100);
        assert_eq!(job.result_url(), Some("https://cdn.example.com/out.png"));
        assert_eq!(job.result_dimensions(), Some((3200, 2400)));
        assert_eq!(job.completed_at(), Some(at));
        assert_eq!(job.eta_seconds(), None);
    }

    #[test]
    fn test_complete_requires_processing() {
        let mut job = pending_job();
        assert!(!job.complete("url".to_string(), (1, 1), Utc::now()));
        assert_eq!(job.status(), JobStatus::Pending);
    }

    #[test]
    fn test_fail_records_reason() {
        let mut job = pending_job();
        job.begin_processing(10);

        assert!(job.fail("service exploded", Utc::now()));
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error(), Some("service exploded"));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = pending_job();
        job.begin_processing(10);
        job.complete("url".to_string(), (1, 1), Utc::now());

        // Nothing moves a finished job.
        assert!(!job.fail("late failure", Utc::now()));
        assert!(!job.complete("other".to_string(), (2, 2), Utc::now()));
        assert!(!job.advance_progress(5, 1000));
        assert_eq!(job.status(), JobStatus::Completed);
        assert!(job.error().is_none());
    }

    #[test]
    fn test_cancel_loses_race_against_completion() {
        let mut job = pending_job();
        job.begin_processing(10);

        assert!(job.complete("url".to_string(), (1, 1), Utc::now()));
        // The losing cancel is a no-op, not a corruption.
        assert!(!job.fail(CANCELLED_REASON, Utc::now()));
        assert_eq!(job.status(), JobStatus::Completed);
    }
}
