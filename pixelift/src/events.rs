//! Change notification for the upscaling core.
//!
//! The queue, history cache, and usage refresh emit structured events via
//! a sink abstraction; the core never knows how they are consumed. This
//! follows the "emit, don't present" pattern: presentation layers (a UI,
//! the CLI, logging) subscribe and decide what to show, keeping the state
//! machines free of display concerns.
//!
//! # Example
//!
//! ```ignore
//! use pixelift::events::{CoreEvent, EventSink};
//!
//! struct PrintSink;
//!
//! impl EventSink for PrintSink {
//!     fn emit(&self, event: CoreEvent) {
//!         println!("{}", event.event_type());
//!     }
//! }
//! ```

use crate::queue::{JobId, ProcessingPhase};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events emitted as the core's state changes.
#[derive(Clone, Debug)]
pub enum CoreEvent {
    /// A validated request entered the queue.
    JobSubmitted {
        job_id: JobId,
        file_name: String,
        scale: u32,
    },

    /// A job left the pending queue and began processing.
    JobStarted { job_id: JobId, eta_seconds: u32 },

    /// The active job's simulated progress advanced.
    JobProgress {
        job_id: JobId,
        progress: u8,
        eta_seconds: u32,
        phase: ProcessingPhase,
    },

    /// The remote call succeeded and the job reached its terminal state.
    JobCompleted { job_id: JobId, result_url: String },

    /// The job failed, including remote errors and timeouts.
    JobFailed { job_id: JobId, error: String },

    /// The user cancelled the active job.
    JobCancelled { job_id: JobId },

    /// The history set changed through append, delete, or clear.
    HistoryChanged { len: usize },

    /// An automatic cleanup pass removed at least one item.
    HistoryPruned { expired: usize, evicted: usize },

    /// Fresh usage numbers were fetched after a completion.
    UsageUpdated { used: u32, remaining: Option<u32> },
}

impl CoreEvent {
    /// Returns the job ID associated with this event, if any.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::JobSubmitted { job_id, .. }
            | Self::JobStarted { job_id, .. }
            | Self::JobProgress { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::JobFailed { job_id, .. }
            | Self::JobCancelled { job_id } => Some(job_id),
            Self::HistoryChanged { .. }
            | Self::HistoryPruned { .. }
            | Self::UsageUpdated { .. } => None,
        }
    }

    /// Returns a short name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::JobSubmitted { .. } => "job_submitted",
            Self::JobStarted { .. } => "job_started",
            Self::JobProgress { .. } => "job_progress",
            Self::JobCompleted { .. } => "job_completed",
            Self::JobFailed { .. } => "job_failed",
            Self::JobCancelled { .. } => "job_cancelled",
            Self::HistoryChanged { .. } => "history_changed",
            Self::HistoryPruned { .. } => "history_pruned",
            Self::UsageUpdated { .. } => "usage_updated",
        }
    }
}

/// Sink for core events.
///
/// Implementations must be thread-safe; events are emitted from the job
/// driver task as well as from callers mutating history directly.
/// `emit` should be fast and non-blocking.
pub trait EventSink: Send + Sync {
    /// Called for every event the core produces.
    fn emit(&self, event: CoreEvent);
}

/// No-op sink for when notifications are not consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: CoreEvent) {
        // Intentionally empty
    }
}

/// Sink that logs events using the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: CoreEvent) {
        match &event {
            CoreEvent::JobSubmitted {
                job_id,
                file_name,
                scale,
            } => {
                tracing::debug!(job_id = %job_id, file = %file_name, scale = scale, "Job submitted");
            }
            CoreEvent::JobStarted { job_id, eta_seconds } => {
                tracing::debug!(job_id = %job_id, eta_seconds = eta_seconds, "Job started");
            }
            CoreEvent::JobProgress {
                job_id,
                progress,
                eta_seconds,
                phase,
            } => {
                tracing::trace!(
                    job_id = %job_id,
                    progress = progress,
                    eta_seconds = eta_seconds,
                    phase = %phase,
                    "Job progress"
                );
            }
            CoreEvent::JobCompleted { job_id, result_url } => {
                tracing::info!(job_id = %job_id, url = %result_url, "Job completed");
            }
            CoreEvent::JobFailed { job_id, error } => {
                tracing::info!(job_id = %job_id, error = %error, "Job failed");
            }
            CoreEvent::JobCancelled { job_id } => {
                tracing::info!(job_id = %job_id, "Job cancelled");
            }
            CoreEvent::HistoryChanged { len } => {
                tracing::debug!(len = len, "History changed");
            }
            CoreEvent::HistoryPruned { expired, evicted } => {
                tracing::info!(expired = expired, evicted = evicted, "History pruned");
            }
            CoreEvent::UsageUpdated { used, remaining } => {
                tracing::debug!(used = used, remaining = ?remaining, "Usage updated");
            }
        }
    }
}

/// Sink that fans events out over a tokio broadcast channel.
///
/// Subscribers that lag behind drop old events rather than blocking the
/// emitter.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<CoreEvent>,
}

impl BroadcastEventSink {
    /// Creates a sink with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to all events emitted from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: CoreEvent) {
        // A send error just means nobody is listening right now.
        let _ = self.tx.send(event);
    }
}

/// Sink that forwards events to multiple sinks.
pub struct MultiplexEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl MultiplexEventSink {
    /// Creates a new multiplex sink with the given sinks.
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    /// Adds a sink to the multiplex.
    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for MultiplexEventSink {
    fn emit(&self, event: CoreEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

impl std::fmt::Debug for MultiplexEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiplexEventSink")
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}
