//! Simulated progress and ETA arithmetic.
//!
//! The remote service reports nothing while it works, so the queue
//! animates progress locally: a deterministic per-tick step with a small
//! spread, and an up-front ETA derived from payload size and scale
//! factor. The numbers are presentation, not measurement; the only hard
//! promises are monotonic progress and an ETA that can only count down.

use crate::config::defaults::{
    DEFAULT_ETA_BASE_SECS, DEFAULT_ETA_SECS_PER_MIB, DEFAULT_ETA_SECS_PER_SCALE_STEP,
    DEFAULT_MAX_QUEUE_DEPTH, DEFAULT_PROGRESS_TICK_MS,
};

const MIB: u64 = 1024 * 1024;

/// Tunables for the job queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    /// Interval between simulated progress ticks.
    pub progress_tick_ms: u64,
    /// ETA floor applied to every job.
    pub eta_base_secs: u32,
    /// ETA contribution per MiB of source payload, rounded up.
    pub eta_secs_per_mib: u32,
    /// ETA contribution per unit of scale factor.
    pub eta_secs_per_scale_step: u32,
    /// Pending jobs allowed behind the active one.
    pub max_depth: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            progress_tick_ms: DEFAULT_PROGRESS_TICK_MS,
            eta_base_secs: DEFAULT_ETA_BASE_SECS,
            eta_secs_per_mib: DEFAULT_ETA_SECS_PER_MIB,
            eta_secs_per_scale_step: DEFAULT_ETA_SECS_PER_SCALE_STEP,
            max_depth: DEFAULT_MAX_QUEUE_DEPTH,
        }
    }
}

/// Progress increment for one tick, between 2 and 8 points.
///
/// The spread comes from the tick number itself, so a run is fully
/// deterministic while still reading like uneven network progress.
pub(crate) fn progress_step(tick: u64) -> u8 {
    2 + (tick.wrapping_mul(17) % 7) as u8
}

/// Initial ETA for a job, in seconds.
///
/// Monotonic in both inputs: a larger payload or a larger scale factor
/// never yields a smaller estimate.
pub fn initial_eta_seconds(size_bytes: u64, scale: u32, settings: &QueueSettings) -> u32 {
    let payload_mib = size_bytes.div_ceil(MIB);
    let secs = u64::from(settings.eta_base_secs)
        + payload_mib.saturating_mul(u64::from(settings.eta_secs_per_mib))
        + u64::from(scale) * u64::from(settings.eta_secs_per_scale_step);
    secs.min(u64::from(u32::MAX)) as u32
}
