//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, clamp helpers, and the
//! `ConfigFile::default()` implementation.

use super::settings::*;
use crate::history::HistorySettings;
use crate::queue::QueueSettings;

// =============================================================================
// Account defaults
// =============================================================================

/// Default user identifier for unauthenticated use.
pub const DEFAULT_USER_ID: &str = "anonymous";

// =============================================================================
// Service defaults
// =============================================================================

/// Default upscale API base URL.
pub const DEFAULT_API_URL: &str = "https://api.pixelift.app";

// =============================================================================
// Validator defaults
// =============================================================================

/// Default hard output ceiling in pixels on the longest side.
/// Outputs beyond this are refused regardless of plan.
pub const DEFAULT_PIXEL_CEILING: u32 = 12_000;

/// Default decoded-output memory budget (256 MiB).
pub const DEFAULT_MEMORY_BUDGET_MIB: u64 = 256;

/// Minimum configurable memory budget.
/// Below this even modest outputs would be forced into segmentation.
pub const MIN_MEMORY_BUDGET_MIB: u64 = 16;

/// Maximum configurable memory budget.
pub const MAX_MEMORY_BUDGET_MIB: u64 = 4096;

/// Default largest tile count segmentation may propose (4x4 grid).
pub const DEFAULT_MAX_SEGMENTS: u32 = 16;

// =============================================================================
// Queue defaults
// =============================================================================

/// Default interval between simulated progress ticks.
pub const DEFAULT_PROGRESS_TICK_MS: u64 = 1000;

/// Minimum configurable progress tick interval.
pub const MIN_PROGRESS_TICK_MS: u64 = 50;

/// Maximum configurable progress tick interval.
pub const MAX_PROGRESS_TICK_MS: u64 = 10_000;

/// Default ETA floor in seconds applied to every job.
pub const DEFAULT_ETA_BASE_SECS: u32 = 4;

/// Default ETA contribution per MiB of source payload.
pub const DEFAULT_ETA_SECS_PER_MIB: u32 = 2;

/// Default ETA contribution per unit of scale factor.
pub const DEFAULT_ETA_SECS_PER_SCALE_STEP: u32 = 1;

/// Default cap on pending jobs behind the active one.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 32;

// =============================================================================
// History defaults
// =============================================================================

/// Default history retention in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default maximum number of retained history items.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 100;

/// Default minimum hours between automatic cleanup passes.
pub const DEFAULT_CLEANUP_INTERVAL_HOURS: u32 = 24;

/// Default janitor wake interval in seconds.
/// The janitor wakes often; the cleanup interval decides whether a wake
/// actually does anything.
pub const DEFAULT_JANITOR_CHECK_SECS: u64 = 3600;

// =============================================================================
// Clamp helpers
// =============================================================================

/// Clamps the memory budget to its valid range and warns if clamped.
pub(super) fn clamp_memory_budget_mib(value: u64) -> u64 {
    if value < MIN_MEMORY_BUDGET_MIB {
        tracing::warn!(
            requested = value,
            min = MIN_MEMORY_BUDGET_MIB,
            max = MAX_MEMORY_BUDGET_MIB,
            "memory_budget_mib below minimum, clamping to {}",
            MIN_MEMORY_BUDGET_MIB
        );
        MIN_MEMORY_BUDGET_MIB
    } else if value > MAX_MEMORY_BUDGET_MIB {
        tracing::warn!(
            requested = value,
            min = MIN_MEMORY_BUDGET_MIB,
            max = MAX_MEMORY_BUDGET_MIB,
            "memory_budget_mib above maximum, clamping to {}",
            MAX_MEMORY_BUDGET_MIB
        );
        MAX_MEMORY_BUDGET_MIB
    } else {
        value
    }
}

/// Clamps the progress tick interval to its valid range and warns if clamped.
pub(super) fn clamp_progress_tick_ms(value: u64) -> u64 {
    if value < MIN_PROGRESS_TICK_MS {
        tracing::warn!(
            requested = value,
            min = MIN_PROGRESS_TICK_MS,
            max = MAX_PROGRESS_TICK_MS,
            "progress_tick_ms below minimum, clamping to {}",
            MIN_PROGRESS_TICK_MS
        );
        MIN_PROGRESS_TICK_MS
    } else if value > MAX_PROGRESS_TICK_MS {
        tracing::warn!(
            requested = value,
            min = MIN_PROGRESS_TICK_MS,
            max = MAX_PROGRESS_TICK_MS,
            "progress_tick_ms above maximum, clamping to {}",
            MAX_PROGRESS_TICK_MS
        );
        MAX_PROGRESS_TICK_MS
    } else {
        value
    }
}

// =============================================================================
// ConfigFile::default()
// =============================================================================

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            account: AccountSettings {
                user_id: DEFAULT_USER_ID.to_string(),
                plan: None,
                monthly_quota: None,
            },
            service: ServiceSettings {
                api_url: DEFAULT_API_URL.to_string(),
                api_key: None,
                state_dir: config_dir.join("state"),
            },
            validator: ValidatorSettings {
                pixel_ceiling: DEFAULT_PIXEL_CEILING,
                memory_budget_mib: DEFAULT_MEMORY_BUDGET_MIB,
                max_segments: DEFAULT_MAX_SEGMENTS,
            },
            queue: QueueSettings::default(),
            history: HistorySettings::default(),
            logging: LoggingSettings {
                file: config_dir.join("pixelift.log"),
            },
        }
    }
}
