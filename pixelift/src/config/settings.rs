//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.
//! The queue and history sections reuse the tunable structs their
//! subsystems define, so a loaded config plugs straight into them.

use crate::history::HistorySettings;
use crate::plan::{resolve_tier, PlanTier};
use crate::queue::QueueSettings;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Account identity and plan
    pub account: AccountSettings,
    /// Remote service endpoint
    pub service: ServiceSettings,
    /// Validation limits
    pub validator: ValidatorSettings,
    /// Queue and progress simulation tunables
    pub queue: QueueSettings,
    /// History retention tunables
    pub history: HistorySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Resolves the effective plan tier.
    ///
    /// A named plan wins over a quota-derived one; with neither set the
    /// account is treated as basic.
    pub fn plan_tier(&self) -> PlanTier {
        resolve_tier(self.account.plan.as_deref(), self.account.monthly_quota)
    }
}

/// Account configuration.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// User identifier sent with every remote call.
    pub user_id: String,
    /// Named plan tier: "basic", "starter", "pro", "mega", or "enterprise".
    /// When unset the tier is derived from `monthly_quota`.
    pub plan: Option<String>,
    /// Monthly upscale quota, used to derive the tier when no plan name
    /// is configured.
    pub monthly_quota: Option<u32>,
}

/// Remote service configuration.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Base URL of the upscale API.
    pub api_url: String,
    /// Bearer token for authenticated requests (None = anonymous).
    pub api_key: Option<String>,
    /// Directory for persisted state (history, cleanup timestamp).
    pub state_dir: PathBuf,
}

/// Validation limits.
#[derive(Debug, Clone)]
pub struct ValidatorSettings {
    /// Hard output ceiling in pixels on the longest side.
    pub pixel_ceiling: u32,
    /// Decoded-output memory budget in MiB.
    pub memory_budget_mib: u64,
    /// Largest tile count segmentation may propose.
    pub max_segments: u32,
}

impl ValidatorSettings {
    /// The memory budget in bytes.
    pub fn memory_budget_bytes(&self) -> u64 {
        self.memory_budget_mib * 1024 * 1024
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
