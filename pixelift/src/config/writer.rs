//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let plan = config.account.plan.as_deref().unwrap_or("");
    let monthly_quota = config
        .account
        .monthly_quota
        .map(|q| q.to_string())
        .unwrap_or_default();
    let api_key = config.service.api_key.as_deref().unwrap_or("");

    format!(
        r#"[account]
; User identifier sent with every upscale request (default: anonymous)
user_id = {}
; Subscription plan: basic, starter, pro, mega, or enterprise
; If empty, the tier is inferred from monthly_quota (falls back to basic)
plan = {}
; Monthly upscale quota, used for tier inference when plan is empty
; Leave empty to use the plan's built-in quota
monthly_quota = {}

[service]
; Upscale API base URL (default: https://api.pixelift.app)
api_url = {}
; API key sent as a bearer token. Leave empty for anonymous access.
api_key = {}
; Directory for persisted state such as upscale history (default: ~/.pixelift/state)
state_dir = {}

[validator]
; Hard ceiling on the longest output side in pixels (default: 12000)
; Outputs beyond this are refused regardless of plan
pixel_ceiling = {}
; Decoded-output memory budget in MiB (default: 256, clamped to 16-4096)
; Outputs over budget get a tiled-processing proposal instead of a plain pass
memory_budget_mib = {}
; Largest tile count a tiled-processing proposal may use (default: 16)
max_segments = {}

[queue]
; Interval between simulated progress ticks in milliseconds (default: 1000, clamped to 50-10000)
progress_tick_ms = {}
; ETA floor in seconds applied to every job (default: 4)
eta_base_secs = {}
; ETA contribution per MiB of source payload (default: 2)
eta_secs_per_mib = {}
; ETA contribution per unit of scale factor (default: 1)
eta_secs_per_scale_step = {}
; Maximum pending jobs behind the active one (default: 32)
max_depth = {}

[history]
; Days a history item is kept before it expires (default: 30)
retention_days = {}
; Maximum retained history items, oldest evicted first (default: 100)
max_items = {}
; Minimum hours between automatic cleanup passes (default: 24)
cleanup_interval_hours = {}
; Janitor wake interval in seconds (default: 3600)
; Wakes are cheap; cleanup_interval_hours decides whether a wake does work
janitor_check_secs = {}

[logging]
; Log file path (default: ~/.pixelift/pixelift.log)
file = {}
"#,
        config.account.user_id,
        plan,
        monthly_quota,
        config.service.api_url,
        api_key,
        path_to_string(&config.service.state_dir),
        config.validator.pixel_ceiling,
        config.validator.memory_budget_mib,
        config.validator.max_segments,
        config.queue.progress_tick_ms,
        config.queue.eta_base_secs,
        config.queue.eta_secs_per_mib,
        config.queue.eta_secs_per_scale_step,
        config.queue.max_depth,
        config.history.retention_days,
        config.history.max_items,
        config.history.cleanup_interval_hours,
        config.history.janitor_check_secs,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.account.user_id = "usr-99".to_string();
        config.account.plan = Some("mega".to_string());
        config.service.api_key = Some("sk-live-456".to_string());
        config.validator.pixel_ceiling = 10_000;
        config.queue.max_depth = 3;
        config.history.retention_days = 14;

        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded.account.user_id, "usr-99");
        assert_eq!(loaded.account.plan, Some("mega".to_string()));
        assert_eq!(loaded.service.api_key, Some("sk-live-456".to_string()));
        assert_eq!(loaded.validator.pixel_ceiling, 10_000);
        assert_eq!(loaded.queue.max_depth, 3);
        assert_eq!(loaded.history.retention_days, 14);
    }

    #[test]
    fn test_unset_options_survive_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let config = ConfigFile::default();
        assert!(config.account.plan.is_none());
        assert!(config.account.monthly_quota.is_none());
        assert!(config.service.api_key.is_none());

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded.account.plan, None);
        assert_eq!(loaded.account.monthly_quota, None);
        assert_eq!(loaded.service.api_key, None);
    }

    #[test]
    fn test_quota_survives_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.account.monthly_quota = Some(1_000);

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded.account.monthly_quota, Some(1_000));
    }
}
