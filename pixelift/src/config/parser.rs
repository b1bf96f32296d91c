//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::{clamp_memory_budget_mib, clamp_progress_tick_ms};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [account] section
    if let Some(section) = ini.section(Some("account")) {
        if let Some(v) = section.get("user_id") {
            let v = v.trim();
            if !v.is_empty() {
                config.account.user_id = v.to_string();
            }
        }
        // Unrecognized plan names are kept as-is; tier resolution falls
        // through to the quota, so the parser does not reject them.
        if let Some(v) = section.get("plan") {
            let v = v.trim();
            if !v.is_empty() {
                config.account.plan = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("monthly_quota") {
            // Written back as an empty value when unset, so blank means "not set"
            let v = v.trim();
            if !v.is_empty() {
                let parsed: u32 = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "account".to_string(),
                    key: "monthly_quota".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (upscales per month)".to_string(),
                })?;
                config.account.monthly_quota = Some(parsed);
            }
        }
    }

    // [service] section
    if let Some(section) = ini.section(Some("service")) {
        if let Some(v) = section.get("api_url") {
            let v = v.trim();
            if !v.is_empty() {
                config.service.api_url = v.to_string();
            }
        }
        if let Some(v) = section.get("api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.service.api_key = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("state_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.service.state_dir = expand_tilde(v);
            }
        }
    }

    // [validator] section
    if let Some(section) = ini.section(Some("validator")) {
        if let Some(v) = section.get("pixel_ceiling") {
            config.validator.pixel_ceiling =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "validator".to_string(),
                    key: "pixel_ceiling".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (pixels)".to_string(),
                })?;
        }
        if let Some(v) = section.get("memory_budget_mib") {
            let parsed: u64 = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "validator".to_string(),
                key: "memory_budget_mib".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer (MiB)".to_string(),
            })?;
            // Enforce hard limits so segmentation estimates stay sane
            config.validator.memory_budget_mib = clamp_memory_budget_mib(parsed);
        }
        if let Some(v) = section.get("max_segments") {
            config.validator.max_segments =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "validator".to_string(),
                    key: "max_segments".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer".to_string(),
                })?;
        }
    }

    // [queue] section
    if let Some(section) = ini.section(Some("queue")) {
        if let Some(v) = section.get("progress_tick_ms") {
            let parsed: u64 = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "queue".to_string(),
                key: "progress_tick_ms".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer (milliseconds)".to_string(),
            })?;
            config.queue.progress_tick_ms = clamp_progress_tick_ms(parsed);
        }
        if let Some(v) = section.get("eta_base_secs") {
            config.queue.eta_base_secs =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "queue".to_string(),
                    key: "eta_base_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("eta_secs_per_mib") {
            config.queue.eta_secs_per_mib =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "queue".to_string(),
                    key: "eta_secs_per_mib".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("eta_secs_per_scale_step") {
            config.queue.eta_secs_per_scale_step =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "queue".to_string(),
                    key: "eta_secs_per_scale_step".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("max_depth") {
            config.queue.max_depth = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "queue".to_string(),
                key: "max_depth".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
        }
    }

    // [history] section
    if let Some(section) = ini.section(Some("history")) {
        if let Some(v) = section.get("retention_days") {
            config.history.retention_days =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "history".to_string(),
                    key: "retention_days".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (days)".to_string(),
                })?;
        }
        if let Some(v) = section.get("max_items") {
            config.history.max_items = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "history".to_string(),
                key: "max_items".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
        }
        if let Some(v) = section.get("cleanup_interval_hours") {
            config.history.cleanup_interval_hours =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "history".to_string(),
                    key: "cleanup_interval_hours".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (hours)".to_string(),
                })?;
        }
        if let Some(v) = section.get("janitor_check_secs") {
            config.history.janitor_check_secs =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "history".to_string(),
                    key: "janitor_check_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
