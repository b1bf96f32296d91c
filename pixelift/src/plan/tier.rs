//! Plan tier table: allowed scale factors and monthly quotas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named subscription level gating which scale factors are usable.
///
/// The per-tier scale sets and quotas are configuration tables, not logic;
/// changing a tier's entitlements means editing the tables here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Entry tier.
    #[default]
    Basic,
    /// Adds the x10 scale.
    Starter,
    /// Adds the x16 scale.
    Pro,
    /// Full scale range up to x32.
    Mega,
    /// Same scale range as Mega with an uncapped quota.
    Enterprise,
}

impl PlanTier {
    /// Returns the ordered set of scale factors this tier may request.
    pub fn allowed_scales(&self) -> &'static [u32] {
        match self {
            Self::Basic => &[2, 4, 8],
            Self::Starter => &[2, 4, 8, 10],
            Self::Pro => &[2, 4, 8, 10, 16],
            Self::Mega | Self::Enterprise => &[2, 4, 8, 10, 16, 32],
        }
    }

    /// Returns true if `scale` is in this tier's allowed set.
    pub fn allows_scale(&self, scale: u32) -> bool {
        self.allowed_scales().contains(&scale)
    }

    /// Monthly upscale quota for this tier.
    ///
    /// `None` means unmetered.
    pub fn monthly_quota(&self) -> Option<u32> {
        match self {
            Self::Basic => Some(50),
            Self::Starter => Some(250),
            Self::Pro => Some(1_000),
            Self::Mega => Some(5_000),
            Self::Enterprise => None,
        }
    }

    /// Parses a tier name case-insensitively.
    ///
    /// Returns `None` for unrecognized names so callers can fall through
    /// to quota-based inference.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "starter" => Some(Self::Starter),
            "pro" => Some(Self::Pro),
            "mega" => Some(Self::Mega),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Infers the tier from a subscription's numeric monthly quota.
    ///
    /// Picks the smallest tier whose quota covers the given number.
    fn from_quota(quota: u32) -> Self {
        match quota {
            0..=50 => Self::Basic,
            51..=250 => Self::Starter,
            251..=1_000 => Self::Pro,
            1_001..=5_000 => Self::Mega,
            _ => Self::Enterprise,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "basic",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Mega => "mega",
            Self::Enterprise => "enterprise",
        };
        write!(f, "{}", name)
    }
}

/// Resolves a subscription record to a concrete tier.
///
/// Precedence, in order:
/// 1. a recognizable named tier (case-insensitive),
/// 2. inference from the numeric monthly quota,
/// 3. [`PlanTier::Basic`].
///
/// The function is total: every input combination resolves to a tier.
pub fn resolve_tier(named: Option<&str>, monthly_quota: Option<u32>) -> PlanTier {
    if let Some(tier) = named.and_then(PlanTier::from_name) {
        return tier;
    }
    if let Some(quota) = monthly_quota {
        return PlanTier::from_quota(quota);
    }
    PlanTier::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_scale_set() {
        assert_eq!(PlanTier::Basic.allowed_scales(), &[2, 4, 8]);
        assert!(PlanTier::Basic.allows_scale(4));
        assert!(!PlanTier::Basic.allows_scale(10));
    }

    #[test]
    fn test_mega_scale_set() {
        assert_eq!(PlanTier::Mega.allowed_scales(), &[2, 4, 8, 10, 16, 32]);
        assert!(PlanTier::Mega.allows_scale(32));
    }

    #[test]
    fn test_enterprise_matches_mega_scales() {
        assert_eq!(
            PlanTier::Enterprise.allowed_scales(),
            PlanTier::Mega.allowed_scales()
        );
    }

    #[test]
    fn test_scale_sets_are_ordered() {
        for tier in [
            PlanTier::Basic,
            PlanTier::Starter,
            PlanTier::Pro,
            PlanTier::Mega,
            PlanTier::Enterprise,
        ] {
            let scales = tier.allowed_scales();
            assert!(scales.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(PlanTier::from_name("MEGA"), Some(PlanTier::Mega));
        assert_eq!(PlanTier::from_name("  pro "), Some(PlanTier::Pro));
        assert_eq!(PlanTier::from_name("gold"), None);
    }

    #[test]
    fn test_resolve_named_wins_over_quota() {
        assert_eq!(resolve_tier(Some("starter"), Some(5_000)), PlanTier::Starter);
    }

    #[test]
    fn test_resolve_unknown_name_falls_through_to_quota() {
        assert_eq!(resolve_tier(Some("gold"), Some(5_000)), PlanTier::Mega);
    }

    #[test]
    fn test_resolve_quota_boundaries() {
        assert_eq!(resolve_tier(None, Some(50)), PlanTier::Basic);
        assert_eq!(resolve_tier(None, Some(51)), PlanTier::Starter);
        assert_eq!(resolve_tier(None, Some(1_000)), PlanTier::Pro);
        assert_eq!(resolve_tier(None, Some(1_001)), PlanTier::Mega);
        assert_eq!(resolve_tier(None, Some(50_000)), PlanTier::Enterprise);
    }

    #[test]
    fn test_resolve_default_is_basic() {
        assert_eq!(resolve_tier(None, None), PlanTier::Basic);
        assert_eq!(resolve_tier(Some(""), None), PlanTier::Basic);
    }

    #[test]
    fn test_display_round_trips_through_from_name() {
        for tier in [
            PlanTier::Basic,
            PlanTier::Starter,
            PlanTier::Pro,
            PlanTier::Mega,
            PlanTier::Enterprise,
        ] {
            assert_eq!(PlanTier::from_name(&tier.to_string()), Some(tier));
        }
    }
}
