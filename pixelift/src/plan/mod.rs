//! Subscription plan tiers and quality presets.
//!
//! This module provides the configuration tables that gate which scale
//! factors a user may request: per-tier allowed-scale sets, per-tier
//! monthly quotas, and per-preset scale caps.
//!
//! # Tier Resolution
//!
//! Subscription records sometimes carry a named tier, sometimes only a
//! numeric monthly quota. [`resolve_tier`] collapses both into one typed
//! value with a single documented precedence order:
//!
//! ```
//! use pixelift::plan::{resolve_tier, PlanTier};
//!
//! // Named tier wins over everything else
//! assert_eq!(resolve_tier(Some("mega"), Some(10)), PlanTier::Mega);
//!
//! // Quota inference when no recognizable name is present
//! assert_eq!(resolve_tier(None, Some(800)), PlanTier::Pro);
//!
//! // Default when neither is available
//! assert_eq!(resolve_tier(None, None), PlanTier::Basic);
//! ```

mod preset;
mod tier;

pub use preset::QualityPreset;
pub use tier::{resolve_tier, PlanTier};
