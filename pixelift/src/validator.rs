//! Scale constraint validation.
//!
//! Pure decision layer sitting between upload selection and job
//! submission. Given a plan tier, quality preset, source dimensions, and
//! a requested scale factor, [`ScaleConstraintValidator::validate`]
//! decides whether the request is legal, must be refused, or can only
//! proceed split into tiles. The validator holds no mutable state and
//! identical inputs always produce identical verdicts.
//!
//! Checks run in a fixed order:
//! 1. preset scale cap filtered against the tier's allowed-scale set,
//! 2. the hard output pixel ceiling on the longest side,
//! 3. the output memory budget, which can downgrade an otherwise legal
//!    request to a tiled one.

use crate::plan::{PlanTier, QualityPreset};
use thiserror::Error;

/// RGBA output is assumed when estimating decoded size.
pub const BYTES_PER_PIXEL: u64 = 4;

/// Why an upscale request was refused.
///
/// These surface synchronously, before any job exists; the user must
/// change the request and try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Requested scale is outside the plan's allowed set (after the
    /// preset cap has been applied)
    #[error("x{scale} is not available on the {tier} plan")]
    NotInPlan { scale: u32, tier: PlanTier },

    /// Output would exceed the hard per-side pixel ceiling
    #[error("upscaled output would exceed the {limit} px limit")]
    ExceedsPixelCeiling {
        /// The per-side ceiling in pixels.
        limit: u32,
        /// Largest scale that would fit under the ceiling, when one exists.
        suggested_scale: Option<u32>,
    },

    /// Even the maximum tiling cannot bring the output under the
    /// memory budget
    #[error("image is too large to process even with segmentation")]
    TooLargeToSegment,
}

/// Square tiling layout for a request that exceeds the memory budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Tiles per side of the square grid.
    pub per_side: u32,
}

impl SegmentPlan {
    /// Total number of tiles in the grid.
    pub fn segments(&self) -> u32 {
        self.per_side * self.per_side
    }
}

/// Outcome of validating a single upscale request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Request may be submitted as-is.
    Accepted,
    /// Request is refused; the reason says why.
    Rejected(ValidationError),
    /// Request is legal but must be processed as tiles to stay under
    /// the memory budget. Tile execution is not provided here; callers
    /// that cannot tile must treat this as a refusal.
    SegmentRequired(SegmentPlan),
}

impl Verdict {
    /// Returns true when the request may proceed unmodified.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Validates requested scale factors against plan, ceiling, and memory
/// constraints.
#[derive(Debug, Clone)]
pub struct ScaleConstraintValidator {
    pixel_ceiling: u32,
    memory_budget_bytes: u64,
    max_segments: u32,
}

impl ScaleConstraintValidator {
    /// Creates a validator with explicit limits.
    ///
    /// * `pixel_ceiling` - maximum output pixels on the longest side
    /// * `memory_budget_bytes` - decoded-output byte budget per tile
    /// * `max_segments` - largest tile count a [`SegmentPlan`] may propose
    pub fn new(pixel_ceiling: u32, memory_budget_bytes: u64, max_segments: u32) -> Self {
        Self {
            pixel_ceiling,
            memory_budget_bytes,
            max_segments,
        }
    }

    /// Decides whether an upscale request is legal.
    pub fn validate(
        &self,
        tier: PlanTier,
        preset: QualityPreset,
        width: u32,
        height: u32,
        scale: u32,
    ) -> Verdict {
        // The preset cap narrows the plan's set before membership is
        // checked, so an over-cap scale reads as "not in plan".
        if !preset.permits_scale(scale) || !tier.allows_scale(scale) {
            return Verdict::Rejected(ValidationError::NotInPlan { scale, tier });
        }

        // Degenerate zero dimensions behave as a single pixel.
        let max_side = u64::from(width.max(height).max(1));
        if max_side * u64::from(scale) > u64::from(self.pixel_ceiling) {
            let fit = (u64::from(self.pixel_ceiling) / max_side) as u32;
            return Verdict::Rejected(ValidationError::ExceedsPixelCeiling {
                limit: self.pixel_ceiling,
                suggested_scale: (fit >= 1).then_some(fit),
            });
        }

        let required = output_bytes(width, height, scale);
        if required <= self.memory_budget_bytes {
            return Verdict::Accepted;
        }

        // Smallest square grid whose tiles each fit the budget.
        let mut per_side = 2u32;
        while per_side * per_side <= self.max_segments {
            let segments = u64::from(per_side * per_side);
            if segments * self.memory_budget_bytes >= required {
                return Verdict::SegmentRequired(SegmentPlan { per_side });
            }
            per_side += 1;
        }
        Verdict::Rejected(ValidationError::TooLargeToSegment)
    }
}

impl Default for ScaleConstraintValidator {
    fn default() -> Self {
        use crate::config::defaults::{
            DEFAULT_MAX_SEGMENTS, DEFAULT_MEMORY_BUDGET_MIB, DEFAULT_PIXEL_CEILING,
        };
        Self::new(
            DEFAULT_PIXEL_CEILING,
            DEFAULT_MEMORY_BUDGET_MIB * 1024 * 1024,
            DEFAULT_MAX_SEGMENTS,
        )
    }
}

/// Estimated decoded size of the upscaled output in bytes.
pub fn output_bytes(width: u32, height: u32, scale: u32) -> u64 {
    let scale = u64::from(scale);
    u64::from(width) * u64::from(height) * scale * scale * BYTES_PER_PIXEL
}
