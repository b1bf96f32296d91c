//! Quality presets and their scale caps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named processing profile selecting the upscaling model family.
///
/// A preset may cap the usable scale independently of the plan tier; the
/// cap filters the tier's allowed-scale set before membership is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    /// General-purpose photographic model.
    #[default]
    Photo,
    /// Illustration and digital art model.
    Art,
    /// Anime/line-art model. Capped at x8 regardless of plan.
    Anime,
    /// Text and document model.
    Text,
}

impl QualityPreset {
    /// Maximum scale this preset supports, independent of plan tier.
    ///
    /// `None` means the preset imposes no cap of its own.
    pub fn max_scale(&self) -> Option<u32> {
        match self {
            Self::Anime => Some(8),
            Self::Photo | Self::Art | Self::Text => None,
        }
    }

    /// Returns true if `scale` is within this preset's cap.
    pub fn permits_scale(&self, scale: u32) -> bool {
        self.max_scale().map_or(true, |cap| scale <= cap)
    }

    /// Parses a preset name case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "photo" => Some(Self::Photo),
            "art" => Some(Self::Art),
            "anime" => Some(Self::Anime),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Photo => "photo",
            Self::Art => "art",
            Self::Anime => "anime",
            Self::Text => "text",
        };
        write!(f, "{}", name)
    }
}
