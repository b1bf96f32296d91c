//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use pixelift::history::HistorySort;
use pixelift::plan::QualityPreset;
use pixelift::upload::ImageFormat;

/// Quality preset selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetArg {
    /// General photographic model (default)
    Photo,
    /// Digital art and illustrations
    Art,
    /// Anime and line art (capped at x8)
    Anime,
    /// Documents and text-heavy images
    Text,
}

impl From<PresetArg> for QualityPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Photo => QualityPreset::Photo,
            PresetArg::Art => QualityPreset::Art,
            PresetArg::Anime => QualityPreset::Anime,
            PresetArg::Text => QualityPreset::Text,
        }
    }
}

/// Image format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// PNG (lossless)
    Png,
    /// JPEG (smaller files)
    Jpeg,
    /// WebP
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

/// History sort order for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Most recent first (default)
    Newest,
    /// Oldest first
    Oldest,
    /// Largest scale factor first
    Scale,
    /// Closest to expiry first
    Expiry,
}

impl From<SortArg> for HistorySort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => HistorySort::NewestFirst,
            SortArg::Oldest => HistorySort::OldestFirst,
            SortArg::Scale => HistorySort::ScaleDescending,
            SortArg::Expiry => HistorySort::ExpiryAscending,
        }
    }
}

/// Plan tier selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    /// Free tier (x2/x4/x8, 50 upscales per month)
    Basic,
    Starter,
    Pro,
    Mega,
    /// Unmetered
    Enterprise,
}

impl TierArg {
    /// Plan name as written in the config file.
    pub fn config_name(&self) -> &'static str {
        match self {
            TierArg::Basic => "basic",
            TierArg::Starter => "starter",
            TierArg::Pro => "pro",
            TierArg::Mega => "mega",
            TierArg::Enterprise => "enterprise",
        }
    }
}

/// Human-readable byte size for display.
pub fn format_size(bytes: u64) -> String {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const KB: f64 = 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{} B", bytes)
    }
}
