//! Tunables for the target-size search.

use serde::{Deserialize, Serialize};

use crate::codec::FilterType;

/// Reference values.
pub mod defaults {
    /// Lowest encoder quality the search will try.
    pub const MIN_QUALITY: u8 = 5;
    /// Highest encoder quality the search will try.
    pub const MAX_QUALITY: u8 = 95;
    /// Smallest side, in pixels, the resolution ladder shrinks to.
    pub const FLOOR_SIDE: u32 = 64;
    /// Per-rung scale multiplier for single images.
    pub const IMAGE_SHRINK: f64 = 0.9;
    /// Per-round scale multiplier shared by all pages of a document.
    pub const PAGE_SHRINK: f64 = 0.85;
    /// Bytes reserved per page for container structure.
    pub const PAGE_OVERHEAD: usize = 2048;
    /// Smallest byte budget handed to any single page.
    pub const MIN_PAGE_BUDGET: usize = 512;
    /// Scale at which document pages are rasterized.
    pub const RENDER_SCALE: f32 = 2.0;
}

/// Inclusive quality interval searched by the binary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRange {
    min: u8,
    max: u8,
}

impl QualityRange {
    /// Build a range, clamping `max` to 100 and `min` into `1..=max`.
    pub fn new(min: u8, max: u8) -> Self {
        let max = max.clamp(1, 100);
        Self {
            min: min.clamp(1, max),
            max,
        }
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn contains(&self, quality: u8) -> bool {
        (self.min..=self.max).contains(&quality)
    }
}

impl Default for QualityRange {
    fn default() -> Self {
        Self::new(defaults::MIN_QUALITY, defaults::MAX_QUALITY)
    }
}

/// Everything the search and the pipelines can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    pub quality: QualityRange,
    pub floor_side: u32,
    pub image_shrink: f64,
    pub page_shrink: f64,
    pub page_overhead: usize,
    pub min_page_budget: usize,
    pub render_scale: f32,
    pub filter: FilterType,
    /// Append zero filler so the output is exactly the target size.
    pub pad_to_exact: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: QualityRange::default(),
            floor_side: defaults::FLOOR_SIDE,
            image_shrink: defaults::IMAGE_SHRINK,
            page_shrink: defaults::PAGE_SHRINK,
            page_overhead: defaults::PAGE_OVERHEAD,
            min_page_budget: defaults::MIN_PAGE_BUDGET,
            render_scale: defaults::RENDER_SCALE,
            filter: FilterType::default(),
            pad_to_exact: true,
        }
    }
}

/// Convert a size in KB, as given on the command line, to bytes.
pub fn kb_to_bytes(kb: f64) -> usize {
    (kb * 1024.0).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quality_range() {
        let range = QualityRange::default();
        assert_eq!((range.min(), range.max()), (5, 95));
        assert!(range.contains(5) && range.contains(95));
        assert!(!range.contains(4) && !range.contains(96));
    }

    #[test]
    fn test_quality_range_clamps() {
        let range = QualityRange::new(0, 200);
        assert_eq!((range.min(), range.max()), (1, 100));

        let inverted = QualityRange::new(80, 20);
        assert_eq!((inverted.min(), inverted.max()), (20, 20));
    }

    #[test]
    fn test_kb_to_bytes_rounds() {
        assert_eq!(kb_to_bytes(30.0), 30 * 1024);
        assert_eq!(kb_to_bytes(0.5), 512);
        assert_eq!(kb_to_bytes(1.0001), 1024);
        assert_eq!(kb_to_bytes(-3.0), 0);
    }

    #[test]
    fn test_partial_settings_fill_from_defaults() {
        let settings: CompressionSettings =
            serde_json::from_str(r#"{ "floor_side": 32, "pad_to_exact": false }"#).unwrap();

        assert_eq!(settings.floor_side, 32);
        assert!(!settings.pad_to_exact);
        assert_eq!(settings.page_overhead, defaults::PAGE_OVERHEAD);
        assert_eq!(settings.quality, QualityRange::default());
    }
}
