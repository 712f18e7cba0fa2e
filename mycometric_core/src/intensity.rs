//! Intensity tiers and their psilocybin-equivalent targets.

use crate::types::{IntensityLevel, MgRange};
use serde::{Deserialize, Serialize};

/// Display metadata for an intensity tier
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntensityTier {
    pub level: IntensityLevel,
    pub label: String,
    pub range_description: String,
}

/// Target psilocybin-equivalent milligrams for a tier
pub fn target_range(level: IntensityLevel) -> MgRange {
    let (min, max) = match level {
        // Fadiman protocol
        IntensityLevel::Microdose => (1.0, 3.0),
        IntensityLevel::Threshold => (3.0, 6.0),
        IntensityLevel::Light => (6.0, 12.0),
        IntensityLevel::Moderate => (12.0, 20.0),
        // Clinical therapeutic range
        IntensityLevel::Strong => (20.0, 30.0),
        IntensityLevel::Heroic => (35.0, 50.0),
    };
    MgRange { min, max }
}

/// Midpoint of the tier's range, the starting point of every calculation
pub fn base_target_mg(level: IntensityLevel) -> f64 {
    target_range(level).midpoint()
}

pub fn list_intensity_levels() -> Vec<IntensityTier> {
    IntensityLevel::ALL
        .into_iter()
        .map(|level| {
            let range = target_range(level);
            IntensityTier {
                level,
                label: level.label().to_string(),
                range_description: format!(
                    "{}-{}mg psilocybin-equivalent",
                    range.min, range.max
                ),
            }
        })
        .collect()
}
