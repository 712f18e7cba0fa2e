//! Tolerance model based on 5-HT2A receptor downregulation.
//!
//! Recovery is modelled as first-order exponential decay scaled by the size
//! of the previous dose (Buchborn et al. 2016):
//!
//! ```text
//! multiplier = clamp(1 + 1.2 * impact * e^(-ln2 / 2.8 * days), 1.0, 2.5)
//! impact     = clamp(last_dose_mg / 25, 0.2, 2.0)
//! ```

use crate::adjustments::clamp;
use crate::types::ToleranceInput;
use serde::{Deserialize, Serialize};

/// Days after which sensitivity is fully restored
pub const FULL_RESET_DAYS: f64 = 14.0;
/// Hard ceiling, applied to same-day re-dosing
pub const MAX_MULTIPLIER: f64 = 2.5;
/// A standard therapeutic dose; impact 1.0
pub const REFERENCE_DOSE_MG: f64 = 25.0;
pub const HALF_LIFE_DAYS: f64 = 2.8;
/// Tolerance added at t=0 after a reference dose
pub const PEAK_TOLERANCE: f64 = 1.2;

/// Live feedback on current tolerance, independent of a planned dose
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToleranceStatus {
    pub tolerance_percent: i64,
    pub days_to_full_reset: f64,
    pub recommendation: String,
}

/// Dose multiplier compensating for reduced receptor sensitivity
pub fn tolerance_multiplier(tolerance: Option<&ToleranceInput>) -> f64 {
    let Some(tolerance) = tolerance else {
        return 1.0;
    };
    let days = tolerance.days_since_last_dose;
    if days >= FULL_RESET_DAYS {
        return 1.0;
    }
    if days <= 0.0 {
        return MAX_MULTIPLIER;
    }

    let impact = clamp(tolerance.last_dose_mg / REFERENCE_DOSE_MG, 0.2, 2.0);
    let decay_constant = std::f64::consts::LN_2 / HALF_LIFE_DAYS;
    let remaining = PEAK_TOLERANCE * impact * (-decay_constant * days).exp();

    clamp(1.0 + remaining, 1.0, MAX_MULTIPLIER)
}

/// Days left until tolerance has fully reset
pub fn days_to_full_reset(days_since_last_dose: f64) -> f64 {
    (FULL_RESET_DAYS - days_since_last_dose).max(0.0)
}

/// Current tolerance assuming the last dose was a standard 25mg
pub fn estimate_tolerance_status(days_since_last_dose: f64) -> ToleranceStatus {
    let multiplier = tolerance_multiplier(Some(&ToleranceInput {
        last_dose_mg: REFERENCE_DOSE_MG,
        days_since_last_dose,
    }));

    let tolerance_percent = ((multiplier - 1.0) * 100.0).round() as i64;
    let days_to_full_reset = days_to_full_reset(days_since_last_dose);

    let recommendation = match tolerance_percent {
        p if p <= 5 => "Full baseline sensitivity restored.".to_string(),
        p if p <= 20 => "Minimal tolerance. Normal dosing should work.".to_string(),
        p if p <= 50 => format!(
            "Moderate tolerance. Consider waiting {} more days or increasing dose.",
            days_to_full_reset
        ),
        _ => format!(
            "Significant tolerance. Recommend waiting for full reset ({} days).",
            days_to_full_reset
        ),
    };

    ToleranceStatus {
        tolerance_percent,
        days_to_full_reset,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiplier(last_dose_mg: f64, days: f64) -> f64 {
        tolerance_multiplier(Some(&ToleranceInput {
            last_dose_mg,
            days_since_last_dose: days,
        }))
    }

    #[test]
    fn test_no_tolerance_input() {
        assert_eq!(tolerance_multiplier(None), 1.0);
    }

    #[test]
    fn test_boundaries_exact() {
        assert_eq!(multiplier(25.0, 14.0), 1.0);
        assert_eq!(multiplier(25.0, 30.0), 1.0);
        assert_eq!(multiplier(25.0, 0.0), 2.5);
        assert_eq!(multiplier(25.0, -3.0), 2.5);
    }

    #[test]
    fn test_strictly_inside_bounds_between_zero_and_reset() {
        for dose in [0.0, 5.0, 25.0, 60.0, 500.0] {
            let mut day = 0.1;
            while day < 14.0 {
                let m = multiplier(dose, day);
                assert!(m > 1.0 && m <= 2.5, "dose {} day {} -> {}", dose, day, m);
                day += 0.1;
            }
        }
    }

    #[test]
    fn test_non_increasing_in_days() {
        for dose in [10.0, 25.0, 50.0] {
            let mut previous = f64::INFINITY;
            for tenth in 0..=160 {
                let m = multiplier(dose, tenth as f64 / 10.0);
                assert!(m <= previous, "increased at day {}", tenth as f64 / 10.0);
                previous = m;
            }
        }
    }

    #[test]
    fn test_reference_dose_one_half_life() {
        // 1 + 1.2 * 0.5
        assert!((multiplier(25.0, 2.8) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_dose_impact_clamped() {
        assert_eq!(multiplier(1.0, 5.0), multiplier(5.0, 5.0));
        assert_eq!(multiplier(50.0, 5.0), multiplier(200.0, 5.0));
    }

    #[test]
    fn test_status_at_reset() {
        let status = estimate_tolerance_status(14.0);
        assert_eq!(status.tolerance_percent, 0);
        assert_eq!(status.days_to_full_reset, 0.0);
        assert_eq!(status.recommendation, "Full baseline sensitivity restored.");
    }

    #[test]
    fn test_status_same_day() {
        let status = estimate_tolerance_status(0.0);
        assert_eq!(status.tolerance_percent, 150);
        assert_eq!(
            status.recommendation,
            "Significant tolerance. Recommend waiting for full reset (14 days)."
        );
    }

    #[test]
    fn test_status_moderate_band() {
        // 1.2 * 2^(-5.6/2.8) = 0.3 -> 30%
        let status = estimate_tolerance_status(5.6);
        assert_eq!(status.tolerance_percent, 30);
        assert!(status.recommendation.starts_with("Moderate tolerance"));
    }

    #[test]
    fn test_status_minimal_band() {
        // 1.2 * 2^(-8.4/2.8) = 0.15 -> 15%
        let status = estimate_tolerance_status(8.4);
        assert_eq!(status.tolerance_percent, 15);
        assert_eq!(
            status.recommendation,
            "Minimal tolerance. Normal dosing should work."
        );
    }
}
