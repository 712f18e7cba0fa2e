//! Single-dimension adjustment factors.
//!
//! Each function maps one input dimension to a multiplicative factor. The
//! bounds here are fixed safety policy, not tunables.

use crate::types::{DryingQuality, MaterialForm, SpeciesRecord};

/// Body mass the intensity targets are calibrated for
pub const REFERENCE_BODY_WEIGHT_KG: f64 = 70.0;
pub const MIN_WEIGHT_FACTOR: f64 = 0.75;
pub const MAX_WEIGHT_FACTOR: f64 = 1.35;
pub const MAOI_FACTOR: f64 = 0.5;

pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Weight adjustment factor
///
/// Off unless explicitly requested: Garcia-Romeu 2021 found no significant
/// effect of body weight on subjective intensity between 49 and 113kg.
pub fn weight_factor(body_weight_kg: Option<f64>, use_weight_adjustment: bool) -> f64 {
    match body_weight_kg {
        Some(kg) if use_weight_adjustment && !kg.is_nan() => clamp(
            kg / REFERENCE_BODY_WEIGHT_KG,
            MIN_WEIGHT_FACTOR,
            MAX_WEIGHT_FACTOR,
        ),
        _ => 1.0,
    }
}

/// Halves the dose when the user is on a monoamine oxidase inhibitor
pub fn maoi_factor(on_maoi: bool) -> f64 {
    if on_maoi {
        MAOI_FACTOR
    } else {
        1.0
    }
}

/// Psilocin retained through drying
pub fn drying_factor(quality: DryingQuality) -> f64 {
    match quality {
        DryingQuality::Optimal => 1.0,
        DryingQuality::Average => 0.85,
        DryingQuality::Poor => 0.7,
    }
}

/// Potency remaining after storage losses
///
/// The 0-1 domain is enforced by the caller.
pub fn storage_factor(storage_degradation: f64) -> f64 {
    1.0 - storage_degradation
}

/// Dilution of fresh material by water relative to dried reference figures
pub fn form_factor(species: &SpeciesRecord, form: MaterialForm) -> f64 {
    match form {
        MaterialForm::Fresh => 1.0 / species.fresh_to_dry_ratio,
        MaterialForm::Dried => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn test_weight_disabled_is_noop() {
        assert_eq!(weight_factor(Some(120.0), false), 1.0);
        assert_eq!(weight_factor(None, true), 1.0);
        assert_eq!(weight_factor(Some(f64::NAN), true), 1.0);
    }

    #[test]
    fn test_weight_reference_mass() {
        assert_eq!(weight_factor(Some(70.0), true), 1.0);
    }

    #[test]
    fn test_weight_clamped() {
        assert_eq!(weight_factor(Some(30.0), true), MIN_WEIGHT_FACTOR);
        assert_eq!(weight_factor(Some(0.0), true), MIN_WEIGHT_FACTOR);
        assert_eq!(weight_factor(Some(200.0), true), MAX_WEIGHT_FACTOR);
    }

    #[test]
    fn test_weight_monotonic_and_bounded() {
        let weights = std::iter::once(f64::NEG_INFINITY)
            .chain((0..=250).map(|kg| kg as f64))
            .chain([500.0, f64::INFINITY]);
        let mut previous = 0.0;
        for kg in weights {
            let factor = weight_factor(Some(kg), true);
            assert!(factor >= previous, "not monotonic at {}kg", kg);
            assert!((MIN_WEIGHT_FACTOR..=MAX_WEIGHT_FACTOR).contains(&factor));
            previous = factor;
        }
    }

    #[test]
    fn test_weight_infinite_edges_clamp() {
        assert_eq!(weight_factor(Some(f64::INFINITY), true), MAX_WEIGHT_FACTOR);
        assert_eq!(weight_factor(Some(f64::NEG_INFINITY), true), MIN_WEIGHT_FACTOR);
    }

    #[test]
    fn test_maoi_halves() {
        assert_eq!(maoi_factor(true), 0.5);
        assert_eq!(maoi_factor(false), 1.0);
    }

    #[test]
    fn test_drying_factors() {
        assert_eq!(drying_factor(DryingQuality::Optimal), 1.0);
        assert_eq!(drying_factor(DryingQuality::Average), 0.85);
        assert_eq!(drying_factor(DryingQuality::Poor), 0.7);
    }

    #[test]
    fn test_storage_factor() {
        assert_eq!(storage_factor(0.0), 1.0);
        assert_eq!(storage_factor(0.25), 0.75);
    }

    #[test]
    fn test_form_factor() {
        let catalog = default_catalog();
        let cubensis = &catalog.species["psilocybe_cubensis"];
        let truffle = &catalog.species["psilocybe_tampanensis_sclerotia"];
        assert_eq!(form_factor(cubensis, MaterialForm::Dried), 1.0);
        assert_eq!(form_factor(cubensis, MaterialForm::Fresh), 0.1);
        assert_eq!(form_factor(truffle, MaterialForm::Fresh), 1.0 / 3.0);
    }
}
