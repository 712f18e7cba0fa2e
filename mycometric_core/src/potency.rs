//! Potency resolution for botanical material.
//!
//! Folds the three measured tryptamines into a single psilocybin-equivalent
//! figure, then applies drying, storage and form losses in that order.

use crate::adjustments::{drying_factor, form_factor, storage_factor};
use crate::types::{DryingQuality, MaterialBreakdown, MaterialForm, SpeciesRecord};

/// Psilocin is ~40% more potent than psilocybin by weight
pub const PSILOCIN_WEIGHT: f64 = 1.4;
/// Baeocystin is a weaker partial contributor
pub const BAEOCYSTIN_WEIGHT: f64 = 0.5;

/// Psilocybin-equivalent mg per gram of dried material, before degradation
pub fn equivalent_potency_mg_per_g(species: &SpeciesRecord) -> f64 {
    species.psilocybin_mg_per_g
        + species.psilocin_mg_per_g * PSILOCIN_WEIGHT
        + species.baeocystin_mg_per_g * BAEOCYSTIN_WEIGHT
}

/// Effective potency per gram of the material as weighed
pub fn resolve_potency(
    species: &SpeciesRecord,
    form: MaterialForm,
    drying: DryingQuality,
    storage_degradation: f64,
) -> MaterialBreakdown {
    let raw = equivalent_potency_mg_per_g(species);
    let drying_factor = drying_factor(drying);
    let storage_factor = storage_factor(storage_degradation);
    let form_factor = form_factor(species, form);

    let effective = raw * drying_factor * storage_factor * form_factor;

    tracing::debug!(
        species = %species.id,
        raw,
        drying_factor,
        storage_factor,
        form_factor,
        effective,
        "Resolved potency"
    );

    MaterialBreakdown {
        raw_potency_mg_per_g: raw,
        drying_factor,
        storage_factor,
        form_factor,
        effective_potency_mg_per_g: effective,
    }
}
