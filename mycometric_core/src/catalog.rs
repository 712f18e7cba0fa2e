//! Reference tables of species, sclerotia and synthetic compounds.
//!
//! Concentrations follow LC-MS/MS analyses (Gotvaldová et al. 2021) and are
//! expressed per gram of dried material. Nothing here is mutated after the
//! catalog is built.

use crate::potency::equivalent_potency_mg_per_g;
use crate::types::BotanicalCategory::{Mushroom, Sclerotia};
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete set of reference records, keyed by id
#[derive(Clone, Debug)]
pub struct Catalog {
    pub species: BTreeMap<String, SpeciesRecord>,
    pub synthetics: BTreeMap<String, SyntheticRecord>,
}

/// Display metadata for one species or sclerotia variant
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpeciesSummary {
    pub id: String,
    pub name: String,
    pub common_name: String,
    pub category: SubstanceCategory,
    pub relative_potency: f64,
}

/// Display metadata for one synthetic compound
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyntheticSummary {
    pub id: String,
    pub name: String,
    pub equivalent_ratio: f64,
}

/// Raw active-compound content, mg per gram dried
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpeciesComposition {
    pub name: String,
    pub psilocybin: f64,
    pub psilocin: f64,
    pub baeocystin: f64,
}

static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Shared, process-wide catalog
pub fn default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

struct SpeciesRow {
    id: &'static str,
    name: &'static str,
    common_name: &'static str,
    category: BotanicalCategory,
    relative_multiplier: f64,
    psilocybin: f64,
    psilocin: f64,
    baeocystin: f64,
    uncertainty: f64,
    fresh_to_dry: f64,
    warnings: &'static [&'static str],
    notes: &'static str,
}

const SPECIES_ROWS: &[SpeciesRow] = &[
    // Psilocybe
    SpeciesRow {
        id: "psilocybe_cubensis",
        name: "Psilocybe cubensis",
        common_name: "Golden Teachers",
        category: Mushroom,
        relative_multiplier: 1.0,
        psilocybin: 6.3,
        psilocin: 0.6,
        baeocystin: 0.2,
        uncertainty: 0.4,
        fresh_to_dry: 10.0,
        warnings: &[],
        notes: "Most common cultivated. Strains vary significantly (0.5-1.4%).",
    },
    SpeciesRow {
        id: "psilocybe_azurescens",
        name: "Psilocybe azurescens",
        common_name: "Azures / Flying Saucers",
        category: Mushroom,
        relative_multiplier: 2.5,
        psilocybin: 17.8,
        psilocin: 3.8,
        baeocystin: 3.5,
        uncertainty: 0.3,
        fresh_to_dry: 10.0,
        warnings: &[
            "EXTREME POTENCY - strongest known species",
            "Wood Lover's Paralysis (WLP) risk - temporary limb weakness",
            "Start with 30-50% of calculated dose",
        ],
        notes: "Be careful with this species as it can be very potent and has a high risk of WLP.",
    },
    SpeciesRow {
        id: "psilocybe_semilanceata",
        name: "Psilocybe semilanceata",
        common_name: "Liberty Caps",
        category: Mushroom,
        relative_multiplier: 1.5,
        psilocybin: 9.8,
        psilocin: 0.2,
        baeocystin: 0.2,
        uncertainty: 0.25,
        fresh_to_dry: 10.0,
        warnings: &["Cannot be cultivated - wild harvest only"],
        notes: "Very consistent potency. European/North American grasslands.",
    },
    SpeciesRow {
        id: "psilocybe_cyanescens",
        name: "Psilocybe cyanescens",
        common_name: "Wavy Caps",
        category: Mushroom,
        relative_multiplier: 1.6,
        psilocybin: 8.5,
        psilocin: 3.6,
        baeocystin: 0.3,
        uncertainty: 0.35,
        fresh_to_dry: 10.0,
        warnings: &["WLP risk (wood lover)"],
        notes: "Wood chip colonizer. PNW and Europe.",
    },
    SpeciesRow {
        id: "psilocybe_baeocystis",
        name: "Psilocybe baeocystis",
        common_name: "Bluebells / Knobby Tops",
        category: Mushroom,
        relative_multiplier: 1.8,
        psilocybin: 8.5,
        psilocin: 5.9,
        baeocystin: 1.0,
        uncertainty: 0.3,
        fresh_to_dry: 10.0,
        warnings: &["High baeocystin - may affect experience quality"],
        notes: "Pacific Northwest. Named for baeocystin content.",
    },
    SpeciesRow {
        id: "psilocybe_mexicana",
        name: "Psilocybe mexicana",
        common_name: "Mexicana",
        category: Mushroom,
        relative_multiplier: 0.6,
        psilocybin: 2.5,
        psilocin: 1.5,
        baeocystin: 0.1,
        uncertainty: 0.3,
        fresh_to_dry: 10.0,
        warnings: &[],
        notes: "Traditional Mazatec ceremonial use. Milder experience.",
    },
    SpeciesRow {
        id: "psilocybe_tampanensis",
        name: "Psilocybe tampanensis",
        common_name: "Pollock / Tampanensis",
        category: Mushroom,
        relative_multiplier: 1.0,
        psilocybin: 6.8,
        psilocin: 3.2,
        baeocystin: 0.3,
        uncertainty: 0.25,
        fresh_to_dry: 10.0,
        warnings: &[],
        notes: "Rare in wild. Usually cultivated for sclerotia.",
    },
    SpeciesRow {
        id: "psilocybe_stuntzii",
        name: "Psilocybe stuntzii",
        common_name: "Blue Ringers",
        category: Mushroom,
        relative_multiplier: 0.55,
        psilocybin: 3.6,
        psilocin: 1.2,
        baeocystin: 0.2,
        uncertainty: 0.35,
        fresh_to_dry: 10.0,
        warnings: &["Easy to confuse with Galerina marginata (deadly)"],
        notes: "Pacific Northwest. Moderate potency.",
    },
    SpeciesRow {
        id: "psilocybe_subaeruginosa",
        name: "Psilocybe subaeruginosa",
        common_name: "Subs / Australian",
        category: Mushroom,
        relative_multiplier: 1.5,
        psilocybin: 9.3,
        psilocin: 3.5,
        baeocystin: 0.4,
        uncertainty: 0.3,
        fresh_to_dry: 10.0,
        warnings: &["WLP risk (wood lover)"],
        notes: "Australia and New Zealand. High potency.",
    },
    SpeciesRow {
        id: "psilocybe_weilii",
        name: "Psilocybe weilii",
        common_name: "Weilii / GA Weilii",
        category: Mushroom,
        relative_multiplier: 1.1,
        psilocybin: 6.1,
        psilocin: 2.7,
        baeocystin: 0.5,
        uncertainty: 0.35,
        fresh_to_dry: 10.0,
        warnings: &[],
        notes: "Southeastern US endemic. Wood decomposer.",
    },
    // Panaeolus
    SpeciesRow {
        id: "panaeolus_cyanescens",
        name: "Panaeolus cyanescens",
        common_name: "Blue Meanies",
        category: Mushroom,
        relative_multiplier: 1.7,
        psilocybin: 8.5,
        psilocin: 4.4,
        baeocystin: 0.3,
        uncertainty: 0.4,
        fresh_to_dry: 10.0,
        warnings: &["Often confused with P. cinctulus (less potent)"],
        notes: "Tropical/subtropical dung species. High potency.",
    },
    SpeciesRow {
        id: "panaeolus_subbalteatus",
        name: "Panaeolus subbalteatus",
        common_name: "Subbs / Cinctulus",
        category: Mushroom,
        relative_multiplier: 0.9,
        psilocybin: 6.0,
        psilocin: 3.0,
        baeocystin: 0.2,
        uncertainty: 0.35,
        fresh_to_dry: 10.0,
        warnings: &[],
        notes: "Temperate grassland species.",
    },
    // Gymnopilus
    SpeciesRow {
        id: "gymnopilus_purpuratus",
        name: "Gymnopilus purpuratus",
        common_name: "Gym Purps",
        category: Mushroom,
        relative_multiplier: 0.5,
        psilocybin: 3.4,
        psilocin: 1.2,
        baeocystin: 0.5,
        uncertainty: 0.5,
        fresh_to_dry: 10.0,
        warnings: &["Highly variable potency"],
        notes: "Wood decomposer. Not commonly used.",
    },
    // Pluteus
    SpeciesRow {
        id: "pluteus_salicinus",
        name: "Pluteus salicinus",
        common_name: "Pluteus / Willow Shield",
        category: Mushroom,
        relative_multiplier: 0.4,
        psilocybin: 2.1,
        psilocin: 1.1,
        baeocystin: 0.1,
        uncertainty: 0.4,
        fresh_to_dry: 10.0,
        warnings: &[],
        notes: "Lower potency. Grows on willow/poplar.",
    },
    // Sclerotia are denser and hold less water
    SpeciesRow {
        id: "psilocybe_mexicana_sclerotia",
        name: "P. mexicana (Sclerotia)",
        common_name: "Mexicana Truffles",
        category: Sclerotia,
        relative_multiplier: 0.45,
        psilocybin: 3.2,
        psilocin: 1.5,
        baeocystin: 0.1,
        uncertainty: 0.25,
        fresh_to_dry: 3.0,
        warnings: &[],
        notes: "Commercial truffles. Very consistent potency. Usually sold fresh.",
    },
    SpeciesRow {
        id: "psilocybe_tampanensis_sclerotia",
        name: "P. tampanensis",
        common_name: "Philosopher's Stones",
        category: Sclerotia,
        relative_multiplier: 0.55,
        psilocybin: 3.1,
        psilocin: 6.8,
        baeocystin: 0.2,
        uncertainty: 0.2,
        fresh_to_dry: 3.0,
        warnings: &[],
        notes: "Most common commercial truffle. Netherlands legal market.",
    },
];

struct SyntheticRow {
    id: &'static str,
    name: &'static str,
    equivalence_ratio: f64,
    uncertainty: f64,
    warnings: &'static [&'static str],
    notes: &'static str,
}

const SYNTHETIC_ROWS: &[SyntheticRow] = &[
    SyntheticRow {
        id: "4_aco_dmt",
        name: "4-AcO-DMT (Psilacetin)",
        equivalence_ratio: 1.1,
        uncertainty: 0.15,
        warnings: &[
            "Research chemical - limited safety data",
            "Faster onset than psilocybin mushrooms",
            "Shorter duration (~4-6h vs 5-7h)",
        ],
        notes: "Prodrug of psilocin. Pharmacologically similar to psilocybin.",
    },
    SyntheticRow {
        id: "4_ho_met",
        name: "4-HO-MET (Metocin)",
        equivalence_ratio: 0.9,
        uncertainty: 0.15,
        warnings: &[
            "Research chemical - very limited safety data",
            "More visual, less introspective than psilocybin",
        ],
        notes: "Direct 5-HT2A agonist (not a prodrug).",
    },
    SyntheticRow {
        id: "4_aco_met",
        name: "4-AcO-MET",
        equivalence_ratio: 0.85,
        uncertainty: 0.15,
        warnings: &["Research chemical - minimal safety data"],
        notes: "Prodrug of 4-HO-MET.",
    },
];

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// Builds a fresh copy of the built-in catalog
///
/// Prefer `default_catalog()` outside of tests.
pub fn build_default_catalog() -> Catalog {
    let species = SPECIES_ROWS
        .iter()
        .map(|row| {
            let record = SpeciesRecord {
                id: row.id.into(),
                name: row.name.into(),
                common_name: row.common_name.into(),
                category: row.category,
                relative_multiplier: row.relative_multiplier,
                psilocybin_mg_per_g: row.psilocybin,
                psilocin_mg_per_g: row.psilocin,
                baeocystin_mg_per_g: row.baeocystin,
                uncertainty_factor: row.uncertainty,
                fresh_to_dry_ratio: row.fresh_to_dry,
                warnings: owned(row.warnings),
                notes: row.notes.into(),
            };
            (record.id.clone(), record)
        })
        .collect();

    let synthetics = SYNTHETIC_ROWS
        .iter()
        .map(|row| {
            let record = SyntheticRecord {
                id: row.id.into(),
                name: row.name.into(),
                equivalence_ratio: row.equivalence_ratio,
                uncertainty_factor: row.uncertainty,
                warnings: owned(row.warnings),
                notes: row.notes.into(),
            };
            (record.id.clone(), record)
        })
        .collect();

    Catalog {
        species,
        synthetics,
    }
}

impl Catalog {
    /// Resolve a species within a botanical category
    pub fn species_for(&self, category: BotanicalCategory, id: &str) -> Result<&SpeciesRecord> {
        self.species
            .get(id)
            .filter(|record| record.category == category)
            .ok_or_else(|| {
                tracing::warn!("Unresolvable {} species id {:?}", category, id);
                Error::UnknownSpecies {
                    category,
                    id: id.to_string(),
                }
            })
    }

    /// Resolve a species in whichever table holds it
    pub fn find_species(&self, id: &str) -> Result<&SpeciesRecord> {
        self.species
            .get(id)
            .ok_or_else(|| Error::UnknownSpeciesId(id.to_string()))
    }

    /// Resolve a synthetic compound
    pub fn synthetic(&self, id: &str) -> Result<&SyntheticRecord> {
        self.synthetics.get(id).ok_or_else(|| {
            tracing::warn!("Unresolvable synthetic compound id {:?}", id);
            Error::UnknownCompound(id.to_string())
        })
    }

    /// Species and sclerotia with display metadata, optionally filtered
    pub fn list_species(&self, category: Option<BotanicalCategory>) -> Vec<SpeciesSummary> {
        self.species
            .values()
            .filter(|record| category.map_or(true, |c| record.category == c))
            .map(|record| SpeciesSummary {
                id: record.id.clone(),
                name: record.name.clone(),
                common_name: record.common_name.clone(),
                category: record.category.into(),
                relative_potency: record.relative_multiplier,
            })
            .collect()
    }

    pub fn list_synthetics(&self) -> Vec<SyntheticSummary> {
        self.synthetics
            .values()
            .map(|record| SyntheticSummary {
                id: record.id.clone(),
                name: record.name.clone(),
                equivalent_ratio: record.equivalence_ratio,
            })
            .collect()
    }

    /// Raw compound concentrations for display; `None` for unknown ids
    pub fn species_composition(&self, id: &str) -> Option<SpeciesComposition> {
        self.species.get(id).map(|record| SpeciesComposition {
            name: record.name.clone(),
            psilocybin: record.psilocybin_mg_per_g,
            psilocin: record.psilocin_mg_per_g,
            baeocystin: record.baeocystin_mg_per_g,
        })
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, record) in &self.species {
            if id.is_empty() || record.id.is_empty() {
                errors.push("Species has empty ID".to_string());
            }
            if id != &record.id {
                errors.push(format!(
                    "Species key '{}' doesn't match record.id '{}'",
                    id, record.id
                ));
            }
            if record.name.is_empty() {
                errors.push(format!("Species '{}' has empty name", id));
            }
            let concentrations = [
                record.psilocybin_mg_per_g,
                record.psilocin_mg_per_g,
                record.baeocystin_mg_per_g,
            ];
            if concentrations.iter().any(|c| *c < 0.0) {
                errors.push(format!("Species '{}' has a negative concentration", id));
            }
            if equivalent_potency_mg_per_g(record) <= 0.0 {
                errors.push(format!("Species '{}' has no active content", id));
            }
            if !(0.0..1.0).contains(&record.uncertainty_factor) {
                errors.push(format!(
                    "Species '{}': uncertainty {} outside [0, 1)",
                    id, record.uncertainty_factor
                ));
            }
            if record.fresh_to_dry_ratio < 1.0 {
                errors.push(format!(
                    "Species '{}': fresh-to-dry ratio {} < 1",
                    id, record.fresh_to_dry_ratio
                ));
            }
        }

        for (id, record) in &self.synthetics {
            if id != &record.id {
                errors.push(format!(
                    "Compound key '{}' doesn't match record.id '{}'",
                    id, record.id
                ));
            }
            if record.name.is_empty() {
                errors.push(format!("Compound '{}' has empty name", id));
            }
            if record.equivalence_ratio <= 0.0 {
                errors.push(format!(
                    "Compound '{}': equivalence ratio {} must be positive",
                    id, record.equivalence_ratio
                ));
            }
            if !(0.0..1.0).contains(&record.uncertainty_factor) {
                errors.push(format!(
                    "Compound '{}': uncertainty {} outside [0, 1)",
                    id, record.uncertainty_factor
                ));
            }
        }

        errors
    }
}
