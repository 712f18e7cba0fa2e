//! Dosage engine.
//!
//! This module implements the calculation pipeline:
//! - Intensity midpoint as the base target
//! - Weight, tolerance and MAOI adjustments, strictly in that order
//! - Conversion to an amount of material or compound
//! - Confidence rating, warnings, notes and citations
//!
//! Values are carried at full precision and rounded only when the result is
//! assembled.

use crate::adjustments::{maoi_factor, weight_factor};
use crate::catalog::{default_catalog, Catalog};
use crate::intensity::base_target_mg;
use crate::potency::resolve_potency;
use crate::tolerance::{days_to_full_reset, tolerance_multiplier};
use crate::types::*;
use crate::Result;

/// Fixed display band around the psilocybin-equivalent figure
pub const EQUIVALENT_DISPLAY_BAND: f64 = 0.15;

const MG_DECIMALS: i32 = 1;
const GRAM_DECIMALS: i32 = 2;
const FACTOR_DECIMALS: i32 = 2;

/// Unrounded milligram targets after each adjustment stage
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetStages {
    pub base_target_mg: f64,
    pub weight_factor: f64,
    pub after_weight: f64,
    pub tolerance_multiplier: f64,
    pub after_tolerance: f64,
    pub maoi_factor: f64,
    pub after_maoi: f64,
}

/// Run stages 1-4: intensity, weight, tolerance, MAOI
pub fn resolve_targets(input: &DosageInput) -> TargetStages {
    let base_target_mg = base_target_mg(input.intensity);

    let weight_factor = weight_factor(input.body_weight_kg, input.use_weight_adjustment);
    let after_weight = base_target_mg * weight_factor;

    let tolerance_multiplier = tolerance_multiplier(input.tolerance.as_ref());
    let after_tolerance = after_weight * tolerance_multiplier;

    let maoi_factor = maoi_factor(input.on_maoi);
    let after_maoi = after_tolerance * maoi_factor;

    tracing::debug!(
        intensity = input.intensity.id(),
        base_target_mg,
        after_weight,
        after_tolerance,
        after_maoi,
        "Resolved target stages"
    );

    TargetStages {
        base_target_mg,
        weight_factor,
        after_weight,
        tolerance_multiplier,
        after_tolerance,
        maoi_factor,
        after_maoi,
    }
}

/// Compute a dosage against the built-in catalog
pub fn compute(input: &DosageInput) -> Result<DosageResult> {
    compute_with_catalog(default_catalog(), input)
}

/// Compute a dosage recommendation
///
/// Fails only when the substance id does not resolve in `catalog`.
pub fn compute_with_catalog(catalog: &Catalog, input: &DosageInput) -> Result<DosageResult> {
    let mut annotations = Annotations::default();
    let stages = resolve_targets(input);

    annotate_weight(input, stages.weight_factor, &mut annotations);
    annotate_tolerance(input, stages.tolerance_multiplier, &mut annotations);
    if input.on_maoi {
        annotations.warn(
            Severity::Danger,
            "MAOI INTERACTION: Dose halved automatically. Effects will be significantly \
             stronger and longer. Serotonin syndrome risk with high doses.",
        );
    }

    let substance = match &input.substance {
        SubstanceSelector::Synthetic { compound_id } => {
            let compound = catalog.synthetic(compound_id)?;
            dose_synthetic(compound, stages.after_maoi, &mut annotations)
        }
        SubstanceSelector::Botanical {
            category,
            species_id,
            form,
        } => {
            let species = catalog.species_for(*category, species_id)?;
            dose_botanical(species, *form, input, stages.after_maoi, &mut annotations)
        }
    };

    if input.intensity == IntensityLevel::Heroic {
        annotations.warn(
            Severity::Danger,
            "HEROIC DOSE: High risk of overwhelming experience. Experienced sitter \
             mandatory. Not for beginners.",
        );
    }
    annotations.note(
        "Set and setting significantly influence outcomes. Prepare a safe, comfortable environment.",
    );

    let equivalent = DoseRange::spread(stages.after_maoi, EQUIVALENT_DISPLAY_BAND);

    tracing::info!(
        unit = substance.unit.symbol(),
        median = substance.amount.median,
        confidence = substance.confidence.id(),
        "Computed dosage"
    );

    Ok(DosageResult {
        amount: substance.amount.rounded(substance.decimals),
        unit: substance.unit,
        psilocybin_equivalent_mg: equivalent.rounded(MG_DECIMALS),
        tolerance_multiplier: round_to(stages.tolerance_multiplier, FACTOR_DECIMALS),
        confidence: substance.confidence,
        warnings: annotations.warnings,
        notes: annotations.notes,
        citations: annotations.citations,
        calculation_breakdown: CalculationBreakdown {
            base_target_mg: round_to(stages.base_target_mg, MG_DECIMALS),
            weight_factor: round_to(stages.weight_factor, FACTOR_DECIMALS),
            after_weight_adjustment: round_to(stages.after_weight, MG_DECIMALS),
            tolerance_multiplier: round_to(stages.tolerance_multiplier, FACTOR_DECIMALS),
            after_tolerance: round_to(stages.after_tolerance, MG_DECIMALS),
            maoi_factor: stages.maoi_factor,
            after_maoi: round_to(stages.after_maoi, MG_DECIMALS),
            potency_mg_per_g: substance.potency.rounded(GRAM_DECIMALS),
            material: substance.material.map(round_material),
        },
    })
}

/// Confidence tier from a substance's uncertainty factor
pub fn confidence_for_uncertainty(uncertainty: f64) -> Confidence {
    if uncertainty <= 0.25 {
        Confidence::High
    } else if uncertainty <= 0.35 {
        Confidence::Moderate
    } else if uncertainty <= 0.45 {
        Confidence::Low
    } else {
        Confidence::VeryLow
    }
}

/// Severity of a free-text species warning
pub fn classify_species_warning(message: &str) -> Severity {
    if message.contains("EXTREME") || message.contains("deadly") {
        Severity::Danger
    } else if message.contains("risk") || message.contains("WLP") {
        Severity::Warning
    } else {
        Severity::Caution
    }
}

#[derive(Default)]
struct Annotations {
    warnings: Vec<Warning>,
    notes: Vec<String>,
    citations: Vec<Citation>,
}

impl Annotations {
    fn warn(&mut self, severity: Severity, message: impl Into<String>) {
        self.warnings.push(Warning::new(severity, message));
    }

    fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// Unrounded amount for the selected substance
struct SubstanceDose {
    amount: DoseRange,
    unit: DoseUnit,
    decimals: i32,
    confidence: Confidence,
    potency: DoseRange,
    material: Option<MaterialBreakdown>,
}

fn dose_synthetic(
    compound: &SyntheticRecord,
    target_mg: f64,
    annotations: &mut Annotations,
) -> SubstanceDose {
    let median_mg = target_mg / compound.equivalence_ratio;
    let uncertainty = compound.uncertainty_factor;

    for warning in &compound.warnings {
        annotations.warn(Severity::Caution, warning.as_str());
    }
    annotations.note(compound.notes.as_str());

    SubstanceDose {
        amount: DoseRange::spread(median_mg, uncertainty),
        unit: DoseUnit::Milligrams,
        decimals: MG_DECIMALS,
        // Pure compound
        confidence: Confidence::High,
        potency: DoseRange::spread(1000.0 * compound.equivalence_ratio, uncertainty),
        material: None,
    }
}

fn dose_botanical(
    species: &SpeciesRecord,
    form: MaterialForm,
    input: &DosageInput,
    target_mg: f64,
    annotations: &mut Annotations,
) -> SubstanceDose {
    let material = resolve_potency(
        species,
        form,
        input.drying_quality,
        input.storage_degradation,
    );

    if input.storage_degradation > 0.0 {
        annotations.note(format!(
            "Storage degradation: {}% potency loss assumed",
            round_to(input.storage_degradation * 100.0, 0)
        ));
    }
    if form == MaterialForm::Fresh {
        annotations.note(format!(
            "Fresh material: {}x weight compared to dried",
            species.fresh_to_dry_ratio
        ));
    }

    let uncertainty = species.uncertainty_factor;
    let median_grams = target_mg / material.effective_potency_mg_per_g;

    for warning in &species.warnings {
        annotations.warn(classify_species_warning(warning), warning.as_str());
    }
    annotations.note(species.notes.as_str());

    SubstanceDose {
        amount: DoseRange::spread(median_grams, uncertainty),
        unit: DoseUnit::Grams,
        decimals: GRAM_DECIMALS,
        confidence: confidence_for_uncertainty(uncertainty),
        potency: DoseRange::spread(material.effective_potency_mg_per_g, uncertainty),
        material: Some(material),
    }
}

fn annotate_weight(input: &DosageInput, factor: f64, annotations: &mut Annotations) {
    match input.body_weight_kg {
        Some(kg) if input.use_weight_adjustment && !kg.is_nan() => {
            annotations.note(format!(
                "Weight-adjusted: {}kg → {}% of standard dose",
                kg,
                round_to(factor * 100.0, 0)
            ));
        }
        _ => annotations.citations.push(Citation {
            authors: "Garcia-Romeu et al.".into(),
            year: 2021,
            title: "Optimal dosing for psilocybin pharmacotherapy".into(),
            relevance: "No significant relationship between body weight (49-113kg) and \
                        subjective effects"
                .into(),
            link: "https://pubmed.ncbi.nlm.nih.gov/33611977/".into(),
        }),
    }
}

fn annotate_tolerance(input: &DosageInput, multiplier: f64, annotations: &mut Annotations) {
    let Some(tolerance) = input.tolerance.as_ref() else {
        return;
    };
    if multiplier <= 1.1 {
        return;
    }

    annotations.warn(
        Severity::Caution,
        format!(
            "Tolerance detected: {}% dose increase applied. Full reset in ~{} days.",
            round_to(multiplier * 100.0 - 100.0, 0),
            days_to_full_reset(tolerance.days_since_last_dose)
        ),
    );
    annotations.citations.push(Citation {
        authors: "Buchborn et al.".into(),
        year: 2016,
        title: "Tolerance and cross-tolerance to psychedelics".into(),
        relevance: "5-HT2A receptor downregulation; ~14 day recovery period".into(),
        link: "https://www.sciencedirect.com/science/article/abs/pii/B9780128002124000790".into(),
    });
}

fn round_material(material: MaterialBreakdown) -> MaterialBreakdown {
    MaterialBreakdown {
        raw_potency_mg_per_g: round_to(material.raw_potency_mg_per_g, GRAM_DECIMALS),
        drying_factor: material.drying_factor,
        storage_factor: round_to(material.storage_factor, FACTOR_DECIMALS),
        form_factor: round_to(material.form_factor, 4),
        effective_potency_mg_per_g: round_to(material.effective_potency_mg_per_g, GRAM_DECIMALS),
    }
}
