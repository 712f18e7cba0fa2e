//! Core domain types for the dosage engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Intensity tiers and substance selection
//! - Reference records for species and synthetic compounds
//! - Calculation input and the annotated result

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Intensity
// ============================================================================

/// Desired subjective intensity, ordered from weakest to strongest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    Microdose,
    Threshold,
    Light,
    Moderate,
    Strong,
    Heroic,
}

impl IntensityLevel {
    /// Every tier in ascending order
    pub const ALL: [IntensityLevel; 6] = [
        IntensityLevel::Microdose,
        IntensityLevel::Threshold,
        IntensityLevel::Light,
        IntensityLevel::Moderate,
        IntensityLevel::Strong,
        IntensityLevel::Heroic,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            IntensityLevel::Microdose => "Microdose",
            IntensityLevel::Threshold => "Threshold",
            IntensityLevel::Light => "Light",
            IntensityLevel::Moderate => "Moderate",
            IntensityLevel::Strong => "Strong",
            IntensityLevel::Heroic => "Heroic",
        }
    }

    /// Snake-case identifier, as used on the wire and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            IntensityLevel::Microdose => "microdose",
            IntensityLevel::Threshold => "threshold",
            IntensityLevel::Light => "light",
            IntensityLevel::Moderate => "moderate",
            IntensityLevel::Strong => "strong",
            IntensityLevel::Heroic => "heroic",
        }
    }

    /// Parse a snake-case identifier (case-insensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.to_lowercase();
        Self::ALL.into_iter().find(|level| level.id() == id)
    }
}

/// Target range of psilocybin-equivalent milligrams
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MgRange {
    pub min: f64,
    pub max: f64,
}

impl MgRange {
    /// Arithmetic midpoint
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

// ============================================================================
// Substance Selection
// ============================================================================

/// Category of a listed substance
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubstanceCategory {
    Mushroom,
    Sclerotia,
    Synthetic,
}

/// Categories of biological material (the only ones with a species table)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BotanicalCategory {
    Mushroom,
    Sclerotia,
}

impl From<BotanicalCategory> for SubstanceCategory {
    fn from(category: BotanicalCategory) -> Self {
        match category {
            BotanicalCategory::Mushroom => SubstanceCategory::Mushroom,
            BotanicalCategory::Sclerotia => SubstanceCategory::Sclerotia,
        }
    }
}

impl fmt::Display for BotanicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotanicalCategory::Mushroom => write!(f, "mushroom"),
            BotanicalCategory::Sclerotia => write!(f, "sclerotia"),
        }
    }
}

/// Whether the material is weighed fresh or dried
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaterialForm {
    Fresh,
    #[default]
    Dried,
}

/// How well the material was dried (affects psilocin retention)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DryingQuality {
    /// Freeze-dried or fast fan-dried
    Optimal,
    #[default]
    Average,
    /// Oven-dried or slow air-dried
    Poor,
}

/// What is being dosed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubstanceSelector {
    /// Mushroom or sclerotia material, dosed in grams
    Botanical {
        category: BotanicalCategory,
        species_id: String,
        form: MaterialForm,
    },
    /// Pure compound, dosed in milligrams
    Synthetic { compound_id: String },
}

impl SubstanceSelector {
    pub fn category(&self) -> SubstanceCategory {
        match self {
            SubstanceSelector::Botanical { category, .. } => (*category).into(),
            SubstanceSelector::Synthetic { .. } => SubstanceCategory::Synthetic,
        }
    }
}

// ============================================================================
// Reference Records
// ============================================================================

/// Potency and handling data for a mushroom species or sclerotia variant
///
/// Concentrations are milligrams per gram of dried material.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub id: String,
    pub name: String,
    pub common_name: String,
    pub category: BotanicalCategory,
    /// Relative to dried P. cubensis = 1.0
    pub relative_multiplier: f64,
    pub psilocybin_mg_per_g: f64,
    pub psilocin_mg_per_g: f64,
    pub baeocystin_mg_per_g: f64,
    /// Fractional batch-to-batch variability, 0.4 = ±40%
    pub uncertainty_factor: f64,
    pub fresh_to_dry_ratio: f64,
    pub warnings: Vec<String>,
    pub notes: String,
}

/// Potency data for a synthetic tryptamine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticRecord {
    pub id: String,
    pub name: String,
    /// Potency per mg relative to psilocybin (1.0 = equal by weight)
    pub equivalence_ratio: f64,
    pub uncertainty_factor: f64,
    pub warnings: Vec<String>,
    pub notes: String,
}

// ============================================================================
// Input
// ============================================================================

/// Most recent prior dose
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToleranceInput {
    /// Psilocybin-equivalent milligrams of the last dose
    pub last_dose_mg: f64,
    pub days_since_last_dose: f64,
}

/// A complete dosage request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DosageInput {
    pub intensity: IntensityLevel,
    pub substance: SubstanceSelector,
    #[serde(default)]
    pub body_weight_kg: Option<f64>,
    #[serde(default)]
    pub use_weight_adjustment: bool,
    #[serde(default)]
    pub tolerance: Option<ToleranceInput>,
    #[serde(default)]
    pub on_maoi: bool,
    /// Ignored for synthetic compounds
    #[serde(default)]
    pub drying_quality: DryingQuality,
    /// Fraction of potency lost in storage, 0-1. Ignored for synthetic compounds.
    #[serde(default)]
    pub storage_degradation: f64,
}

impl DosageInput {
    /// Request with every optional adjustment left at its neutral default
    pub fn new(intensity: IntensityLevel, substance: SubstanceSelector) -> Self {
        Self {
            intensity,
            substance,
            body_weight_kg: None,
            use_weight_adjustment: false,
            tolerance: None,
            on_maoi: false,
            drying_quality: DryingQuality::default(),
            storage_degradation: 0.0,
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Biological-variability bounds around a central estimate
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseRange {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl DoseRange {
    /// `median ± median * spread`
    pub fn spread(median: f64, spread: f64) -> Self {
        Self {
            min: median * (1.0 - spread),
            median,
            max: median * (1.0 + spread),
        }
    }

    /// Round every bound to `decimals` places
    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            min: round_to(self.min, decimals),
            median: round_to(self.median, decimals),
            max: round_to(self.max, decimals),
        }
    }
}

/// Round half away from zero to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Unit of the recommended amount
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DoseUnit {
    /// Grams of material
    #[serde(rename = "g")]
    Grams,
    /// Milligrams of pure compound
    #[serde(rename = "mg")]
    Milligrams,
}

impl DoseUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            DoseUnit::Grams => "g",
            DoseUnit::Milligrams => "mg",
        }
    }
}

/// How tightly the potency of the chosen substance is known
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl Confidence {
    pub fn id(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Moderate => "moderate",
            Confidence::Low => "low",
            Confidence::VeryLow => "very_low",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Caution,
    Warning,
    Danger,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub severity: Severity,
    pub message: String,
}

impl Warning {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Literature reference backing an adjustment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub authors: String,
    pub year: u16,
    pub title: String,
    pub relevance: String,
    pub link: String,
}

/// Material-side potency figures (botanical substances only)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MaterialBreakdown {
    /// Psilocybin-equivalent mg/g before degradation
    pub raw_potency_mg_per_g: f64,
    pub drying_factor: f64,
    pub storage_factor: f64,
    pub form_factor: f64,
    pub effective_potency_mg_per_g: f64,
}

/// Every intermediate value of the pipeline, for auditability
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalculationBreakdown {
    pub base_target_mg: f64,
    pub weight_factor: f64,
    pub after_weight_adjustment: f64,
    pub tolerance_multiplier: f64,
    pub after_tolerance: f64,
    pub maoi_factor: f64,
    pub after_maoi: f64,
    /// Psilocybin-equivalent mg per gram of what is being weighed
    pub potency_mg_per_g: DoseRange,
    pub material: Option<MaterialBreakdown>,
}

/// Annotated outcome of a dosage computation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DosageResult {
    pub amount: DoseRange,
    pub unit: DoseUnit,
    pub psilocybin_equivalent_mg: DoseRange,
    pub tolerance_multiplier: f64,
    pub confidence: Confidence,
    pub warnings: Vec<Warning>,
    pub notes: Vec<String>,
    pub citations: Vec<Citation>,
    pub calculation_breakdown: CalculationBreakdown,
}

impl DosageResult {
    /// Highest severity among the warnings, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(|w| w.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_ordering() {
        assert!(IntensityLevel::Microdose < IntensityLevel::Threshold);
        assert!(IntensityLevel::Strong < IntensityLevel::Heroic);
        assert_eq!(IntensityLevel::ALL.len(), 6);
    }

    #[test]
    fn test_intensity_from_id() {
        assert_eq!(
            IntensityLevel::from_id("Moderate"),
            Some(IntensityLevel::Moderate)
        );
        assert_eq!(IntensityLevel::from_id("ludicrous"), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.5999, 2), 2.6);
        assert_eq!(round_to(14.5454, 1), 14.5);
        assert_eq!(round_to(1.25, 1), 1.3);
    }

    #[test]
    fn test_selector_serde_shape() {
        let selector = SubstanceSelector::Botanical {
            category: BotanicalCategory::Mushroom,
            species_id: "psilocybe_cubensis".into(),
            form: MaterialForm::Dried,
        };
        let json = serde_json::to_value(&selector).unwrap();
        assert_eq!(json["type"], "botanical");
        assert_eq!(json["category"], "mushroom");
        assert_eq!(json["form"], "dried");
    }

    #[test]
    fn test_input_defaults_from_json() {
        let input: DosageInput = serde_json::from_str(
            r#"{"intensity":"light","substance":{"type":"synthetic","compound_id":"4_ho_met"}}"#,
        )
        .unwrap();
        assert!(!input.on_maoi);
        assert!(!input.use_weight_adjustment);
        assert_eq!(input.drying_quality, DryingQuality::Average);
        assert_eq!(input.storage_degradation, 0.0);
        assert_eq!(input.substance.category(), SubstanceCategory::Synthetic);
    }

    #[test]
    fn test_unit_and_confidence_serialize() {
        assert_eq!(serde_json::to_string(&DoseUnit::Grams).unwrap(), "\"g\"");
        assert_eq!(
            serde_json::to_string(&Confidence::VeryLow).unwrap(),
            "\"very_low\""
        );
    }
}
