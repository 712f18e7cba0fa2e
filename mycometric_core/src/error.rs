//! Error types for the mycometric_core library.

use crate::types::BotanicalCategory;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mycometric_core operations
///
/// Only the two reference-key variants can come out of a dosage computation.
/// Numeric inputs are clamped, never rejected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Species id is not in the table for the requested category
    #[error("Unknown {category} species: {id}")]
    UnknownSpecies { category: BotanicalCategory, id: String },

    /// Species id is not in any table
    #[error("Unknown species: {0}")]
    UnknownSpeciesId(String),

    /// Compound id is not in the synthetic table
    #[error("Unknown synthetic compound: {0}")]
    UnknownCompound(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),
}

impl Error {
    /// True for the precondition violations raised by an unresolvable
    /// reference key.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(
            self,
            Error::UnknownSpecies { .. } | Error::UnknownSpeciesId(_) | Error::UnknownCompound(_)
        )
    }
}
