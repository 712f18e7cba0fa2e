#![forbid(unsafe_code)]

//! Core domain model and calculation logic for Mycometric.
//!
//! This crate provides:
//! - Domain types (intensity tiers, substance selection, results)
//! - Reference tables for species, sclerotia and synthetic compounds
//! - Adjustment factors, potency resolution and the tolerance model
//! - The dosage engine
//! - Configuration and logging setup for front ends
//!
//! Everything is synchronous and free of shared mutable state.

pub mod types;
pub mod error;
pub mod catalog;
pub mod intensity;
pub mod adjustments;
pub mod potency;
pub mod tolerance;
pub mod engine;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, default_catalog, Catalog};
pub use config::Config;
pub use intensity::list_intensity_levels;
pub use tolerance::{estimate_tolerance_status, ToleranceStatus};
pub use engine::{compute, compute_with_catalog};
