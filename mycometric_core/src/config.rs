//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/mycometric/config.toml`.
//! Only stable preferences live here. MAOI status, tolerance data, storage
//! loss and intensity are chosen fresh for every calculation and have no
//! config keys.

use crate::catalog::Catalog;
use crate::types::{DryingQuality, MaterialForm};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Defaults applied when a flag is not given on the command line
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_species")]
    pub species: String,

    #[serde(default)]
    pub form: MaterialForm,

    #[serde(default)]
    pub drying_quality: DryingQuality,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_weight_kg: Option<f64>,

    #[serde(default)]
    pub use_weight_adjustment: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            species: default_species(),
            form: MaterialForm::Dried,
            drying_quality: DryingQuality::Average,
            body_weight_kg: None,
            use_weight_adjustment: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_species() -> String {
    "psilocybe_cubensis".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME")
                    .map_err(|_| Error::Config("HOME environment variable not set".into()))?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("mycometric").join("config.toml"))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check the configured defaults against the catalog
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        if !catalog.species.contains_key(&self.defaults.species) {
            return Err(Error::Config(format!(
                "Default species '{}' is not in the catalog",
                self.defaults.species
            )));
        }
        if let Some(kg) = self.defaults.body_weight_kg {
            if !kg.is_finite() || kg <= 0.0 {
                return Err(Error::Config(format!(
                    "Default body weight must be positive, got {}",
                    kg
                )));
            }
        }
        Ok(())
    }
}
