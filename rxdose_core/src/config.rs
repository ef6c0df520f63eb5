//! Configuration file support for rxdose.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/rxdose/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the drug database inside the data directory
pub const DEFAULT_DRUG_DB_FILE: &str = "dbs.csv";

/// File name of the saved patient profiles inside the data directory
pub const PROFILES_FILE: &str = "profiles.json";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub patient: PatientDefaults,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Explicit drug database path; defaults to `<data_dir>/dbs.csv`
    #[serde(default)]
    pub drug_db: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            drug_db: None,
        }
    }
}

/// Patient values used when none are supplied
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientDefaults {
    #[serde(default = "default_age")]
    pub default_age: u32,

    #[serde(default = "default_weight_kg")]
    pub default_weight_kg: f64,
}

impl Default for PatientDefaults {
    fn default() -> Self {
        Self {
            default_age: default_age(),
            default_weight_kg: default_weight_kg(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("rxdose")
}

fn default_age() -> u32 {
    30
}

fn default_weight_kg() -> f64 {
    70.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("rxdose").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the recommendation commands cannot use
    pub fn validate(&self) -> Result<()> {
        if self.patient.default_age > 120 {
            return Err(Error::Config(format!(
                "patient.default_age must be 0-120, got {}",
                self.patient.default_age
            )));
        }
        if !(self.patient.default_weight_kg > 0.0) {
            return Err(Error::Config(format!(
                "patient.default_weight_kg must be positive, got {}",
                self.patient.default_weight_kg
            )));
        }
        Ok(())
    }

    /// Resolved drug database path
    pub fn drug_db_path(&self) -> PathBuf {
        self.data
            .drug_db
            .clone()
            .unwrap_or_else(|| self.data.data_dir.join(DEFAULT_DRUG_DB_FILE))
    }

    /// Resolved patient profile file path
    pub fn profiles_path(&self) -> PathBuf {
        self.data.data_dir.join(PROFILES_FILE)
    }
}
