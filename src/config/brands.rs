//! Brand configuration loading from config.toml
//!
//! The brands listed in config.toml seed the brand suggestion list on first
//! run. When no config file is present the built-in list is used instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Brands seeded when no config file names any.
pub const DEFAULT_BRANDS: &[&str] = &[
    "Bambu Lab",
    "Prusament",
    "eSun",
    "Overture",
    "Hatchbox",
    "Polymaker",
    "3D Solutech",
    "SUNLU",
    "ERYONE",
    "Protopasta",
    "ColorFabb",
    "MatterHackers",
    "Atomic Filament",
    "Push Plastic",
];

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Brand names to seed the suggestion list with
    #[serde(default)]
    pub brands: Vec<String>,
}

impl Config {
    /// Brand names to seed, falling back to [`DEFAULT_BRANDS`] when the file lists none.
    #[must_use]
    pub fn seed_brands(&self) -> Vec<String> {
        if self.brands.is_empty() {
            DEFAULT_BRANDS.iter().map(ToString::to_string).collect()
        } else {
            self.brands.clone()
        }
    }
}

/// Loads brand configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from ./config.toml, or an empty configuration if the
/// file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config { brands: Vec::new() })
    }
}
