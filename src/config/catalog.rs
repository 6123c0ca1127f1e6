//! Catalog configuration loading from config.toml
//!
//! The products listed in config.toml are used to seed the catalog on first run
//! or when some of them are missing from the database.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single catalog product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Display name, used to detect already-seeded products
    pub name: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Image reference
    #[serde(default)]
    pub image_url: String,
    /// Category (e.g., "tops", "bottoms", "outerwear", "accessories")
    pub category: String,
    /// Sizes the product is offered in
    pub sizes: Vec<String>,
    /// Units in stock
    #[serde(default)]
    pub stock: i32,
    /// Whether the product is listed first
    #[serde(default)]
    pub featured: bool,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}
