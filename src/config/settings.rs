//! Application settings loaded from config.toml
//!
//! The file is optional: every section has defaults, so a missing
//! `[pricing]` or `[external_trends]` table behaves like an empty one.
//! The path can be overridden with the `VORTEX_CONFIG` environment variable.

use crate::core::period::Period;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "VORTEX_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Reporting defaults
    pub reporting: ReportingConfig,
    /// Pricing model tables
    pub pricing: PricingConfig,
    /// Statically configured external trend feed
    pub external_trends: ExternalTrendsConfig,
}

/// Reporting defaults
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportingConfig {
    /// Window used when a command does not name one
    pub default_period: Period,
    /// Enables debug-level logging of failed computations
    pub debug: bool,
    /// Number of rows returned by ranked reports
    pub top_limit: usize,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_period: Period::Month,
            debug: false,
            top_limit: 10,
        }
    }
}

/// Pricing model tables
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    /// Price multiplier per medium, keyed by lower-case medium name with
    /// spaces replaced by underscores
    pub medium_factors: HashMap<String, f64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            medium_factors: default_medium_factors(),
        }
    }
}

/// Market analysis medium multipliers
#[must_use]
pub fn default_medium_factors() -> HashMap<String, f64> {
    [
        ("oil", 1.3),
        ("acrylic", 1.1),
        ("watercolor", 0.9),
        ("digital", 0.8),
        ("mixed_media", 1.2),
        ("sculpture", 1.5),
        ("photography", 0.85),
        ("print", 0.7),
        ("drawing", 0.8),
        ("collage", 0.9),
    ]
    .into_iter()
    .map(|(name, factor)| (name.to_string(), factor))
    .collect()
}

/// External trend styles configured by the operator
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ExternalTrendsConfig {
    /// Style names currently trending outside the marketplace
    pub styles: Vec<String>,
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from `VORTEX_CONFIG` or `./config.toml`.
///
/// A missing file is not an error; defaults are used instead.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        tracing::info!("No config file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [reporting]
            default_period = "week"
            debug = true
            top_limit = 5

            [pricing.medium_factors]
            oil = 1.4
            neon = 1.6

            [external_trends]
            styles = ["Abstract", "Vaporwave"]
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.reporting.default_period, Period::Week);
        assert!(config.reporting.debug);
        assert_eq!(config.reporting.top_limit, 5);
        assert_eq!(config.pricing.medium_factors["oil"], 1.4);
        assert_eq!(config.pricing.medium_factors["neon"], 1.6);
        // An explicit table replaces the defaults
        assert!(!config.pricing.medium_factors.contains_key("print"));
        assert_eq!(config.external_trends.styles.len(), 2);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.reporting.default_period, Period::Month);
        assert!(!config.reporting.debug);
        assert_eq!(config.reporting.top_limit, 10);
        assert_eq!(config.pricing.medium_factors["sculpture"], 1.5);
        assert!(config.external_trends.styles.is_empty());
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = parse_config("[reporting]\ntop_limit = \"many\"");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/vortex/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
