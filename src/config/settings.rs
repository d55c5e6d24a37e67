//! Console settings loaded from `config.toml`.
//!
//! Every key is optional; a missing file yields the defaults so a fresh
//! install runs without any configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_BANNER_TIMEOUT_SECS: u64 = 5;

const fn default_banner_timeout_secs() -> u64 {
    DEFAULT_BANNER_TIMEOUT_SECS
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Seconds a success/failure banner stays visible
    #[serde(default = "default_banner_timeout_secs")]
    pub banner_timeout_secs: u64,
    /// Page opened by the query helper embed
    #[serde(default)]
    pub query_helper_url: Option<String>,
    /// Fee types created for a newly registered account
    #[serde(default)]
    pub fee_types: Vec<FeeTypeSeed>,
}

/// Seed entry for one fee type
#[derive(Debug, Clone, Deserialize)]
pub struct FeeTypeSeed {
    /// Display name (e.g. "Tuition")
    pub name: String,
    /// Amount charged per period
    pub amount: f64,
    /// Billing frequency (e.g. "Monthly")
    pub frequency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            banner_timeout_secs: DEFAULT_BANNER_TIMEOUT_SECS,
            query_helper_url: None,
            fee_types: Vec::new(),
        }
    }
}

impl Settings {
    /// How long banners stay visible.
    #[must_use]
    pub const fn banner_timeout(&self) -> Duration {
        Duration::from_secs(self.banner_timeout_secs)
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads `./config.toml`, or the defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::debug!("No config.toml found, using default settings");
        return Ok(Settings::default());
    }
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            banner_timeout_secs = 8
            query_helper_url = "https://example.org/helper"

            [[fee_types]]
            name = "Tuition"
            amount = 1200.0
            frequency = "Monthly"

            [[fee_types]]
            name = "Admission"
            amount = 5000.0
            frequency = "Once"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.banner_timeout(), Duration::from_secs(8));
        assert_eq!(
            settings.query_helper_url.as_deref(),
            Some("https://example.org/helper")
        );
        assert_eq!(settings.fee_types.len(), 2);
        assert_eq!(settings.fee_types[0].name, "Tuition");
        assert_eq!(settings.fee_types[1].amount, 5000.0);
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.banner_timeout(), Duration::from_secs(5));
        assert!(settings.query_helper_url.is_none());
        assert!(settings.fee_types.is_empty());
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        let result = parse_settings("banner_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
