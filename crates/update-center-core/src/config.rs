use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating mode of a deserialization.
///
/// - `Prod`: development and private releases are left out of the catalog,
///   and the product development version never takes part in `LATEST`
///   expansion
/// - `Dev`: every release is loaded; `LATEST` also covers the product
///   development version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Prod,
    Dev,
}

impl Mode {
    pub fn is_dev(self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prod => f.write_str("PROD"),
            Self::Dev => f.write_str("DEV"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROD" => Ok(Self::Prod),
            "DEV" => Ok(Self::Dev),
            other => Err(format!("unknown mode '{other}', expected PROD or DEV")),
        }
    }
}

/// Settings of a catalog deserialization.
///
/// Can be read from JSON; missing fields take their defaults.
///
/// # Defaults
///
/// - `mode`: `PROD`
/// - `ignore_errors`: `false` (strict: overlapping public releases abort)
///
/// # Examples
///
/// ```
/// use update_center_core::config::{DeserializerConfig, Mode};
///
/// let config = DeserializerConfig::from_json(r#"{ "mode": "DEV" }"#).unwrap();
/// assert_eq!(config.mode, Mode::Dev);
/// assert!(!config.ignore_errors);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeserializerConfig {
    #[serde(default)]
    pub mode: Mode,
    /// Lenient mode: overlapping public compatibility is logged, not fatal.
    #[serde(default)]
    pub ignore_errors: bool,
}

impl DeserializerConfig {
    pub fn new(mode: Mode, ignore_errors: bool) -> Self {
        Self {
            mode,
            ignore_errors,
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeserializerConfig::default();
        assert_eq!(config.mode, Mode::Prod);
        assert!(!config.ignore_errors);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = DeserializerConfig::from_json("{}").unwrap();
        assert_eq!(config, DeserializerConfig::default());
    }

    #[test]
    fn test_full_json() {
        let config =
            DeserializerConfig::from_json(r#"{ "mode": "DEV", "ignore_errors": true }"#).unwrap();
        assert_eq!(config, DeserializerConfig::new(Mode::Dev, true));
    }

    #[test]
    fn test_invalid_mode_in_json() {
        let result = DeserializerConfig::from_json(r#"{ "mode": "STAGING" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("dev".parse::<Mode>(), Ok(Mode::Dev));
        assert_eq!(" PROD ".parse::<Mode>(), Ok(Mode::Prod));
        assert!("test".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Prod.to_string(), "PROD");
        assert_eq!(Mode::Dev.to_string(), "DEV");
        assert!(Mode::Dev.is_dev());
        assert!(!Mode::Prod.is_dev());
    }
}
