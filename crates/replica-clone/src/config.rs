//! Cloner configuration.
//!
//! Embedders can keep these settings in a TOML file:
//!
//! ```toml
//! mode = "strict"
//! visited_capacity = 64
//! ```

use serde::Deserialize;

use crate::error::CloneResult;

/// How functions found in the graph are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneMode {
    /// Functions are kept by reference; cloning never fails
    #[default]
    Lenient,
    /// The first function found aborts the clone with its path
    Strict,
}

/// Cloner settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloneConfig {
    /// Function handling
    #[serde(default)]
    pub mode: CloneMode,

    /// Initial capacity of the visited-set
    #[serde(default = "default_visited_capacity")]
    pub visited_capacity: usize,
}

fn default_visited_capacity() -> usize {
    16
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            mode: CloneMode::default(),
            visited_capacity: default_visited_capacity(),
        }
    }
}

impl CloneConfig {
    /// Default settings in strict mode
    pub fn strict() -> Self {
        Self {
            mode: CloneMode::Strict,
            ..Self::default()
        }
    }

    /// Parse settings from TOML; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> CloneResult<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloneError;

    #[test]
    fn test_defaults() {
        let config = CloneConfig::from_toml_str("").unwrap();
        assert_eq!(config, CloneConfig::default());
        assert_eq!(config.mode, CloneMode::Lenient);
        assert_eq!(config.visited_capacity, 16);
    }

    #[test]
    fn test_parse() {
        let config =
            CloneConfig::from_toml_str("mode = \"strict\"\nvisited_capacity = 128\n").unwrap();
        assert_eq!(config.mode, CloneMode::Strict);
        assert_eq!(config.visited_capacity, 128);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = CloneConfig::from_toml_str("mode = \"paranoid\"").unwrap_err();
        assert!(matches!(err, CloneError::Config(_)));
        assert!(err.path().is_none());
    }
}
