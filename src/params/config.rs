//! File-backed configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AnalyserConfig, GridShape, Parameters};
use crate::error::Result;

/// Complete reactor configuration, loadable from TOML
///
/// Every section is optional in the file; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    pub reaction: Parameters,
    pub grid: GridShape,
    pub analyser: AnalyserConfig,
    /// Default tracing directive (overridden by `RUST_LOG`)
    pub log_level: String,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            reaction: Parameters::default(),
            grid: GridShape::default(),
            analyser: AnalyserConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ReactorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.reaction.validate()?;
        self.grid.validate()?;
        self.analyser.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ReactionMode;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ReactorConfig::from_toml_str(
            r#"
            [reaction]
            amplitude = 8.0
            reaction_mode = "deformation"

            [grid]
            subdivisions = 32
            "#,
        )
        .unwrap();

        assert_eq!(config.reaction.amplitude, 8.0);
        assert_eq!(config.reaction.reaction_mode, ReactionMode::Deformation);
        assert_eq!(config.reaction.decay, Parameters::default().decay);
        assert_eq!(config.grid.subdivisions, 32);
        assert_eq!(config.grid.size, GridShape::default().size);
        assert_eq!(config.analyser, AnalyserConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(
            ReactorConfig::from_toml_str("").unwrap(),
            ReactorConfig::default()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ReactorConfig::from_toml_str("[reaction]\ndecay = 1.5\n");
        assert!(err.is_err());

        let err = ReactorConfig::from_toml_str("[grid]\nsubdivisions = 0\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = ReactorConfig::from_toml_str("[reaction\namplitude = ").unwrap_err();
        assert!(matches!(err, crate::error::ReactorError::Config(_)));
    }
}
