//! Configuration for the schema validator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-validator.toml)
//! - Environment variables (DYNAMO_SCHEMA__*)
//!
//! ## Example config file (schema-validator.toml):
//! ```toml
//! [validation]
//! reject_nested_persisted_names = true
//! reject_empty_persisted_names = true
//! max_depth = 64
//! validate_custom_keys = true
//!
//! [output]
//! format = "text"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::validate::{ValidationOptions, Validator};

const CONFIG_NAME: &str = "schema-validator.toml";

/// Main configuration for the validator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Validation settings
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print a line for valid files as well as invalid ones
    #[serde(default)]
    pub show_valid: bool,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per violation
    #[default]
    Text,
    /// Pretty-printed JSON
    Pretty,
    /// Single-line JSON
    Compact,
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-validator.toml",
            ".schema-validator.toml",
            "config/schema-validator.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "dynamo-schema", "schema-validator") {
            let xdg_config = config_dir.config_dir().join(CONFIG_NAME);
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // DYNAMO_SCHEMA__VALIDATION__MAX_DEPTH=32
        builder = builder.add_source(
            Environment::with_prefix("DYNAMO_SCHEMA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a validator with these settings
    pub fn validator(&self) -> Validator {
        Validator::new(self.validation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.validation, ValidationOptions::default());
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_serialize_config() {
        let config = ValidatorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[validation]\nreject_nested_persisted_names = true\nmax_depth = 8\n\n[output]\nformat = \"compact\"\n",
        )
        .unwrap();

        let config = ValidatorConfig::load_from(Some(&path)).unwrap();
        assert!(config.validation.reject_nested_persisted_names);
        assert!(!config.validation.reject_empty_persisted_names);
        assert_eq!(config.validation.max_depth, Some(8));
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert_eq!(config.validator().options().max_depth, Some(8));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ValidatorConfig::default();
        config.validation = ValidationOptions::strict();
        config.save(&path).unwrap();

        let loaded = ValidatorConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.validation, ValidationOptions::strict());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ValidatorConfig::load_from(Some(&missing)).unwrap_err();
        assert!(matches!(err, crate::error::SchemaError::Config(_)));
    }

    #[test]
    fn test_load_custom_keys_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[validation]\nvalidate_custom_keys = true\n").unwrap();

        let config = ValidatorConfig::load_from(Some(&path)).unwrap();
        assert!(config.validation.validate_custom_keys);
        assert!(!config.validation.reject_nested_persisted_names);
    }
}
