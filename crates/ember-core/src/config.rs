//! Runtime configuration (`ember.toml`) parsing and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{0}': {1}")]
    Invalid(&'static str, &'static str),
}

/// Tunables for a [`VmState`](crate::vm::VmState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Live GC entries allowed before the first sweep.
    pub gc_start: u32,

    /// Factor applied to the threshold when a sweep frees nothing.
    pub gc_multiplier: u32,

    /// Registers allocated up front.
    pub initial_registers: usize,

    /// Deepest call chain allowed before raising a recursion error.
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gc_start: 100,
            gc_multiplier: 4,
            initial_registers: 100,
            max_call_depth: 100,
        }
    }
}

impl RuntimeConfig {
    /// Load a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value is out of range.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gc_start == 0 {
            return Err(ConfigError::Invalid("gc_start", "must be at least 1"));
        }
        if self.gc_multiplier < 2 {
            return Err(ConfigError::Invalid(
                "gc_multiplier",
                "must be at least 2 so unproductive sweeps back off",
            ));
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid("max_call_depth", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.gc_start, 100);
        assert_eq!(config.gc_multiplier, 4);
    }

    #[test]
    fn test_parse_partial() {
        let config = RuntimeConfig::parse("gc_start = 8\n").unwrap();
        assert_eq!(config.gc_start, 8);
        assert_eq!(config.gc_multiplier, 4);
        assert_eq!(config.max_call_depth, 100);
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(RuntimeConfig::parse("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RuntimeConfig::parse("gc_stat = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }

    #[test]
    fn test_invalid_multiplier() {
        let err = RuntimeConfig::parse("gc_multiplier = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("gc_multiplier", _)));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = RuntimeConfig::parse("gc_start = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("gc_start", _)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_call_depth = 12\ninitial_registers = 4").unwrap();

        let config = RuntimeConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_call_depth, 12);
        assert_eq!(config.initial_registers, 4);
    }

    #[test]
    fn test_from_missing_path() {
        let err = RuntimeConfig::from_path("/nonexistent/ember.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
