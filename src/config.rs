// src/config.rs
//! Conversion limits and policies

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Default container nesting limit, in both directions.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings shared by import and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Deepest container nesting accepted before failing with
    /// `DepthLimitExceeded`. The outermost array or object counts as 1.
    pub max_depth: usize,

    /// Drop object properties whose value is `undefined` on export instead
    /// of exporting them as null.
    pub skip_undefined_properties: bool,

    /// Track the objects on the current export path and fail on re-entry.
    pub detect_cycles: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            skip_undefined_properties: false,
            detect_cycles: true,
        }
    }
}

impl BridgeConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_skip_undefined_properties(mut self, skip: bool) -> Self {
        self.skip_undefined_properties = skip;
        self
    }

    pub fn with_detect_cycles(mut self, detect: bool) -> Self {
        self.detect_cycles = detect;
        self
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.detect_cycles);
        assert!(!config.skip_undefined_properties);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = BridgeConfig::from_json(r#"{"max_depth": 16}"#).unwrap();
        assert_eq!(config.max_depth, 16);
        assert!(config.detect_cycles);
    }

    #[test]
    fn test_from_json_rejects_zero_depth() {
        let err = BridgeConfig::from_json(r#"{"max_depth": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = BridgeConfig::from_json("{max_depth").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
