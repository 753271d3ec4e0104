//! Tuning parameters for the intersection kernel.
//!
//! Everything has a default matching the values the simulator has always
//! used, so an empty TOML document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level kernel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Bezier subdivision engine settings.
    pub bezier: BezierConfig,
}

/// Settings for the Bezier patch subdivision engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BezierConfig {
    /// Number of candidate patches a single query may hold at once.
    pub candidate_capacity: usize,
    /// Subdivision depth below which a patch is always split further
    /// unless it is already flat.
    pub min_isect_recurse: u32,
    /// Squared distance accepted unconditionally as a surface hit.
    pub tight_dist_sq: f64,
    /// Squared distance accepted when the patch is also flat.
    pub loose_dist_sq: f64,
    /// Depth extent under which a patch counts as flat.
    pub flat_depth: f64,
    /// Patches whose in-plane extents sum below this are discarded.
    pub min_patch_extent: f64,
    /// Subdivision rounds allowed while building leaf patches.
    pub max_construction_rounds: u32,
}

impl Default for BezierConfig {
    fn default() -> Self {
        Self {
            candidate_capacity: 192,
            min_isect_recurse: 18,
            tight_dist_sq: 1e-13,
            loose_dist_sq: 1e-8,
            flat_depth: 1e-8,
            min_patch_extent: 1e-14,
            max_construction_rounds: 8,
        }
    }
}

impl KernelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: KernelConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bezier;
        if b.candidate_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bezier.candidate_capacity",
                reason: "must be at least 1".into(),
            });
        }
        for (field, value) in [
            ("bezier.tight_dist_sq", b.tight_dist_sq),
            ("bezier.loose_dist_sq", b.loose_dist_sq),
            ("bezier.flat_depth", b.flat_depth),
            ("bezier.min_patch_extent", b.min_patch_extent),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be positive and finite, got {value}"),
                });
            }
        }
        if b.tight_dist_sq > b.loose_dist_sq {
            return Err(ConfigError::InvalidValue {
                field: "bezier.tight_dist_sq",
                reason: "must not exceed bezier.loose_dist_sq".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = KernelConfig::from_toml_str("").unwrap();
        assert_eq!(config, KernelConfig::default());
        assert_eq!(config.bezier.candidate_capacity, 192);
        assert_eq!(config.bezier.min_isect_recurse, 18);
        assert_eq!(config.bezier.max_construction_rounds, 8);
    }

    #[test]
    fn test_partial_override() {
        let config = KernelConfig::from_toml_str(
            r#"
            [bezier]
            candidate_capacity = 64
            loose_dist_sq = 1e-6
            "#,
        )
        .unwrap();
        assert_eq!(config.bezier.candidate_capacity, 64);
        assert_eq!(config.bezier.loose_dist_sq, 1e-6);
        assert_eq!(config.bezier.tight_dist_sq, 1e-13);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = KernelConfig::from_toml_str("[bezier]\ncandidate_capacity = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "bezier.candidate_capacity",
                ..
            }
        ));

        let err = KernelConfig::from_toml_str("[bezier]\nflat_depth = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("bezier.flat_depth"));

        let err = KernelConfig::from_toml_str("[bezier]\ncandidate_capacity = \"many\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = KernelConfig::default();
        config.bezier.min_isect_recurse = 12;
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("min_isect_recurse"));
        let parsed: KernelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
