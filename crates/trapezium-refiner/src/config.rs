//! Configuration for refinement runs
//!
//! Integration bounds, pool size, convergence precision and safety caps.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use trapezium_domain::Interval;

/// Configuration loading/validation error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Configuration for a [`Refiner`](crate::Refiner)
///
/// # Examples
///
/// ```
/// use trapezium_refiner::RefinerConfig;
///
/// // Default configuration: [2, 20], 4 decimal digits
/// let config = RefinerConfig::default();
/// assert_eq!(config.precision_digits, 4);
///
/// // Quick, loose estimate
/// let config = RefinerConfig::coarse();
/// assert_eq!(config.precision_digits, 2);
///
/// // Tighter convergence
/// let config = RefinerConfig::fine();
/// assert_eq!(config.precision_digits, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinerConfig {
    /// Lower integration bound
    /// Default: 2.0
    #[serde(default = "default_lower")]
    pub lower: f64,

    /// Upper integration bound
    /// Default: 20.0
    #[serde(default = "default_upper")]
    pub upper: f64,

    /// Number of concurrent workers
    /// Default: None (available processing units)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Partition count of the first iteration
    /// Default: 1
    #[serde(default = "default_initial_partitions")]
    pub initial_partitions: usize,

    /// Decimal digits two consecutive estimates must agree on
    /// Default: 4
    #[serde(default = "default_precision_digits")]
    pub precision_digits: u32,

    /// Hard cap on iterations before the run is aborted
    /// Default: 100000
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Consecutive degraded iterations tolerated before aborting
    /// Default: 10
    #[serde(default = "default_max_degraded_streak")]
    pub max_degraded_streak: usize,
}

fn default_lower() -> f64 {
    2.0
}

fn default_upper() -> f64 {
    20.0
}

fn default_initial_partitions() -> usize {
    1
}

fn default_precision_digits() -> u32 {
    4
}

fn default_max_iterations() -> usize {
    100_000
}

fn default_max_degraded_streak() -> usize {
    10
}

/// Beyond this, rounding no longer changes an f64 of ordinary magnitude
const MAX_PRECISION_DIGITS: u32 = 12;

impl Default for RefinerConfig {
    /// Integrate over `[2, 20]` to 4 decimal places on every available core
    fn default() -> Self {
        Self {
            lower: default_lower(),
            upper: default_upper(),
            workers: None,
            initial_partitions: default_initial_partitions(),
            precision_digits: default_precision_digits(),
            max_iterations: default_max_iterations(),
            max_degraded_streak: default_max_degraded_streak(),
        }
    }
}

impl RefinerConfig {
    /// Loose convergence (2 decimal digits) for quick estimates
    pub fn coarse() -> Self {
        Self {
            precision_digits: 2,
            max_iterations: 10_000,
            ..Self::default()
        }
    }

    /// Tight convergence (6 decimal digits)
    pub fn fine() -> Self {
        Self {
            precision_digits: 6,
            ..Self::default()
        }
    }

    /// Same settings over different bounds
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RefinerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The integration interval described by `lower`/`upper`
    pub fn interval(&self) -> Result<Interval, ConfigError> {
        Interval::new(self.lower, self.upper).map_err(|e| ConfigError::Invalid {
            field: "lower/upper",
            reason: e.to_string(),
        })
    }

    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interval()?;

        if self.workers == Some(0) {
            return Err(invalid("workers", "must be at least 1"));
        }
        if self.initial_partitions == 0 {
            return Err(invalid("initial_partitions", "must be at least 1"));
        }
        if self.precision_digits > MAX_PRECISION_DIGITS {
            return Err(invalid(
                "precision_digits",
                format!("must be at most {}", MAX_PRECISION_DIGITS),
            ));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be at least 1"));
        }
        if self.max_degraded_streak == 0 {
            return Err(invalid("max_degraded_streak", "must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RefinerConfig::default();
        assert_eq!(config.lower, 2.0);
        assert_eq!(config.upper, 20.0);
        assert_eq!(config.workers, None);
        assert_eq!(config.initial_partitions, 1);
        assert_eq!(config.precision_digits, 4);
        assert_eq!(config.max_iterations, 100_000);
        assert_eq!(config.max_degraded_streak, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let coarse = RefinerConfig::coarse();
        let fine = RefinerConfig::fine();
        assert!(coarse.precision_digits < RefinerConfig::default().precision_digits);
        assert!(fine.precision_digits > RefinerConfig::default().precision_digits);
        assert!(coarse.validate().is_ok());
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn test_with_bounds() {
        let config = RefinerConfig::default().with_bounds(-1.0, 1.0);
        assert_eq!(config.interval().unwrap().length(), 2.0);
    }

    #[test]
    fn test_invalid_bounds() {
        let config = RefinerConfig::default().with_bounds(5.0, 1.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lower/upper", .. }));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = RefinerConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "workers", .. })
        ));
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let config = RefinerConfig {
            initial_partitions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_excessive_precision_rejected() {
        let config = RefinerConfig {
            precision_digits: 20,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            lower = 0.0
            upper = 3.5
            workers = 4
            precision_digits = 5
        "#;

        let config = RefinerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.lower, 0.0);
        assert_eq!(config.upper, 3.5);
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.precision_digits, 5);
        // Defaults fill the rest
        assert_eq!(config.initial_partitions, 1);
        assert_eq!(config.max_iterations, 100_000);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        assert_eq!(RefinerConfig::from_toml_str("").unwrap(), RefinerConfig::default());
    }

    #[test]
    fn test_parse_toml_rejects_invalid_values() {
        let toml = r#"
            lower = 1.0
            upper = 1.0
        "#;
        assert!(matches!(
            RefinerConfig::from_toml_str(toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        assert!(matches!(
            RefinerConfig::from_toml_str("lower = "),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lower = -2.0\nupper = 2.0\nmax_iterations = 50").unwrap();

        let config = RefinerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.lower, -2.0);
        assert_eq!(config.max_iterations, 50);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RefinerConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::FileRead(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = RefinerConfig::fine();
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: RefinerConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
