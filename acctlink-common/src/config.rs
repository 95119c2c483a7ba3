//! Configuration loading
//!
//! Bootstrap configuration is a single optional TOML file. Every field has a
//! built-in default, so a missing file (or a missing section) degrades to
//! defaults with a warning instead of failing the run.
//!
//! # Config file resolution priority
//!
//! 1. Command-line argument (highest priority)
//! 2. `ACCTLINK_CONFIG` environment variable
//! 3. `<config_dir>/acctlink/acctlink.toml` if it exists
//! 4. Compiled defaults (fallback)

use crate::key::{KeyNormalizer, DEFAULT_KEY_PREFIXES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "ACCTLINK_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcctlinkConfig {
    pub linking: LinkingConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// Which opportunity becomes primary when several share one order number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// First in input order wins (extras kept as conflicts)
    #[default]
    KeepFirst,
    /// Last in input order wins (extras kept as conflicts)
    KeepLast,
}

/// Linking engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Order number prefixes removed before matching (case-insensitive)
    pub strip_prefixes: Vec<String>,
    /// "000123" and "123" are the same order
    pub strip_leading_zeros: bool,
    /// Compare keys case-insensitively
    pub uppercase_keys: bool,
    pub duplicate_opportunity_policy: DuplicatePolicy,
    /// Orphan share (per source) above which the linker logs a warning
    pub orphan_warning_ratio: f64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            strip_prefixes: DEFAULT_KEY_PREFIXES.iter().map(|p| p.to_string()).collect(),
            strip_leading_zeros: true,
            uppercase_keys: true,
            duplicate_opportunity_policy: DuplicatePolicy::KeepFirst,
            orphan_warning_ratio: 0.25,
        }
    }
}

impl LinkingConfig {
    pub fn key_normalizer(&self) -> KeyNormalizer {
        KeyNormalizer::new(
            &self.strip_prefixes,
            self.strip_leading_zeros,
            self.uppercase_keys,
        )
    }
}

/// Metrics engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Deployment score (0-100) a deployment must exceed to count as successful
    pub deployment_success_threshold: u8,
    pub journey_weights: JourneyWeights,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            deployment_success_threshold: 70,
            journey_weights: JourneyWeights::default(),
        }
    }
}

/// Weight table for the derived journey health score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyWeights {
    pub expectation: f64,
    pub deployment: f64,
    pub support: f64,
}

impl Default for JourneyWeights {
    fn default() -> Self {
        Self {
            expectation: 0.40,
            deployment: 0.35,
            support: 0.25,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AcctlinkConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AcctlinkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; a missing file yields defaults with a warning
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file location and load it
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => Self::load_or_default(&path),
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the engines cannot interpret
    pub fn validate(&self) -> Result<()> {
        if self.metrics.deployment_success_threshold > 100 {
            return Err(Error::Config(format!(
                "metrics.deployment_success_threshold must be 0-100, got {}",
                self.metrics.deployment_success_threshold
            )));
        }

        let w = &self.metrics.journey_weights;
        let weights = [w.expectation, w.deployment, w.support];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config(
                "metrics.journey_weights must be finite and non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(Error::Config(
                "metrics.journey_weights must not all be zero".to_string(),
            ));
        }

        let ratio = self.linking.orphan_warning_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::Config(format!(
                "linking.orphan_warning_ratio must be 0.0-1.0, got {}",
                ratio
            )));
        }

        Ok(())
    }
}

/// Config file location following the priority order above
///
/// Steps 1 and 2 are returned even if the file does not exist, so that
/// [`AcctlinkConfig::load_or_default`] can warn about it.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file
    default_config_file().filter(|p| p.exists())
}

/// `<config_dir>/acctlink/acctlink.toml` for the current platform
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("acctlink").join("acctlink.toml"))
}
