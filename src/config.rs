//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::btree::Key;
use crate::tiered::TieringParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub tiering: TieringParams,

    #[serde(default)]
    pub workload: WorkloadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Shape of the two underlying indexes
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Keys live in `[0, max_key]`
    #[serde(default = "default_max_key")]
    pub max_key: Key,

    /// B-tree minimum degree for both tiers
    #[serde(default = "default_branching_factor")]
    pub branching_factor: usize,
}

fn default_max_key() -> Key {
    1_000_000
}

fn default_branching_factor() -> usize {
    16
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_key: default_max_key(),
            branching_factor: default_branching_factor(),
        }
    }
}

/// Synthetic workload run by the `hctree` binary
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    /// Keys inserted before querying (spread over the domain)
    #[serde(default = "default_keys")]
    pub keys: u64,

    /// Point lookups to issue
    #[serde(default = "default_queries")]
    pub queries: u64,

    /// Fraction of inserted keys forming the hotspot
    #[serde(default = "default_hot_key_fraction")]
    pub hot_key_fraction: f64,

    /// Fraction of lookups that target the hotspot
    #[serde(default = "default_hot_access_ratio")]
    pub hot_access_ratio: f64,

    /// Issue a range scan every N lookups (0 disables)
    #[serde(default)]
    pub range_every: u64,

    /// Width of each range scan
    #[serde(default = "default_range_width")]
    pub range_width: u64,

    /// Seed for key and query generation
    #[serde(default = "default_workload_seed")]
    pub seed: u64,
}

fn default_keys() -> u64 {
    100_000
}

fn default_queries() -> u64 {
    1_000_000
}

fn default_hot_key_fraction() -> f64 {
    0.05
}

fn default_hot_access_ratio() -> f64 {
    0.8
}

fn default_range_width() -> u64 {
    100
}

fn default_workload_seed() -> u64 {
    42
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            queries: default_queries(),
            hot_key_fraction: default_hot_key_fraction(),
            hot_access_ratio: default_hot_access_ratio(),
            range_every: 0,
            range_width: default_range_width(),
            seed: default_workload_seed(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("hctree").join("config.toml")),
            Some(PathBuf::from("/etc/hctree/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Index overrides
        if let Some(max_key) = env_parse("HCTREE_MAX_KEY") {
            self.index.max_key = max_key;
        }
        if let Some(branching_factor) = env_parse("HCTREE_BRANCHING_FACTOR") {
            self.index.branching_factor = branching_factor;
        }

        // Tiering overrides
        if let Some(rate) = env_parse("HCTREE_SAMPLING_RATE") {
            self.tiering.sampling_rate = rate;
        }
        if let Some(adapt) = env_parse("HCTREE_ADAPT_SAMPLING") {
            self.tiering.adapt_sampling = adapt;
        }
        if let Some(seed) = env_parse("HCTREE_SEED") {
            self.tiering.seed = Some(seed);
        }

        // Logging overrides
        if let Ok(level) = std::env::var("HCTREE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HCTREE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Read and parse an environment variable, ignoring unparsable values
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", name, raw);
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# hctree Configuration
#
# Environment variables override these settings:
# - HCTREE_MAX_KEY
# - HCTREE_BRANCHING_FACTOR
# - HCTREE_SAMPLING_RATE
# - HCTREE_ADAPT_SAMPLING
# - HCTREE_SEED
# - HCTREE_LOG_LEVEL
# - HCTREE_LOG_FORMAT

[index]
# Keys live in [0, max_key]
max_key = 1000000

# B-tree minimum degree for both tiers
branching_factor = 16

[tiering]
# Let the controller retune sampling_rate every 5000 lookups
adapt_sampling = true

# Probability that an eligible cold hit is considered for promotion
sampling_rate = 0.1

# Weight kept from the previous hit score on each hit
decay_alpha = 0.9

# Hit score needed before a cold hit may be promoted
hot_threshold = 3.0

# Hot tier holds at most this fraction of the key domain
max_hot_fraction = 0.1

# Only inclusive tiering is supported
inclusive = true

# Seed for the promotion RNG (omit for entropy)
# seed = 42

[workload]
# Keys inserted before querying
keys = 100000

# Point lookups to issue
queries = 1000000

# Fraction of keys forming the hotspot
hot_key_fraction = 0.05

# Fraction of lookups aimed at the hotspot
hot_access_ratio = 0.8

# Range scan every N lookups (0 disables)
range_every = 0

# Keys covered by each range scan
range_width = 100

# Seed for key and query generation
seed = 42

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.index.max_key, 1_000_000);
        assert_eq!(config.index.branching_factor, 16);
        assert!(config.tiering.inclusive);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.workload.range_every, 0);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.index.max_key, 1_000_000);
        assert_eq!(config.tiering.sampling_rate, 0.1);
        assert_eq!(config.tiering.hot_threshold, 3.0);
        assert_eq!(config.tiering.seed, None);
        assert_eq!(config.workload.keys, 100_000);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.tiering.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [index]
            max_key = 99

            [tiering]
            sampling_rate = 1.0
            seed = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.index.max_key, 99);
        assert_eq!(config.index.branching_factor, 16);
        assert_eq!(config.tiering.sampling_rate, 1.0);
        assert_eq!(config.tiering.seed, Some(3));
        assert_eq!(config.tiering.decay_alpha, 0.9);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[index]\nbranching_factor = 4").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.index.branching_factor, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/hctree.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[index]\nmax_key = \"lots\"").unwrap();

        match Config::load(file.path()).unwrap_err() {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {}", other),
        }
    }
}
