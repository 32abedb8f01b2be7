//! Configuration loading and typed config structures for the flash sale
//! simulator.
//!
//! The canonical configuration lives in `flashsale-config.yaml` in the
//! working directory. Every field has a default matching the stock
//! scenario (four regions with five units each, one tick per second), so
//! an empty or missing file is a valid configuration.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

/// Minimum accepted tick interval in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable setup.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `flashsale-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FlashSaleConfig {
    /// Tick cadence, seed, and run bounds.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Regions and starting stock.
    #[serde(default)]
    pub store: StoreConfig,

    /// Dashboard server settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FlashSaleConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `FLASHSALE_OBSERVER_PORT` overrides `observer.port`
    /// - `FLASHSALE_SEED` overrides `simulation.seed`
    ///
    /// The result is validated before it is returned.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Unlike [`from_file`](Self::from_file) this does not consult the
    /// environment.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("FLASHSALE_OBSERVER_PORT") {
            self.observer.port = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("FLASHSALE_OBSERVER_PORT={val:?} is not a port: {e}"),
            })?;
        }
        if let Ok(val) = std::env::var("FLASHSALE_SEED") {
            let seed = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("FLASHSALE_SEED={val:?} is not a u64: {e}"),
            })?;
            self.simulation.seed = Some(seed);
        }
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.store.validate()
    }
}

/// Tick cadence and run bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds between refresh cycles.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Random seed for reproducible runs. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Stop after this many advanced ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "simulation.tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS} (got {})",
                    self.tick_interval_ms
                ),
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            max_ticks: 0,
            max_real_time_seconds: 0,
        }
    }
}

/// Regions and starting stock.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Region names in display order.
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,

    /// Units each region starts with.
    #[serde(default = "default_initial_inventory")]
    pub initial_inventory: u32,
}

impl StoreConfig {
    /// Reject empty, blank, or duplicate region names.
    ///
    /// Region selection is undefined without at least one region, so the
    /// engine refuses to start rather than skipping ticks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_region_names(self.regions.iter().map(String::as_str))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            initial_inventory: default_initial_inventory(),
        }
    }
}

/// Check a list of region names for emptiness, blanks, and duplicates.
pub fn validate_region_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "region names must not be blank".to_owned(),
            });
        }
        if !seen.insert(name) {
            return Err(ConfigError::Invalid {
                reason: format!("duplicate region: {name}"),
            });
        }
    }
    if seen.is_empty() {
        return Err(ConfigError::Invalid {
            reason: "at least one region must be configured".to_owned(),
        });
    }
    Ok(())
}

/// Dashboard server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Address to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit newline-delimited JSON instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_regions() -> Vec<String> {
    ["North", "South", "East", "West"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

const fn default_initial_inventory() -> u32 {
    5
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FlashSaleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.tick_interval_ms, 1000);
        assert_eq!(config.store.regions, vec!["North", "South", "East", "West"]);
        assert_eq!(config.store.initial_inventory, 5);
        assert_eq!(config.observer.port, 8080);
        assert!(config.simulation.seed.is_none());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  tick_interval_ms: 250
  seed: 99
  max_ticks: 40
  max_real_time_seconds: 600

store:
  regions:
    - Pacific
    - Mountain
  initial_inventory: 12

observer:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
  json: true
"#;

        let config = FlashSaleConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.simulation.tick_interval_ms, 250);
        assert_eq!(config.simulation.seed, Some(99));
        assert_eq!(config.simulation.max_ticks, 40);
        assert_eq!(config.store.regions, vec!["Pacific", "Mountain"]);
        assert_eq!(config.store.initial_inventory, 12);
        assert_eq!(config.observer.host, "127.0.0.1");
        assert_eq!(config.observer.port, 9090);
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "store:\n  initial_inventory: 2\n";
        let config = FlashSaleConfig::parse(yaml).ok().unwrap_or_default();

        assert_eq!(config.store.initial_inventory, 2);
        // Everything else uses defaults
        assert_eq!(config.store.regions.len(), 4);
        assert_eq!(config.simulation.tick_interval_ms, 1000);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(FlashSaleConfig::parse("").is_ok());
    }

    #[test]
    fn empty_region_list_is_rejected() {
        let result = FlashSaleConfig::parse("store:\n  regions: []\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn duplicate_region_is_rejected() {
        let result = FlashSaleConfig::parse("store:\n  regions: [North, North]\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn blank_region_is_rejected() {
        assert!(validate_region_names(["North", "  "]).is_err());
    }

    #[test]
    fn too_fast_tick_interval_is_rejected() {
        let result = FlashSaleConfig::parse("simulation:\n  tick_interval_ms: 10\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = FlashSaleConfig::parse("store: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("flashsale-config.yaml");
        if path.exists() {
            let config = FlashSaleConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
