//! Configuration loading and typed config structures for the Wa-Tor simulation.
//!
//! The canonical configuration lives in `wator-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader, a saver, and conversion into validated
//! [`SimulationParameters`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wator_types::SimulationParameters;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV_VAR: &str = "WATOR_SEED";

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or render YAML content.
    #[error("failed to process config YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// The configured simulation parameters are invalid.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// Refused to overwrite an existing configuration file.
    #[error("config file {} already exists; set overwrite to replace it", .path.display())]
    AlreadyExists {
        /// The existing file.
        path: PathBuf,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `wator-config.yaml`. Every section is optional
/// and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatorConfig {
    /// World-level settings (name, seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// Grid and per-species lifecycle parameters.
    #[serde(default)]
    pub parameters: SimulationParameters,

    /// Run-loop bounds and pacing.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WatorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `WATOR_SEED` environment variable overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        tracing::info!(path = %path.display(), "Read simulation config");
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Render the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Write the configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if the file exists and
    /// `overwrite` is false, or an I/O or YAML error.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<(), ConfigError> {
        if path.is_file() && !overwrite {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        std::fs::write(path, self.to_yaml()?)?;
        tracing::info!(path = %path.display(), "Saved simulation config");
        Ok(())
    }

    /// Return the simulation parameters after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if any parameter constraint fails.
    pub fn simulation_parameters(&self) -> Result<SimulationParameters, ConfigError> {
        self.parameters
            .validate()
            .map_err(|e| ConfigError::Invalid { reason: e.reason })?;
        Ok(self.parameters)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            self.world.apply_seed_override(&val);
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl WorldConfig {
    /// Replace the seed with a textual override. Unparseable values are
    /// ignored with a warning.
    pub fn apply_seed_override(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = Some(seed),
            Err(e) => tracing::warn!(value = raw, error = %e, "Ignoring invalid seed override"),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
        }
    }
}

/// Run-loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of turns to play (0 = until extinction).
    #[serde(default = "default_max_turns")]
    pub max_turns: u64,

    /// Real-time milliseconds to wait between turns.
    #[serde(default)]
    pub turn_interval_ms: u64,

    /// Where to write a JSON snapshot of the store when the run ends.
    #[serde(default)]
    pub export_path: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            turn_interval_ms: 0,
            export_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_world_name() -> String {
    String::from("wa-tor")
}

const fn default_max_turns() -> u64 {
    100
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WatorConfig::default();
        assert_eq!(config.world.name, "wa-tor");
        assert_eq!(config.runner.max_turns, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.simulation_parameters().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  name: reef
  seed: 123

parameters:
  grid_size: 12
  prey:
    initial_count: 30
    breed_maturity: 2
    breed_probability: 75
    speed: 1
  predator:
    initial_count: 6
    breed_maturity: 5
    breed_probability: 30
    speed: 2
  starving_threshold: 3

runner:
  max_turns: 40
  turn_interval_ms: 10
  export_path: run.json

logging:
  level: debug
";
        let config = WatorConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "reef");
        assert_eq!(config.parameters.grid_size, 12);
        assert_eq!(config.parameters.prey.breed_probability, 75);
        assert_eq!(config.parameters.predator.speed, 2);
        assert_eq!(config.parameters.starving_threshold, 3);
        assert_eq!(config.runner.max_turns, 40);
        assert_eq!(config.runner.export_path, Some(PathBuf::from("run.json")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = WatorConfig::parse("runner:\n  max_turns: 5\n").unwrap();
        assert_eq!(config.runner.max_turns, 5);
        assert_eq!(config.runner.turn_interval_ms, 0);
        assert_eq!(config.parameters, SimulationParameters::default());
    }

    #[test]
    fn partial_species_block_fills_remaining_fields() {
        let config = WatorConfig::parse("parameters:\n  prey:\n    breed_probability: 50\n").unwrap();
        let defaults = SimulationParameters::default();
        assert_eq!(config.parameters.prey.breed_probability, 50);
        assert_eq!(config.parameters.prey.initial_count, defaults.prey.initial_count);
        assert_eq!(config.parameters.prey.breed_maturity, defaults.prey.breed_maturity);
        assert_eq!(config.parameters.predator, defaults.predator);
        assert!(config.simulation_parameters().is_ok());
    }

    #[test]
    fn invalid_parameters_are_reported() {
        let yaml = "parameters:\n  grid_size: 2\n";
        let config = WatorConfig::parse(yaml).unwrap();
        let err = config.simulation_parameters().err().unwrap();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = WatorConfig::parse("parameters: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn seed_override_parses_or_is_ignored() {
        let mut world = WorldConfig::default();
        world.apply_seed_override("77");
        assert_eq!(world.seed, Some(77));
        world.apply_seed_override("not-a-number");
        assert_eq!(world.seed, Some(77));
    }

    #[test]
    fn save_refuses_to_overwrite_without_flag() {
        let path = std::env::temp_dir().join(format!(
            "wator-config-test-{}.yaml",
            std::process::id()
        ));
        let mut config = WatorConfig::default();
        config.world.seed = Some(9);
        config.save(&path, true).unwrap();

        let err = config.save(&path, false).err().unwrap();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let reloaded: WatorConfig = serde_yml::from_str(&contents).unwrap();
        assert_eq!(reloaded, config);
    }
}
