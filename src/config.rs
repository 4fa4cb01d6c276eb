//! Solver configuration.
//!
//! Every tunable constant of the four heuristics lives here instead of in
//! process-wide globals. A configuration can be loaded from TOML or JSON;
//! missing fields fall back to the compiled-in defaults.
//!
//! ```
//! use tsp_metaheuristics::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     kmax = 5
//!     cooling_rate = 0.99
//! "#).unwrap();
//!
//! assert_eq!(config.kmax, 5);
//! assert_eq!(config.population_size, 50);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default capacity bound on the number of nodes in an instance.
pub const DEFAULT_MAX_NODES: usize = 1400;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters for all four heuristics plus the capacity bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Number of tours kept by the partition crossover.
    pub population_size: usize,
    /// Generation cap for the partition crossover.
    pub max_generations: usize,
    /// Absolute tour length below which the crossover stops early.
    pub fitness_threshold: f64,
    /// Starting temperature of the annealing schedule.
    pub initial_temperature: f64,
    /// Geometric cooling factor applied after each temperature step.
    pub cooling_rate: f64,
    /// Temperature at which annealing stops.
    pub min_temperature: f64,
    /// Random 2-opt moves tried at each temperature.
    pub max_anneal_iterations: usize,
    /// Largest shake intensity used by VNS.
    pub kmax: usize,
    /// Outer passes of VNS.
    pub max_vns_iterations: usize,
    /// Loop bound for Lin-Kernighan.
    pub max_lk_iterations: usize,
    /// Let Lin-Kernighan move on to the next anchor instead of stopping
    /// when the current one is exhausted.
    pub lk_advance_anchor: bool,
    /// Largest instance any algorithm accepts.
    pub max_nodes: usize,
    /// Seed for the random source. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            population_size: 50,
            max_generations: 1000,
            fitness_threshold: 0.01,
            initial_temperature: 1000.0,
            cooling_rate: 0.999,
            min_temperature: 0.01,
            max_anneal_iterations: 1000,
            kmax: 10,
            max_vns_iterations: 100,
            max_lk_iterations: 1000,
            lk_advance_anchor: false,
            max_nodes: DEFAULT_MAX_NODES,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file, choosing the format from its extension.
    ///
    /// `.json` files are read as JSON, everything else as TOML. The result is
    /// validated before it is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Rejects parameter sets under which an algorithm would never terminate
    /// or could not run at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if !(self.min_temperature > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_temperature must be positive, got {}",
                self.min_temperature
            )));
        }
        if !(self.initial_temperature > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        if self.population_size < 2 {
            return Err(ConfigError::Invalid(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.kmax == 0 {
            return Err(ConfigError::Invalid("kmax must be at least 1".to_string()));
        }
        if self.max_nodes == 0 {
            return Err(ConfigError::Invalid("max_nodes must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = SolverConfig::default();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.kmax, 10);
        assert_eq!(config.max_vns_iterations, 100);
        assert_eq!(config.max_lk_iterations, 1000);
        assert!(!config.lk_advance_anchor);
        assert_eq!(config.max_nodes, 1400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SolverConfig::from_toml_str("max_generations = 10\nseed = 7\n").unwrap();
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.cooling_rate, 0.999);
    }

    #[test]
    fn test_json_config() {
        let config = SolverConfig::from_json_str(r#"{"kmax": 3, "min_temperature": 0.5}"#).unwrap();
        assert_eq!(config.kmax, 3);
        assert_eq!(config.min_temperature, 0.5);
        assert_eq!(config.population_size, 50);
    }

    #[test]
    fn test_invalid_cooling_rate_rejected() {
        let config = SolverConfig {
            cooling_rate: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_tiny_population_rejected() {
        let config = SolverConfig {
            population_size: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(matches!(
            SolverConfig::from_toml_str("kmax = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
