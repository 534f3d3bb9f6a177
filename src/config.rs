//! # Balancer configuration
//!
//! ## Purpose
//! Keeps the tunable parameters of the balancer in one serializable structure
//! and persists them as JSON (`balancer_config.json` by default).
//!
//! ## Configuration Format
//! ```json
//! {
//!   "brute_force_limit": 15,
//!   "enable_linear_solver": true,
//!   "enable_brute_force": true,
//!   "log_level": "info",
//!   "log_file": null
//! }
//! ```
//! Missing keys take their default values.
//!
//! ## Usage
//! ```no_run
//! use chem_balance::config::ConfigManager;
//!
//! let mut manager = ConfigManager::with_config_file("balancer_config.json").unwrap();
//! manager.set_brute_force_limit(20).unwrap();
//! let config = manager.get_config().clone();
//! ```
use crate::error::{ChemError, ChemResult};
use crate::stoichiometry::brute_force::{DEFAULT_BRUTE_FORCE_LIMIT, MAX_BRUTE_FORCE_LIMIT};
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILE: &str = "balancer_config.json";

/// Parameters of a [`crate::balancer::Balancer`].
///
/// # Fields
/// * `brute_force_limit` - largest coefficient the fallback search tries
/// * `enable_linear_solver` - run the rational solver
/// * `enable_brute_force` - run the fallback search when the solver fails
/// * `log_level` - one of off/error/warn/info/debug/trace
/// * `log_file` - optional file the logger also writes to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    pub brute_force_limit: u32,
    pub enable_linear_solver: bool,
    pub enable_brute_force: bool,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            brute_force_limit: DEFAULT_BRUTE_FORCE_LIMIT,
            enable_linear_solver: true,
            enable_brute_force: true,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl BalancerConfig {
    /// Checks that at least one strategy is enabled, that the fallback bound
    /// is within `1..=MAX_BRUTE_FORCE_LIMIT` and that the log level is known.
    pub fn validate(&self) -> ChemResult<()> {
        if !self.enable_linear_solver && !self.enable_brute_force {
            return Err(ChemError::InvalidConfig(
                "at least one balancing strategy must be enabled".to_string(),
            ));
        }
        if self.enable_brute_force && self.brute_force_limit == 0 {
            return Err(ChemError::InvalidConfig(
                "brute_force_limit must be at least 1".to_string(),
            ));
        }
        if self.brute_force_limit > MAX_BRUTE_FORCE_LIMIT {
            return Err(ChemError::InvalidConfig(format!(
                "brute_force_limit must not exceed {}",
                MAX_BRUTE_FORCE_LIMIT
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> ChemResult<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ChemError::InvalidConfig(format!("unknown log level '{}'", self.log_level)))
    }
}

/// Loads, updates and saves a [`BalancerConfig`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: BalancerConfig,
    config_file: String,
}

impl ConfigManager {
    /// Uses `balancer_config.json` in the current directory; falls back to
    /// the defaults if it is missing or unreadable.
    pub fn new() -> Self {
        let config = Self::load_config(DEFAULT_CONFIG_FILE).unwrap_or_else(|e| {
            warn!("could not read {}: {}, using defaults", DEFAULT_CONFIG_FILE, e);
            BalancerConfig::default()
        });
        Self {
            config,
            config_file: DEFAULT_CONFIG_FILE.to_string(),
        }
    }

    /// Loads the configuration from `config_file`. A missing file gives the
    /// defaults; a malformed or invalid one is an error.
    pub fn with_config_file(config_file: &str) -> ChemResult<Self> {
        let config = Self::load_config(config_file)?;
        Ok(Self {
            config,
            config_file: config_file.to_string(),
        })
    }

    pub fn load_config(config_file: &str) -> ChemResult<BalancerConfig> {
        if !Path::new(config_file).exists() {
            return Ok(BalancerConfig::default());
        }
        let content = fs::read_to_string(config_file)?;
        let config: BalancerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        info!("loaded balancer configuration from {}", config_file);
        Ok(config)
    }

    pub fn save_config(&self) -> ChemResult<()> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    pub fn get_config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Validates and stores a whole new configuration.
    pub fn set_config(&mut self, config: BalancerConfig) -> ChemResult<()> {
        config.validate()?;
        self.config = config;
        self.save_config()
    }

    pub fn set_brute_force_limit(&mut self, limit: u32) -> ChemResult<()> {
        let mut config = self.config.clone();
        config.brute_force_limit = limit;
        self.set_config(config)
    }

    pub fn set_strategies(&mut self, linear_solver: bool, brute_force: bool) -> ChemResult<()> {
        let mut config = self.config.clone();
        config.enable_linear_solver = linear_solver;
        config.enable_brute_force = brute_force;
        self.set_config(config)
    }

    pub fn set_log_level(&mut self, level: &str) -> ChemResult<()> {
        let mut config = self.config.clone();
        config.log_level = level.to_string();
        self.set_config(config)
    }

    pub fn reset_to_defaults(&mut self) -> ChemResult<()> {
        self.config = BalancerConfig::default();
        self.save_config()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
