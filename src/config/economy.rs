//! Economy configuration loading from config.toml
//!
//! Every setting has a default, so a partial file (or no file at all) still yields a
//! complete [`EconomyConfig`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Per-command cooldowns, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Weapon attack
    pub attack: u64,
    /// Unarmed beatup
    pub beatup: u64,
    /// Bank and business robberies (shared namespace)
    pub rob: u64,
    /// Heists
    pub heist: u64,
    /// Smuggling runs
    pub smuggle: u64,
    /// Street dealer purchases
    pub dealer: u64,
    /// Bail attempts
    pub bail: u64,
    /// Legal work
    pub work: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            attack: 30,
            beatup: 60,
            rob: 15,
            heist: 30,
            smuggle: 20,
            dealer: 30,
            bail: 5,
            work: 12,
        }
    }
}

impl CooldownConfig {
    /// Looks up the cooldown for a command namespace. Unknown namespaces have none.
    #[must_use]
    pub fn duration_for(&self, command: &str) -> Duration {
        let secs = match command {
            "attack" => self.attack,
            "beatup" => self.beatup,
            "rob" => self.rob,
            "heist" => self.heist,
            "smuggle" => self.smuggle,
            "dealer" => self.dealer,
            "bail" => self.bail,
            "work" => self.work,
            _ => 0,
        };
        Duration::from_secs(secs)
    }
}

/// Tunable economy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance granted when an account is first opened
    pub starting_balance: i64,
    /// Coins stolen per point of combat damage
    pub coins_per_damage: f64,
    /// Upper bound on any action's effective failure risk
    pub max_risk: f64,
    /// Seconds a friend has to accept a bail request
    pub bail_request_timeout_secs: u64,
    /// Command cooldowns
    pub cooldowns: CooldownConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            coins_per_damage: 10.0,
            max_risk: 0.85,
            bail_request_timeout_secs: 60,
            cooldowns: CooldownConfig::default(),
        }
    }
}

/// Loads economy configuration from a TOML file
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EconomyConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `ECONOMY_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: defaults are used and a warning is logged.
/// A file that exists but does not parse is still an error.
pub fn load_default_config() -> Result<EconomyConfig> {
    let path = std::env::var("ECONOMY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("Config file {path} not found, using default economy settings");
        return Ok(EconomyConfig::default());
    }
    load_config(path)
}
