//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::session::GameMode;
use crate::util::time::{MAX_SIMULATION_TPS, SIMULATION_TPS};
use crate::weapons::catalog::DEFAULT_WEAPON_ID;

/// Default seed for pellet spread when `SPREAD_SEED` is not set
pub const DEFAULT_SPREAD_SEED: u64 = 0x5EED_F00D;

/// Default number of ticks the headless driver runs
pub const DEFAULT_DEMO_TICKS: u64 = 600;

/// Simulation configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Simulation ticks per second
    pub simulation_tps: u32,
    /// Optional JSON weapon table, built-in catalog when absent
    pub weapon_catalog_path: Option<PathBuf>,
    /// Seed for pellet spread RNG
    pub spread_seed: u64,
    /// Number of ticks to run before closing the session
    pub demo_ticks: u64,
    /// Session mode
    pub game_mode: GameMode,
    /// Map identifier reported with the session
    pub map_type: Option<String>,
    /// Default weapon id a custom weapon table is checked against
    pub default_weapon: Option<String>,
    /// Weapon equipped at session start
    pub starting_weapon: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let simulation_tps =
            check_tps(parse_var("SIMULATION_TPS")?.unwrap_or(SIMULATION_TPS))?;

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            simulation_tps,
            weapon_catalog_path: env::var("WEAPON_CATALOG_PATH").ok().map(PathBuf::from),
            spread_seed: parse_var("SPREAD_SEED")?.unwrap_or(DEFAULT_SPREAD_SEED),
            demo_ticks: parse_var("DEMO_TICKS")?.unwrap_or(DEFAULT_DEMO_TICKS),
            game_mode: parse_var("GAME_MODE")?.unwrap_or_default(),
            map_type: env::var("MAP_TYPE").ok().filter(|s| !s.is_empty()),
            default_weapon: env::var("DEFAULT_WEAPON").ok().filter(|s| !s.is_empty()),
            starting_weapon: env::var("STARTING_WEAPON").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Default weapon for a loaded table: `DEFAULT_WEAPON`, then
    /// `STARTING_WEAPON`, then the stock default
    pub fn catalog_default(&self) -> &str {
        self.default_weapon
            .as_deref()
            .or(self.starting_weapon.as_deref())
            .unwrap_or(DEFAULT_WEAPON_ID)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            simulation_tps: SIMULATION_TPS,
            weapon_catalog_path: None,
            spread_seed: DEFAULT_SPREAD_SEED,
            demo_ticks: DEFAULT_DEMO_TICKS,
            game_mode: GameMode::default(),
            map_type: None,
            default_weapon: None,
            starting_weapon: None,
        }
    }
}

/// Tick rate must fit the millisecond frame clock
fn check_tps(tps: u32) -> Result<u32, ConfigError> {
    if tps == 0 || tps > MAX_SIMULATION_TPS {
        return Err(ConfigError::Invalid {
            var: "SIMULATION_TPS",
            value: tps.to_string(),
        });
    }
    Ok(tps)
}

/// Read an optional variable and parse it, rejecting values that don't parse
fn parse_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.simulation_tps, SIMULATION_TPS);
        assert_eq!(config.game_mode, GameMode::SinglePlayer);
        assert!(config.weapon_catalog_path.is_none());
    }

    #[test]
    fn unparseable_variable_is_rejected() {
        env::set_var("ARENA_TEST_DEMO_TICKS", "lots");
        let result: Result<Option<u64>, _> = parse_var("ARENA_TEST_DEMO_TICKS");
        env::remove_var("ARENA_TEST_DEMO_TICKS");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: "ARENA_TEST_DEMO_TICKS", .. })
        ));
    }

    #[test]
    fn tick_rate_outside_clock_range_is_rejected() {
        assert_eq!(check_tps(SIMULATION_TPS).unwrap(), SIMULATION_TPS);
        assert_eq!(check_tps(MAX_SIMULATION_TPS).unwrap(), MAX_SIMULATION_TPS);
        assert!(matches!(
            check_tps(2_000),
            Err(ConfigError::Invalid { var: "SIMULATION_TPS", value }) if value == "2000"
        ));
        assert!(check_tps(0).is_err());
    }

    #[test]
    fn catalog_default_prefers_explicit_setting() {
        let mut config = Config::default();
        assert_eq!(config.catalog_default(), DEFAULT_WEAPON_ID);

        config.starting_weapon = Some("rail".to_string());
        assert_eq!(config.catalog_default(), "rail");

        config.default_weapon = Some("nade".to_string());
        assert_eq!(config.catalog_default(), "nade");
    }

    #[test]
    fn missing_variable_is_none() {
        let result: Option<u32> = parse_var("ARENA_TEST_NEVER_SET").unwrap();
        assert!(result.is_none());
    }
}
