//! Combat configuration with documented tunables
//!
//! Values that callers may reasonably want to tune per deployment live here;
//! fixed gameplay numbers live in `combat::constants`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::constants::{BATTLE_TICK_MS, MAX_BATTLE_TICKS};
use crate::core::error::{CombatError, Result};

/// Configuration for the combat scheduler and tick pipeline
///
/// These values have been tuned against the default roster data. Changing
/// them affects pacing, not correctness: the tick pipeline is agnostic to
/// the actual tick period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Real-time milliseconds between scheduler ticks
    ///
    /// Simulated time per tick is `tick_interval_ms / 1000 * speed`. The
    /// nominal period stays fixed; the speed multiplier scales simulated
    /// delta-time instead of the timer.
    pub tick_interval_ms: u64,

    /// Hard cap on simulated ticks before the battle is called a stalemate
    ///
    /// At the default tick period this is five minutes of simulated combat.
    /// Hitting the cap terminates as a non-victory carrying both live
    /// counts, so the loop can never run unbounded.
    pub max_ticks: u64,

    /// Lowest accepted speed multiplier
    pub min_speed: f64,

    /// Highest accepted speed multiplier
    pub max_speed: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: BATTLE_TICK_MS,
            max_ticks: MAX_BATTLE_TICKS,
            min_speed: 0.25,
            max_speed: 8.0,
        }
    }
}

impl CombatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file; absent keys fall back to defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: CombatConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(CombatError::InvalidConfig(
                "tick_interval_ms must be positive".into(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(CombatError::InvalidConfig(
                "max_ticks must be positive".into(),
            ));
        }
        if self.min_speed <= 0.0 || self.max_speed < self.min_speed {
            return Err(CombatError::InvalidConfig(format!(
                "speed bounds ({}, {}) must satisfy 0 < min <= max",
                self.min_speed, self.max_speed
            )));
        }
        Ok(())
    }

    /// Simulated seconds advanced per tick at 1x speed
    pub fn base_delta_time(&self) -> f64 {
        self.tick_interval_ms as f64 / 1000.0
    }
}
