//! Combat scheduler: the timer-driven control surface around `Battle`
//!
//! One fixed-period loop is the sole driver of simulation state. The speed
//! multiplier scales simulated delta-time per real tick (speed 2 means half
//! the real time per simulated second); the nominal period never changes.
//!
//! `start` always resolves to a terminal `BattleResult`, exactly once:
//! normal victory/defeat, external stop, the stalemate cap, or - if a tick
//! ever fails - a degraded result flagged with `error: true`. Callers never
//! need their own error handling to be guaranteed an outcome.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::combat::battle::{Battle, BattleVerdict, CombatEventKind};
use crate::combat::grid::BattleGrid;
use crate::combat::units::Combatant;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{Team, Tick};

/// Terminal record of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub victory: bool,
    pub remaining_player_units: u32,
    pub remaining_enemy_units: u32,
    pub error: bool,
    pub ticks: Tick,
}

impl BattleResult {
    fn from_verdict(verdict: BattleVerdict, ticks: Tick) -> Self {
        Self {
            victory: verdict.victory,
            remaining_player_units: verdict.remaining_player_units,
            remaining_enemy_units: verdict.remaining_enemy_units,
            error: false,
            ticks,
        }
    }

    fn degraded(ticks: Tick) -> Self {
        Self {
            victory: false,
            remaining_player_units: 0,
            remaining_enemy_units: 0,
            error: true,
            ticks,
        }
    }
}

/// Drives battles at a fixed tick period
///
/// `Idle -> Running -> Idle`; the terminal state is re-entrant, a later
/// `start` re-arms everything. `stop` and `set_speed` may be called from
/// other tasks while a battle runs.
pub struct CombatScheduler {
    config: CombatConfig,
    running: AtomicBool,
    stop_requested: AtomicBool,
    /// Current speed multiplier, stored as f64 bits
    speed_bits: AtomicU64,
}

impl CombatScheduler {
    pub fn new(config: CombatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            speed_bits: AtomicU64::new(1.0f64.to_bits()),
        })
    }

    /// Run a battle to its terminal result
    ///
    /// Refused with `BattleInProgress` while another battle is running; the
    /// loop is timer-driven, so the guard is explicit rather than implied
    /// by ownership.
    pub async fn start(
        &self,
        player_units: Vec<Combatant>,
        enemy_units: Vec<Combatant>,
        enemy_debuff: i32,
        grid: BattleGrid,
        seed: u64,
    ) -> Result<BattleResult> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CombatError::BattleInProgress);
        }
        self.stop_requested.store(false, Ordering::SeqCst);

        let result = self
            .run_battle(player_units, enemy_units, enemy_debuff, grid, seed)
            .await;

        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_battle(
        &self,
        player_units: Vec<Combatant>,
        enemy_units: Vec<Combatant>,
        enemy_debuff: i32,
        grid: BattleGrid,
        seed: u64,
    ) -> Result<BattleResult> {
        let mut battle = Battle::new(grid, player_units, enemy_units, enemy_debuff, seed)?;
        let base_delta = self.config.base_delta_time();
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if self.stop_requested.load(Ordering::SeqCst) {
                tracing::debug!(tick = battle.tick, "combat stopped externally");
                return Ok(BattleResult {
                    victory: false,
                    remaining_player_units: battle.alive_count(Team::Player),
                    remaining_enemy_units: battle.alive_count(Team::Enemy),
                    error: false,
                    ticks: battle.tick,
                });
            }

            let delta_time = base_delta * self.speed();
            if let Err(error) = battle.run_tick(delta_time) {
                tracing::warn!(%error, tick = battle.tick, "tick failed; force-stopping combat");
                return Ok(BattleResult::degraded(battle.tick));
            }

            if let Some(verdict) = battle.check_battle_end() {
                battle.log_event(
                    CombatEventKind::BattleEnded {
                        victory: verdict.victory,
                    },
                    format!("battle ended after {} ticks", battle.tick),
                );
                tracing::debug!(victory = verdict.victory, tick = battle.tick, "battle over");
                return Ok(BattleResult::from_verdict(verdict, battle.tick));
            }

            if battle.tick >= self.config.max_ticks {
                battle.log_event(CombatEventKind::Stalemate, "stalemate cap reached");
                tracing::warn!(tick = battle.tick, "stalemate cap reached");
                return Ok(BattleResult {
                    victory: false,
                    remaining_player_units: battle.alive_count(Team::Player),
                    remaining_enemy_units: battle.alive_count(Team::Enemy),
                    error: false,
                    ticks: battle.tick,
                });
            }
        }
    }

    /// Request the running battle to halt at the next tick boundary
    ///
    /// The in-flight `start` still resolves, with the live counts at the
    /// moment of the stop. No-op while idle.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Set the speed multiplier, clamped to the configured bounds
    pub fn set_speed(&self, multiplier: f64) {
        let clamped = multiplier.clamp(self.config.min_speed, self.config.max_speed);
        self.speed_bits.store(clamped.to_bits(), Ordering::SeqCst);
    }

    /// Current speed multiplier
    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::SeqCst))
    }

    /// Is a battle currently running?
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
