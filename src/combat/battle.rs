//! Battle state and the per-tick resolution pipeline
//!
//! `Battle` owns the grid, the flat combatant arena (player units first,
//! then enemies - arena order is also collision-fairness order), the seeded
//! RNG, and the simulation clock. Each tick runs to completion in a fixed
//! phase order:
//!
//! targeting -> movement intents -> collision resolution -> movement commit
//! -> attack/skill resolution -> timed-effect expiry -> death sweep
//!
//! Grid occupancy is written only by `move_unit`, `cleanup_dead`, and
//! initial placement, which is what makes the deferred-death protocol safe:
//! a unit that dies mid-tick keeps its cell through the attack phase and is
//! evicted exactly once by the sweep.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::combat::constants::LIVENESS_LOG_INTERVAL;
use crate::combat::grid::BattleGrid;
use crate::combat::hex::HexCoord;
use crate::combat::movement::{collect_move_intent, resolve_collisions, MoveIntent};
use crate::combat::resolution::{process_attack, ResolveCtx};
use crate::combat::targeting::{find_target, needs_new_target};
use crate::combat::units::Combatant;
use crate::core::error::Result;
use crate::core::types::{Team, Tick, UnitId};

/// Log entry for battle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatEvent {
    pub tick: Tick,
    pub kind: CombatEventKind,
    pub description: String,
}

impl CombatEvent {
    pub fn new(tick: Tick, kind: CombatEventKind, description: String) -> Self {
        Self {
            tick,
            kind,
            description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEventKind {
    BattleStarted,
    SkillCast { unit: UnitId },
    UnitDied { unit: UnitId },
    Resurrected { unit: UnitId },
    Stalemate,
    BattleEnded { victory: bool },
}

/// Terminal outcome of the tick pipeline's end check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleVerdict {
    pub victory: bool,
    pub remaining_player_units: u32,
    pub remaining_enemy_units: u32,
}

/// Aggregated battle statistics for one team
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TeamSummary {
    pub damage_dealt: i64,
    pub damage_taken: i64,
    pub healing: i64,
    pub kills: u32,
}

/// Complete battle state
#[derive(Debug)]
pub struct Battle {
    pub grid: BattleGrid,
    pub units: Vec<Combatant>,
    pub tick: Tick,
    /// Accumulated simulated seconds (effect timestamps use this, never wall time)
    pub sim_time: f64,
    pub events: Vec<CombatEvent>,
    rng: ChaCha8Rng,
}

impl Battle {
    /// Set up a battle: re-arm every unit's runtime, apply the externally
    /// computed flat enemy attack reduction once, and register starting
    /// occupancy. Rejects rosters that claim the same cell twice or cells
    /// outside the grid.
    pub fn new(
        grid: BattleGrid,
        player_units: Vec<Combatant>,
        enemy_units: Vec<Combatant>,
        enemy_attack_reduction: i32,
        seed: u64,
    ) -> Result<Self> {
        let mut units = player_units;
        units.extend(enemy_units);

        let mut battle = Self {
            grid,
            units,
            tick: 0,
            sim_time: 0.0,
            events: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };

        for unit in &mut battle.units {
            unit.init_battle();
            if unit.team == Team::Enemy && enemy_attack_reduction > 0 {
                unit.apply_attack_reduction(enemy_attack_reduction);
            }
        }
        for idx in 0..battle.units.len() {
            if let Some(position) = battle.units[idx].position {
                battle.grid.place(position, battle.units[idx].id)?;
            }
        }

        battle.events.push(CombatEvent::new(
            0,
            CombatEventKind::BattleStarted,
            "battle started".into(),
        ));
        Ok(battle)
    }

    /// Run one full combat tick
    pub fn run_tick(&mut self, delta_time: f64) -> Result<()> {
        self.tick += 1;
        self.sim_time += delta_time;

        self.phase_targeting();

        let intents = self.phase_collect_intents(delta_time);
        let accepted = resolve_collisions(&intents, &self.grid);
        for intent in accepted {
            self.move_unit(intent.unit_id, intent.destination)?;
        }

        self.phase_combat(delta_time);
        self.phase_effect_expiry();

        if self.tick % LIVENESS_LOG_INTERVAL == 0 {
            tracing::debug!(
                tick = self.tick,
                players = self.alive_count(Team::Player),
                enemies = self.alive_count(Team::Enemy),
                "survivors"
            );
        }

        self.cleanup_dead();
        Ok(())
    }

    /// Lazily refresh targets for every unit able to act this tick
    fn phase_targeting(&mut self) {
        for idx in 0..self.units.len() {
            let unit = &self.units[idx];
            if !unit.is_combat_ready() || unit.position.is_none() {
                continue;
            }
            if !needs_new_target(unit, &self.units) {
                continue;
            }
            let team = unit.team;
            let enemies: Vec<&Combatant> =
                self.units.iter().filter(|u| u.team != team).collect();
            let target = find_target(&self.units[idx], &enemies);
            self.units[idx].target = target;
        }
    }

    /// Collect desired destinations without touching the grid
    fn phase_collect_intents(&mut self, delta_time: f64) -> Vec<MoveIntent> {
        let mut intents = Vec::new();
        for idx in 0..self.units.len() {
            if !self.units[idx].is_combat_ready() {
                continue;
            }
            let target_pos = self.units[idx].target.and_then(|id| {
                self.units
                    .iter()
                    .find(|u| u.id == id && u.is_alive)
                    .and_then(|u| u.position)
            });
            let unit_id = self.units[idx].id;
            if let Some(destination) =
                collect_move_intent(&mut self.units[idx], target_pos, &self.grid, delta_time)
            {
                intents.push(MoveIntent {
                    unit_id,
                    destination,
                });
            }
        }
        intents
    }

    /// Commit an arbitrated move. The single occupancy writer during the
    /// movement phase; re-validates the destination against intervening
    /// state changes and silently drops the move if it is no longer free.
    fn move_unit(&mut self, unit_id: UnitId, destination: HexCoord) -> Result<()> {
        let Some(idx) = self.units.iter().position(|u| u.id == unit_id) else {
            return Ok(());
        };
        if !self.grid.is_free_for(destination, unit_id) {
            return Ok(());
        }
        let Some(old_position) = self.units[idx].position else {
            return Ok(());
        };
        self.grid.clear(old_position);
        self.grid.place(destination, unit_id)?;
        self.units[idx].position = Some(destination);
        Ok(())
    }

    /// Resolve attacks and skills for every unit able to act
    fn phase_combat(&mut self, delta_time: f64) {
        let Battle {
            units,
            rng,
            events,
            tick,
            sim_time,
            ..
        } = self;
        let mut ctx = ResolveCtx {
            rng,
            events,
            tick: *tick,
            sim_time: *sim_time,
        };
        for idx in 0..units.len() {
            if units[idx].is_combat_ready() {
                process_attack(units, idx, delta_time, &mut ctx);
            }
        }
    }

    /// Expire timed effects for every unit, stunned or dead included
    fn phase_effect_expiry(&mut self) {
        let sim_time = self.sim_time;
        for unit in &mut self.units {
            unit.update_timed_effects(sim_time);
        }
    }

    /// End-of-tick sweep: evict every dead unit that still holds a cell
    ///
    /// Runs after the attack phase so same-tick combat observed the
    /// pre-death geometry; by the next tick's targeting and movement
    /// phases, occupancy is consistent again.
    fn cleanup_dead(&mut self) {
        for unit in &mut self.units {
            if unit.is_alive {
                continue;
            }
            if let Some(position) = unit.position.take() {
                self.grid.clear(position);
                tracing::debug!(unit = %unit.name, ?position, "cleared cell for dead unit");
            }
        }
    }

    /// Living units on a team
    pub fn alive_count(&self, team: Team) -> u32 {
        self.units
            .iter()
            .filter(|u| u.team == team && u.is_alive)
            .count() as u32
    }

    /// Victory/defeat check; None while both sides still stand
    pub fn check_battle_end(&self) -> Option<BattleVerdict> {
        let players = self.alive_count(Team::Player);
        let enemies = self.alive_count(Team::Enemy);

        if enemies == 0 {
            Some(BattleVerdict {
                victory: true,
                remaining_player_units: players,
                remaining_enemy_units: 0,
            })
        } else if players == 0 {
            Some(BattleVerdict {
                victory: false,
                remaining_player_units: 0,
                remaining_enemy_units: enemies,
            })
        } else {
            None
        }
    }

    /// Verify that unit positions and grid occupancy agree
    ///
    /// With all occupancy writes funneled through this type, a failure here
    /// means a bug, not a recoverable state; the scheduler surfaces it
    /// through the degraded-result path.
    pub fn validate_consistency(&self) -> Result<()> {
        for unit in self.units.iter().filter(|u| u.is_alive) {
            if let Some(position) = unit.position {
                if self.grid.occupant(position) != Some(unit.id) {
                    return Err(crate::core::error::CombatError::GridDesync(position));
                }
            }
        }
        for (position, occupant) in self.grid.occupied_cells() {
            let valid = self
                .units
                .iter()
                .any(|u| u.id == occupant && u.position == Some(position));
            if !valid {
                return Err(crate::core::error::CombatError::GridDesync(position));
            }
        }
        Ok(())
    }

    /// Log a battle event at the current tick
    pub fn log_event(&mut self, kind: CombatEventKind, description: impl Into<String>) {
        self.events
            .push(CombatEvent::new(self.tick, kind, description.into()));
    }

    /// Aggregate one team's battle statistics
    pub fn team_summary(&self, team: Team) -> TeamSummary {
        let mut summary = TeamSummary::default();
        for unit in self.units.iter().filter(|u| u.team == team) {
            summary.damage_dealt += unit.battle_stats.damage_dealt;
            summary.damage_taken += unit.battle_stats.damage_taken;
            summary.healing += unit.battle_stats.healing;
            summary.kills += unit.battle_stats.kills;
        }
        summary
    }
}
