//! The combatant model: one shape for player and enemy units
//!
//! A combatant outlives battles; `init_battle` re-arms the per-battle
//! runtime each time combat starts. Cooldown timers and movement direction
//! history are inline fields rather than scheduler-side maps, so unit
//! lifecycle and timer lifecycle cannot drift apart.
//!
//! Stats are split into `base` (the per-battle baseline handed over by the
//! roster, plus permanent in-battle gains) and `stats` (effective values).
//! `recompute_stats` re-derives the effective block from base plus all
//! active timed effects, so every effect kind is reversed on expiry.

use serde::{Deserialize, Serialize};

use crate::combat::effects::{EffectKind, TimedEffect};
use crate::combat::hex::{HexCoord, HexDirection};
use crate::combat::resolution::SkillSpec;
use crate::combat::stats::{BattleStats, UnitStats};
use crate::core::types::{Team, UnitId};

/// A single unit on the battlefield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    // Identity
    pub id: UnitId,
    pub template_id: String,
    pub name: String,
    pub team: Team,

    // Stats
    /// Per-battle baseline: roster stats after external synergy application,
    /// plus permanent in-battle changes (enemy debuff, on-kill bonuses)
    pub base: UnitStats,
    /// Effective stats: base plus all active timed effects
    pub stats: UnitStats,
    pub skill: Option<SkillSpec>,

    // Passive flags supplied by the external synergy step
    pub mana_regen_bonus: i32,
    pub first_attack_dodge: bool,
    pub kill_attack_speed_enabled: bool,

    // Battle runtime
    pub current_hp: i32,
    pub current_mana: i32,
    pub is_alive: bool,
    pub is_stunned: bool,
    pub position: Option<HexCoord>,
    pub target: Option<UnitId>,
    pub buffs: Vec<TimedEffect>,
    pub debuffs: Vec<TimedEffect>,
    pub battle_stats: BattleStats,

    // One-shot flags
    pub has_used_first_dodge: bool,
    pub has_resurrected: bool,

    // Inline cooldown state (accumulated simulated seconds)
    pub attack_timer: f64,
    pub move_timer: f64,
    pub last_move_dir: Option<HexDirection>,
}

impl Combatant {
    pub fn new(
        template_id: impl Into<String>,
        name: impl Into<String>,
        team: Team,
        stats: UnitStats,
    ) -> Self {
        let current_hp = stats.hp;
        let current_mana = stats.mana.clamp(0, stats.max_mana);
        Self {
            id: UnitId::new(),
            template_id: template_id.into(),
            name: name.into(),
            team,
            base: stats.clone(),
            stats,
            skill: None,
            mana_regen_bonus: 0,
            first_attack_dodge: false,
            kill_attack_speed_enabled: false,
            current_hp,
            current_mana,
            is_alive: true,
            is_stunned: false,
            position: None,
            target: None,
            buffs: Vec::new(),
            debuffs: Vec::new(),
            battle_stats: BattleStats::default(),
            has_used_first_dodge: false,
            has_resurrected: false,
            attack_timer: 0.0,
            move_timer: 0.0,
            last_move_dir: None,
        }
    }

    pub fn with_skill(mut self, skill: SkillSpec) -> Self {
        self.skill = Some(skill);
        self
    }

    /// Re-arm the per-battle runtime. Called once per combat invocation.
    pub fn init_battle(&mut self) {
        self.buffs.clear();
        self.debuffs.clear();
        self.recompute_stats();
        self.current_hp = self.stats.hp;
        self.current_mana = self.stats.mana.clamp(0, self.stats.max_mana);
        self.is_alive = true;
        self.is_stunned = false;
        self.target = None;
        self.battle_stats = BattleStats::default();
        self.has_used_first_dodge = false;
        self.has_resurrected = false;
        self.attack_timer = 0.0;
        self.move_timer = 0.0;
        self.last_move_dir = None;
    }

    /// Alive and able to act this tick
    pub fn is_combat_ready(&self) -> bool {
        self.is_alive && !self.is_stunned
    }

    /// Re-derive effective stats from base plus active timed effects
    ///
    /// Buffs apply before debuffs, each list in grant order. Percent
    /// modifiers on attack floor at each step, matching attack's integer
    /// domain.
    pub fn recompute_stats(&mut self) {
        let mut stats = self.base.clone();
        let mut stunned = false;

        for effect in &self.buffs {
            match effect.kind {
                EffectKind::Defense => stats.defense += effect.magnitude,
                EffectKind::Evasion => stats.evasion += effect.magnitude,
                EffectKind::AttackPercent => {
                    stats.attack =
                        (stats.attack as f64 * (1.0 + effect.magnitude as f64 / 100.0)).floor()
                            as i32;
                }
                EffectKind::AttackSpeedPercent => {
                    stats.attack_speed *= 1.0 + effect.magnitude as f64 / 100.0;
                }
                EffectKind::Stun => stunned = true,
            }
        }

        for effect in &self.debuffs {
            match effect.kind {
                EffectKind::Defense => stats.defense -= effect.magnitude,
                EffectKind::Evasion => stats.evasion -= effect.magnitude,
                EffectKind::AttackPercent => {
                    stats.attack =
                        (stats.attack as f64 * (1.0 - effect.magnitude as f64 / 100.0)).floor()
                            as i32;
                }
                EffectKind::AttackSpeedPercent => {
                    stats.attack_speed *= 1.0 - effect.magnitude as f64 / 100.0;
                }
                EffectKind::Stun => stunned = true,
            }
        }

        self.stats = stats;
        self.is_stunned = stunned;
    }

    /// Grant a timed buff
    pub fn add_buff(&mut self, kind: EffectKind, magnitude: i32, duration: f64, sim_time: f64) {
        self.buffs
            .push(TimedEffect::new(kind, magnitude, duration, sim_time));
        self.recompute_stats();
    }

    /// Grant a timed debuff
    pub fn add_debuff(&mut self, kind: EffectKind, magnitude: i32, duration: f64, sim_time: f64) {
        self.debuffs
            .push(TimedEffect::new(kind, magnitude, duration, sim_time));
        self.recompute_stats();
    }

    /// Drop expired effects and refresh effective stats
    ///
    /// Runs for every unit every tick, regardless of stun or death state.
    pub fn update_timed_effects(&mut self, sim_time: f64) {
        let before = self.buffs.len() + self.debuffs.len();
        self.buffs.retain(|effect| !effect.is_expired(sim_time));
        self.debuffs.retain(|effect| !effect.is_expired(sim_time));
        if self.buffs.len() + self.debuffs.len() != before {
            self.recompute_stats();
        }
    }

    /// Gain mana, clamped to max
    pub fn gain_mana(&mut self, amount: i32) {
        self.current_mana = (self.current_mana + amount).clamp(0, self.stats.max_mana);
    }

    /// Heal up to max hp; returns the amount actually applied
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive {
            return 0;
        }
        let applied = amount.min(self.stats.hp - self.current_hp).max(0);
        self.current_hp += applied;
        self.battle_stats.healing += applied as i64;
        applied
    }

    /// Mark this unit dead. Idempotent.
    ///
    /// Deliberately does NOT release grid occupancy or clear `position`;
    /// the end-of-tick sweep owns physical eviction so in-flight combat
    /// this tick still sees pre-death geometry.
    pub fn mark_dead(&mut self) {
        if !self.is_alive {
            return;
        }
        self.is_alive = false;
        self.current_hp = 0;
        tracing::debug!(unit = %self.name, "unit died");
    }

    /// Apply the externally computed flat attack reduction (battle start, once)
    pub fn apply_attack_reduction(&mut self, percent: i32) {
        self.base.attack =
            (self.base.attack as f64 * (1.0 - percent as f64 / 100.0)).floor() as i32;
        self.recompute_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant(stats: UnitStats) -> Combatant {
        Combatant::new("test", "Test", Team::Player, stats)
    }

    #[test]
    fn test_init_battle_resets_runtime() {
        let mut unit = combatant(UnitStats {
            hp: 200,
            mana: 20,
            max_mana: 100,
            ..Default::default()
        });
        unit.current_hp = 5;
        unit.current_mana = 90;
        unit.is_alive = false;
        unit.has_resurrected = true;
        unit.attack_timer = 0.7;
        unit.battle_stats.kills = 3;
        unit.add_buff(EffectKind::Defense, 50, 5.0, 0.0);

        unit.init_battle();

        assert_eq!(unit.current_hp, 200);
        assert_eq!(unit.current_mana, 20);
        assert!(unit.is_alive);
        assert!(!unit.has_resurrected);
        assert!(unit.buffs.is_empty());
        assert_eq!(unit.battle_stats, BattleStats::default());
        assert_eq!(unit.attack_timer, 0.0);
        assert_eq!(unit.stats.defense, unit.base.defense);
    }

    #[test]
    fn test_additive_buff_expires_and_reverses() {
        let mut unit = combatant(UnitStats {
            defense: 10,
            ..Default::default()
        });
        unit.add_buff(EffectKind::Defense, 50, 5.0, 0.0);
        assert_eq!(unit.stats.defense, 60);

        unit.update_timed_effects(4.0);
        assert_eq!(unit.stats.defense, 60);

        unit.update_timed_effects(5.0);
        assert_eq!(unit.stats.defense, 10);
        assert!(unit.buffs.is_empty());
    }

    #[test]
    fn test_multiplicative_buff_expires_and_reverses() {
        let mut unit = combatant(UnitStats {
            attack: 100,
            attack_speed: 1.0,
            ..Default::default()
        });
        unit.add_buff(EffectKind::AttackPercent, 30, 4.0, 0.0);
        unit.add_buff(EffectKind::AttackSpeedPercent, 25, 4.0, 0.0);
        assert_eq!(unit.stats.attack, 130);
        assert!((unit.stats.attack_speed - 1.25).abs() < 1e-9);

        unit.update_timed_effects(4.0);
        assert_eq!(unit.stats.attack, 100);
        assert!((unit.stats.attack_speed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_attack_debuff_stacks_with_buff() {
        let mut unit = combatant(UnitStats {
            attack: 100,
            ..Default::default()
        });
        unit.add_buff(EffectKind::AttackPercent, 50, 10.0, 0.0);
        unit.add_debuff(EffectKind::AttackPercent, 20, 10.0, 0.0);
        // 100 * 1.5 = 150, then 150 * 0.8 = 120
        assert_eq!(unit.stats.attack, 120);
    }

    #[test]
    fn test_stun_debuff_sets_and_clears_flag() {
        let mut unit = combatant(UnitStats::default());
        unit.add_debuff(EffectKind::Stun, 0, 2.0, 0.0);
        assert!(unit.is_stunned);
        assert!(!unit.is_combat_ready());

        unit.update_timed_effects(2.0);
        assert!(!unit.is_stunned);
        assert!(unit.is_combat_ready());
    }

    #[test]
    fn test_gain_mana_clamps_to_max() {
        let mut unit = combatant(UnitStats {
            max_mana: 100,
            ..Default::default()
        });
        unit.gain_mana(70);
        unit.gain_mana(70);
        assert_eq!(unit.current_mana, 100);
    }

    #[test]
    fn test_heal_clamps_and_accrues_applied_amount() {
        let mut unit = combatant(UnitStats {
            hp: 100,
            ..Default::default()
        });
        unit.current_hp = 80;
        let applied = unit.heal(50);
        assert_eq!(applied, 20);
        assert_eq!(unit.current_hp, 100);
        assert_eq!(unit.battle_stats.healing, 20);
    }

    #[test]
    fn test_heal_dead_unit_is_noop() {
        let mut unit = combatant(UnitStats::default());
        unit.mark_dead();
        assert_eq!(unit.heal(50), 0);
        assert_eq!(unit.current_hp, 0);
    }

    #[test]
    fn test_mark_dead_idempotent() {
        let mut unit = combatant(UnitStats::default());
        unit.position = Some(HexCoord::new(1, 1));
        unit.battle_stats.kills = 2;

        unit.mark_dead();
        let snapshot = unit.clone();
        unit.mark_dead();

        assert_eq!(unit.is_alive, snapshot.is_alive);
        assert_eq!(unit.current_hp, 0);
        assert_eq!(unit.battle_stats, snapshot.battle_stats);
        // Position is retained until the end-of-tick sweep
        assert_eq!(unit.position, Some(HexCoord::new(1, 1)));
    }

    #[test]
    fn test_apply_attack_reduction() {
        let mut unit = combatant(UnitStats {
            attack: 45,
            ..Default::default()
        });
        unit.apply_attack_reduction(20);
        assert_eq!(unit.base.attack, 36);
        assert_eq!(unit.stats.attack, 36);
    }
}
