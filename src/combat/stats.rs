//! Unit stat blocks and battle statistics

use serde::{Deserialize, Serialize};

use crate::combat::constants::{DEFAULT_CRIT_DAMAGE_PCT, DEFAULT_MOVE_SPEED};

/// Full stat block for a combatant
///
/// Percentages (crit, evasion, lifesteal, damage reduction) are stored as
/// whole percent points; `skill_power` is a plain multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub hp: i32,
    pub attack: i32,
    /// Attacks per second
    pub attack_speed: f64,
    /// Attack range in hex distance
    pub range: u32,
    pub defense: i32,
    /// Starting mana at battle start
    pub mana: i32,
    pub max_mana: i32,
    /// Moves per second
    pub move_speed: f64,
    /// Multiplier on skill-sourced damage and healing
    pub skill_power: f64,
    pub crit_chance: i32,
    pub crit_damage: i32,
    pub evasion: i32,
    pub lifesteal: i32,
    pub damage_reduction: i32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            hp: 100,
            attack: 10,
            attack_speed: 1.0,
            range: 1,
            defense: 0,
            mana: 0,
            max_mana: 100,
            move_speed: DEFAULT_MOVE_SPEED,
            skill_power: 1.0,
            crit_chance: 0,
            crit_damage: DEFAULT_CRIT_DAMAGE_PCT,
            evasion: 0,
            lifesteal: 0,
            damage_reduction: 0,
        }
    }
}

/// Star upgrade level for roster units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum StarLevel {
    #[default]
    One = 1,
    Two = 2,
    Three = 3,
}

impl StarLevel {
    /// Multipliers for (hp, attack, skill_power) at this level
    fn multipliers(&self) -> (f64, f64, f64) {
        match self {
            StarLevel::One => (1.0, 1.0, 1.0),
            StarLevel::Two => (1.8, 1.8, 1.5),
            StarLevel::Three => (3.2, 3.2, 2.0),
        }
    }
}

impl UnitStats {
    /// Scale template stats by star level (hp/attack/skill power only)
    pub fn at_star_level(&self, level: StarLevel) -> UnitStats {
        let (hp_mult, attack_mult, power_mult) = level.multipliers();
        UnitStats {
            hp: (self.hp as f64 * hp_mult).floor() as i32,
            attack: (self.attack as f64 * attack_mult).floor() as i32,
            skill_power: self.skill_power * power_mult,
            ..self.clone()
        }
    }
}

/// Per-battle statistics, reset at battle start and read at battle end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStats {
    pub damage_dealt: i64,
    pub damage_taken: i64,
    pub healing: i64,
    pub kills: u32,
}
