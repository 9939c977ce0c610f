//! Timed buff and debuff entries
//!
//! Effects are stamped with the battle's simulation clock, never wall time,
//! so speed multipliers and replays cannot skew durations. Stats are not
//! mutated by the entries themselves: `Combatant::recompute_stats` re-derives
//! the effective stat block from the base stats plus every active entry,
//! which makes multiplicative effects just as reversible as additive ones.

use serde::{Deserialize, Serialize};

/// What a timed effect modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Flat defense
    Defense,
    /// Flat evasion percent points
    Evasion,
    /// Percent modifier on attack (positive for buffs, applied inverted by debuffs)
    AttackPercent,
    /// Percent modifier on attack speed
    AttackSpeedPercent,
    /// Disables attacking and moving; magnitude is ignored
    Stun,
}

/// A single buff or debuff entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub kind: EffectKind,
    pub magnitude: i32,
    pub duration_secs: f64,
    /// Simulation time at which the effect was granted
    pub applied_at: f64,
}

impl TimedEffect {
    pub fn new(kind: EffectKind, magnitude: i32, duration_secs: f64, applied_at: f64) -> Self {
        Self {
            kind,
            magnitude,
            duration_secs,
            applied_at,
        }
    }

    /// Has this effect run out at the given simulation time?
    pub fn is_expired(&self, sim_time: f64) -> bool {
        sim_time - self.applied_at >= self.duration_secs
    }
}
