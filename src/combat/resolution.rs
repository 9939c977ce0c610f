//! Attack, damage, and skill resolution
//!
//! Basic attacks are cooldown-gated on an inline per-unit timer that only
//! accumulates while the target is in range; skills are mana-gated and fire
//! right after the attack that filled the bar, resetting mana to zero.
//!
//! Skill behavior is a closed dispatch over `SkillEffect`; adding a kind is
//! a compile-time-checked change.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::combat::battle::{CombatEvent, CombatEventKind};
use crate::combat::constants::{
    DAMAGE_FLOOR, KILL_ATTACK_SPEED_BONUS_PCT, MANA_PER_ATTACK, MANA_PER_HIT,
};
use crate::combat::effects::EffectKind;
use crate::combat::units::Combatant;
use crate::core::types::Tick;

/// A unit's skill: display name plus its dispatched effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSpec {
    pub name: String,
    pub effect: SkillEffect,
}

impl SkillSpec {
    pub fn new(name: impl Into<String>, effect: SkillEffect) -> Self {
        Self {
            name: name.into(),
            effect,
        }
    }
}

/// The closed set of skill effects
///
/// Durations are simulated seconds; `percent` fields scale the caster's
/// attack stat; `amount` fields are flat values scaled by skill power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkillEffect {
    /// Defense-ignoring damage to the current target
    MagicDamage { amount: i32 },
    /// Physical damage to all living enemies, as a percent of attack
    AoeDamage { percent: i32 },
    /// Defense-ignoring damage to all living enemies
    AoeMagicDamage { amount: i32 },
    /// Self-heal
    Heal { amount: i32 },
    /// Timed flat defense buff on self
    DefenseBuff { amount: i32, duration: f64 },
    /// Timed flat evasion buff on self
    EvasionBuff { amount: i32, duration: f64 },
    /// Timed flat defense buff on all living allies
    AllyDefenseBuff { amount: i32, duration: f64 },
    /// Timed attack% and attack-speed% buff on all living allies
    AllyBuff {
        attack_percent: i32,
        attack_speed_percent: i32,
        duration: f64,
    },
    /// Timed attack% debuff on all living enemies
    EnemyAttackDebuff { percent: i32, duration: f64 },
    /// Repeat the basic attack against the current target
    MultiAttack { count: u32 },
    /// Single defense-ignoring hit on the current target
    TrueDamage { amount: i32 },
    /// Attack-scaled hit on a random rear-rank enemy
    Backstab { percent: i32 },
    /// Damage plus a timed stun on the current target
    Stun { damage: i32, duration: f64 },
    /// Damage plus a chance to instantly zero the target's hp
    Execute { damage: i32, chance: i32 },
    /// Passive: revive once at a percent of max hp on lethal damage
    Resurrect { percent: i32 },
}

/// Shared per-tick resolution context
pub struct ResolveCtx<'a> {
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<CombatEvent>,
    pub tick: Tick,
    pub sim_time: f64,
}

/// Mutable access to two distinct arena slots
fn pair_mut(units: &mut [Combatant], a: usize, b: usize) -> (&mut Combatant, &mut Combatant) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = units.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = units.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Run one unit's attack step for this tick
///
/// Silent no-op without a position, a living positioned target, or the
/// target in range. Closing distance is the movement phase's job; the two
/// gate on disjoint range conditions.
pub fn process_attack(
    units: &mut [Combatant],
    attacker_idx: usize,
    delta_time: f64,
    ctx: &mut ResolveCtx,
) {
    let attacker = &units[attacker_idx];
    let Some(position) = attacker.position else {
        return;
    };
    let Some(target_id) = attacker.target else {
        return;
    };
    if attacker.stats.attack_speed <= 0.0 {
        return;
    }
    let Some(target_idx) = units.iter().position(|u| u.id == target_id) else {
        return;
    };
    let target = &units[target_idx];
    if !target.is_alive {
        return;
    }
    let Some(target_pos) = target.position else {
        return;
    };
    if position.distance(&target_pos) > units[attacker_idx].stats.range {
        return;
    }

    let cooldown = 1.0 / units[attacker_idx].stats.attack_speed;
    units[attacker_idx].attack_timer += delta_time;
    if units[attacker_idx].attack_timer < cooldown {
        return;
    }
    units[attacker_idx].attack_timer = 0.0;

    perform_attack(units, attacker_idx, target_idx, ctx);

    let attacker = &units[attacker_idx];
    if attacker.is_alive && attacker.current_mana >= attacker.stats.max_mana {
        cast_skill(units, attacker_idx, ctx);
    }
}

/// Execute one basic attack; returns post-mitigation damage dealt
///
/// Attacker gains mana whether or not the hit lands; lifesteal and the
/// on-kill attack-speed passive apply afterwards.
pub fn perform_attack(
    units: &mut [Combatant],
    attacker_idx: usize,
    target_idx: usize,
    ctx: &mut ResolveCtx,
) -> i32 {
    let (attacker, target) = pair_mut(units, attacker_idx, target_idx);
    if !attacker.is_alive || !target.is_alive {
        return 0;
    }

    let mut damage = attacker.stats.attack;
    let is_crit = ctx.rng.gen_range(0..100) < attacker.stats.crit_chance;
    if is_crit {
        damage = damage * attacker.stats.crit_damage / 100;
    }

    let dealt = take_damage(target, damage, false, ctx);
    attacker.battle_stats.damage_dealt += dealt as i64;

    let mana_gain = MANA_PER_ATTACK * (100 + attacker.mana_regen_bonus) / 100;
    attacker.gain_mana(mana_gain);

    if attacker.stats.lifesteal > 0 && dealt > 0 {
        attacker.heal(dealt * attacker.stats.lifesteal / 100);
    }

    if !target.is_alive {
        attacker.battle_stats.kills += 1;
        if attacker.kill_attack_speed_enabled {
            attacker.base.attack_speed *= 1.0 + KILL_ATTACK_SPEED_BONUS_PCT as f64 / 100.0;
            attacker.recompute_stats();
        }
    }

    dealt
}

/// Apply incoming damage to a unit; returns the post-mitigation amount
///
/// Pipeline: first-dodge flag, then evasion roll, then flat defense with a
/// floor of `DAMAGE_FLOOR` (unless true damage), then percentage damage
/// reduction. Being hit grants flat mana. Lethal damage consults the
/// resurrect passive before marking the unit dead; the corpse keeps its
/// grid cell until the end-of-tick sweep.
pub fn take_damage(
    target: &mut Combatant,
    raw_damage: i32,
    is_true_damage: bool,
    ctx: &mut ResolveCtx,
) -> i32 {
    if !target.is_alive {
        return 0;
    }

    let dodged = if target.first_attack_dodge && !target.has_used_first_dodge {
        target.has_used_first_dodge = true;
        true
    } else {
        ctx.rng.gen_range(0..100) < target.stats.evasion
    };
    if dodged {
        return 0;
    }

    let mut actual = if is_true_damage {
        raw_damage
    } else {
        (raw_damage - target.stats.defense).max(DAMAGE_FLOOR)
    };
    if target.stats.damage_reduction > 0 {
        actual = actual * (100 - target.stats.damage_reduction) / 100;
    }

    target.current_hp -= actual;
    target.battle_stats.damage_taken += actual as i64;
    target.gain_mana(MANA_PER_HIT);

    if target.current_hp <= 0 {
        let revive_percent = match &target.skill {
            Some(SkillSpec {
                effect: SkillEffect::Resurrect { percent },
                ..
            }) if !target.has_resurrected => Some(*percent),
            _ => None,
        };
        if let Some(percent) = revive_percent {
            target.has_resurrected = true;
            target.current_hp = target.stats.hp * percent / 100;
            ctx.events.push(CombatEvent::new(
                ctx.tick,
                CombatEventKind::Resurrected { unit: target.id },
                format!("{} resurrects", target.name),
            ));
        } else {
            target.mark_dead();
            ctx.events.push(CombatEvent::new(
                ctx.tick,
                CombatEventKind::UnitDied { unit: target.id },
                format!("{} died", target.name),
            ));
        }
    }

    actual
}

/// Fire a unit's skill, consuming all mana
///
/// Returns false when the unit has no skill or the mana bar is not full.
pub fn cast_skill(units: &mut [Combatant], caster_idx: usize, ctx: &mut ResolveCtx) -> bool {
    let caster = &units[caster_idx];
    let Some(skill) = caster.skill.clone() else {
        return false;
    };
    if caster.current_mana < caster.stats.max_mana {
        return false;
    }

    let caster_id = caster.id;
    let team = caster.team;
    let power = caster.stats.skill_power;
    let attack = caster.stats.attack;
    let position = caster.position;
    let target_id = caster.target;

    units[caster_idx].current_mana = 0;
    ctx.events.push(CombatEvent::new(
        ctx.tick,
        CombatEventKind::SkillCast { unit: caster_id },
        format!("{} casts {}", units[caster_idx].name, skill.name),
    ));

    let target_idx = target_id.and_then(|id| units.iter().position(|u| u.id == id && u.is_alive));
    let enemy_indices: Vec<usize> = units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.team != team && u.is_alive)
        .map(|(i, _)| i)
        .collect();
    let ally_indices: Vec<usize> = units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.team == team && u.is_alive)
        .map(|(i, _)| i)
        .collect();

    match skill.effect {
        SkillEffect::MagicDamage { amount } | SkillEffect::TrueDamage { amount } => {
            if let Some(idx) = target_idx {
                let damage = (amount as f64 * power).floor() as i32;
                take_damage(&mut units[idx], damage, true, ctx);
            }
        }
        SkillEffect::AoeDamage { percent } => {
            let damage = (attack as f64 * (percent as f64 / 100.0) * power).floor() as i32;
            for idx in enemy_indices {
                take_damage(&mut units[idx], damage, false, ctx);
            }
        }
        SkillEffect::AoeMagicDamage { amount } => {
            let damage = (amount as f64 * power).floor() as i32;
            for idx in enemy_indices {
                take_damage(&mut units[idx], damage, true, ctx);
            }
        }
        SkillEffect::Heal { amount } => {
            units[caster_idx].heal((amount as f64 * power).floor() as i32);
        }
        SkillEffect::DefenseBuff { amount, duration } => {
            units[caster_idx].add_buff(EffectKind::Defense, amount, duration, ctx.sim_time);
        }
        SkillEffect::EvasionBuff { amount, duration } => {
            units[caster_idx].add_buff(EffectKind::Evasion, amount, duration, ctx.sim_time);
        }
        SkillEffect::AllyDefenseBuff { amount, duration } => {
            for idx in ally_indices {
                units[idx].add_buff(EffectKind::Defense, amount, duration, ctx.sim_time);
            }
        }
        SkillEffect::AllyBuff {
            attack_percent,
            attack_speed_percent,
            duration,
        } => {
            for idx in ally_indices {
                units[idx].add_buff(EffectKind::AttackPercent, attack_percent, duration, ctx.sim_time);
                units[idx].add_buff(
                    EffectKind::AttackSpeedPercent,
                    attack_speed_percent,
                    duration,
                    ctx.sim_time,
                );
            }
        }
        SkillEffect::EnemyAttackDebuff { percent, duration } => {
            for idx in enemy_indices {
                units[idx].add_debuff(EffectKind::AttackPercent, percent, duration, ctx.sim_time);
            }
        }
        SkillEffect::MultiAttack { count } => {
            if let Some(idx) = target_idx {
                for _ in 0..count {
                    if units[caster_idx].is_alive && units[idx].is_alive {
                        perform_attack(units, caster_idx, idx, ctx);
                    }
                }
            }
        }
        SkillEffect::Backstab { percent } => {
            if let Some(idx) = pick_rear_rank_enemy(units, position, &enemy_indices, ctx) {
                let damage = (attack as f64 * (percent as f64 / 100.0) * power).floor() as i32;
                take_damage(&mut units[idx], damage, false, ctx);
            }
        }
        SkillEffect::Stun { damage, duration } => {
            if let Some(idx) = target_idx {
                let damage = (damage as f64 * power).floor() as i32;
                take_damage(&mut units[idx], damage, false, ctx);
                if units[idx].is_alive {
                    units[idx].add_debuff(EffectKind::Stun, 0, duration, ctx.sim_time);
                }
            }
        }
        SkillEffect::Execute { damage, chance } => {
            if let Some(idx) = target_idx {
                let damage = (damage as f64 * power).floor() as i32;
                take_damage(&mut units[idx], damage, false, ctx);
                if units[idx].is_alive && ctx.rng.gen_range(0..100) < chance {
                    let remaining = units[idx].current_hp;
                    take_damage(&mut units[idx], remaining, true, ctx);
                }
            }
        }
        SkillEffect::Resurrect { .. } => {
            // Passive, triggered from take_damage on lethal hits
            tracing::warn!(
                unit = %units[caster_idx].name,
                "resurrect dispatched as an active skill; ignoring"
            );
        }
    }

    true
}

/// Rear-rank enemy for backstab: living positioned enemies at maximum hex
/// distance from the caster, chosen uniformly at random.
fn pick_rear_rank_enemy(
    units: &[Combatant],
    caster_pos: Option<crate::combat::hex::HexCoord>,
    enemy_indices: &[usize],
    ctx: &mut ResolveCtx,
) -> Option<usize> {
    let caster_pos = caster_pos?;
    let positioned: Vec<(usize, u32)> = enemy_indices
        .iter()
        .filter_map(|&idx| {
            units[idx]
                .position
                .map(|pos| (idx, caster_pos.distance(&pos)))
        })
        .collect();
    let max_distance = positioned.iter().map(|(_, d)| *d).max()?;
    let rear: Vec<usize> = positioned
        .iter()
        .filter(|(_, d)| *d == max_distance)
        .map(|(idx, _)| *idx)
        .collect();
    rear.choose(ctx.rng).copied()
}
