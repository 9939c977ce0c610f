//! Combat engine - real-time auto-battler simulation on a hex grid
//!
//! One fixed-period scheduler loop drives the whole simulation; every tick
//! runs the same pipeline to completion before the next is scheduled:
//!
//! targeting -> movement intents -> collision resolution -> movement commit
//! -> attack/skill resolution -> timed-effect expiry -> death sweep
//!
//! The two-phase movement protocol (intent, then arbitrated commit) is what
//! keeps a shared grid race-free while many units move at once: occupancy is
//! only ever written by the commit and the death sweep.

pub mod battle;
pub mod constants;
pub mod effects;
pub mod grid;
pub mod hex;
pub mod movement;
pub mod resolution;
pub mod scheduler;
pub mod stats;
pub mod targeting;
pub mod units;

// Re-exports for convenient access
pub use battle::{Battle, BattleVerdict, CombatEvent, CombatEventKind, TeamSummary};
pub use constants::*;
pub use effects::{EffectKind, TimedEffect};
pub use grid::BattleGrid;
pub use hex::{HexCoord, HexDirection};
pub use movement::{collect_move_intent, find_next_move_cell, resolve_collisions, MoveIntent};
pub use resolution::{SkillEffect, SkillSpec};
pub use scheduler::{BattleResult, CombatScheduler};
pub use stats::{BattleStats, StarLevel, UnitStats};
pub use targeting::find_target;
pub use units::Combatant;
