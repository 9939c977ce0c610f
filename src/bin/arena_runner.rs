//! Headless Arena Runner
//!
//! Runs a seeded demo battle without a frontend and prints the result as
//! JSON or text. Useful for balancing passes and replaying reported seeds.

use clap::Parser;
use serde::Serialize;

use hex_arena::combat::{
    Battle, BattleGrid, Combatant, HexCoord, SkillEffect, SkillSpec, StarLevel, UnitStats,
    BATTLE_TICK_MS,
};
use hex_arena::core::error::Result;
use hex_arena::core::types::Team;

/// Headless arena runner - seeded demo battles for balancing
#[derive(Parser, Debug)]
#[command(name = "arena_runner")]
#[command(about = "Run a seeded auto-battler combat and print the result")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Flat enemy attack reduction percent applied at battle start
    #[arg(long, default_value_t = 0)]
    enemy_debuff: i32,

    /// Grid radius in hexes
    #[arg(long, default_value_t = 3)]
    grid_radius: u32,

    /// Maximum ticks before the battle is called a stalemate
    #[arg(long, default_value_t = 3000)]
    max_ticks: u64,

    /// Star level for the player roster (1-3)
    #[arg(long, default_value_t = 1)]
    star_level: u8,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Replay battle events to stderr as they happen
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunnerResult {
    victory: bool,
    ticks: u64,
    remaining_player_units: u32,
    remaining_enemy_units: u32,
    player_damage_dealt: i64,
    player_healing: i64,
    player_kills: u32,
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let star_level = match args.star_level {
        2 => StarLevel::Two,
        3 => StarLevel::Three,
        _ => StarLevel::One,
    };

    let grid = BattleGrid::hexagon(args.grid_radius);
    let mut battle = Battle::new(
        grid,
        demo_roster(star_level),
        demo_wave(),
        args.enemy_debuff,
        seed,
    )?;

    let delta_time = BATTLE_TICK_MS as f64 / 1000.0;
    let verdict = loop {
        let events_before = battle.events.len();
        battle.run_tick(delta_time)?;

        if args.verbose {
            for event in battle.events.iter().skip(events_before) {
                eprintln!("  [{}] {:?}: {}", event.tick, event.kind, event.description);
            }
        }

        if let Some(verdict) = battle.check_battle_end() {
            break verdict;
        }
        if battle.tick >= args.max_ticks {
            eprintln!("Stalemate after {} ticks", battle.tick);
            break hex_arena::combat::BattleVerdict {
                victory: false,
                remaining_player_units: battle.alive_count(Team::Player),
                remaining_enemy_units: battle.alive_count(Team::Enemy),
            };
        }
    };

    let summary = battle.team_summary(Team::Player);
    let result = RunnerResult {
        victory: verdict.victory,
        ticks: battle.tick,
        remaining_player_units: verdict.remaining_player_units,
        remaining_enemy_units: verdict.remaining_enemy_units,
        player_damage_dealt: summary.damage_dealt,
        player_healing: summary.healing,
        player_kills: summary.kills,
        seed,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => {
            println!("Battle Result");
            println!("=============");
            println!("Outcome: {}", if result.victory { "victory" } else { "defeat" });
            println!("Ticks: {}", result.ticks);
            println!(
                "Remaining units: {} players, {} enemies",
                result.remaining_player_units, result.remaining_enemy_units
            );
            println!("Player damage dealt: {}", result.player_damage_dealt);
            println!("Player healing: {}", result.player_healing);
            println!("Player kills: {}", result.player_kills);
            println!("Seed: {}", result.seed);
        }
        other => {
            eprintln!("Unknown format '{other}', defaulting to json");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn placed(mut unit: Combatant, q: i32, r: i32) -> Combatant {
    unit.position = Some(HexCoord::new(q, r));
    unit
}

/// Demo player roster covering a spread of skill kinds
fn demo_roster(star_level: StarLevel) -> Vec<Combatant> {
    let guardian = Combatant::new(
        "kiki_guardian",
        "Kiki Guardian",
        Team::Player,
        UnitStats {
            hp: 550,
            attack: 40,
            attack_speed: 0.65,
            range: 1,
            defense: 30,
            ..Default::default()
        }
        .at_star_level(star_level),
    )
    .with_skill(SkillSpec::new(
        "Small Bulwark",
        SkillEffect::DefenseBuff {
            amount: 50,
            duration: 5.0,
        },
    ));

    let mage = Combatant::new(
        "starlight_mage",
        "Starlight Mage",
        Team::Player,
        UnitStats {
            hp: 420,
            attack: 45,
            attack_speed: 0.75,
            range: 3,
            defense: 10,
            ..Default::default()
        }
        .at_star_level(star_level),
    )
    .with_skill(SkillSpec::new(
        "Glittering Star",
        SkillEffect::MagicDamage { amount: 150 },
    ));

    let hunter = Combatant::new(
        "hunter",
        "Hunter",
        Team::Player,
        UnitStats {
            hp: 480,
            attack: 52,
            attack_speed: 0.85,
            range: 3,
            defense: 12,
            ..Default::default()
        }
        .at_star_level(star_level),
    )
    .with_skill(SkillSpec::new(
        "Rapid Fire",
        SkillEffect::MultiAttack { count: 3 },
    ));

    let herbalist = Combatant::new(
        "herbalist",
        "Herbalist",
        Team::Player,
        UnitStats {
            hp: 500,
            attack: 38,
            attack_speed: 0.7,
            range: 2,
            defense: 15,
            ..Default::default()
        }
        .at_star_level(star_level),
    )
    .with_skill(SkillSpec::new(
        "Earthen Vigor",
        SkillEffect::Heal { amount: 150 },
    ));

    let dancer = Combatant::new(
        "velua_dancer",
        "Velua Dancer",
        Team::Player,
        UnitStats {
            hp: 450,
            attack: 42,
            attack_speed: 0.9,
            range: 1,
            defense: 15,
            ..Default::default()
        }
        .at_star_level(star_level),
    )
    .with_skill(SkillSpec::new(
        "Bewitching Dance",
        SkillEffect::EvasionBuff {
            amount: 30,
            duration: 4.0,
        },
    ));

    vec![
        placed(guardian, -1, 2),
        placed(dancer, 0, 2),
        placed(mage, -2, 3),
        placed(hunter, -1, 3),
        placed(herbalist, 0, 3),
    ]
}

/// Scripted enemy wave: no skills, stock stats
fn demo_wave() -> Vec<Combatant> {
    let bandit = |name: &str, q: i32, r: i32| {
        placed(
            Combatant::new(
                "bandit",
                name,
                Team::Enemy,
                UnitStats {
                    hp: 600,
                    attack: 40,
                    attack_speed: 0.7,
                    range: 1,
                    defense: 10,
                    max_mana: 0,
                    ..Default::default()
                },
            ),
            q,
            r,
        )
    };
    let wolf = placed(
        Combatant::new(
            "wolf",
            "Wolf",
            Team::Enemy,
            UnitStats {
                hp: 450,
                attack: 50,
                attack_speed: 1.0,
                range: 1,
                defense: 5,
                max_mana: 0,
                move_speed: 1.4,
                ..Default::default()
            },
        ),
        1,
        -2,
    );
    let leader = placed(
        Combatant::new(
            "bandit_leader",
            "Bandit Leader",
            Team::Enemy,
            UnitStats {
                hp: 900,
                attack: 60,
                attack_speed: 0.8,
                range: 1,
                defense: 20,
                max_mana: 0,
                ..Default::default()
            },
        ),
        0,
        -3,
    );

    vec![
        bandit("Bandit", -1, -2),
        bandit("Bandit", 0, -2),
        wolf,
        leader,
    ]
}
