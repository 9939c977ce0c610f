//! Target selection
//!
//! A unit keeps its target across ticks; re-acquisition is lazy, at the
//! start of the tick that needs it, and only when the current target died,
//! lost its position, or was never set.

use crate::combat::units::Combatant;
use crate::core::types::UnitId;

/// Does this unit need a fresh target?
pub fn needs_new_target(unit: &Combatant, all_units: &[Combatant]) -> bool {
    match unit.target {
        None => true,
        Some(target_id) => !all_units
            .iter()
            .any(|u| u.id == target_id && u.is_alive && u.position.is_some()),
    }
}

/// Pick a target from the opposing roster
///
/// Candidates are living enemies with a known position. Enemies already in
/// attack range are preferred over out-of-range ones; within the chosen
/// pool, closest wins, ties broken by lowest current HP.
pub fn find_target(unit: &Combatant, enemies: &[&Combatant]) -> Option<UnitId> {
    let position = unit.position?;

    let mut candidates: Vec<(&Combatant, u32)> = enemies
        .iter()
        .filter(|e| e.is_alive)
        .filter_map(|e| e.position.map(|pos| (*e, position.distance(&pos))))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    if candidates.iter().any(|(_, d)| *d <= unit.stats.range) {
        candidates.retain(|(_, d)| *d <= unit.stats.range);
    }

    candidates.sort_by_key(|(e, d)| (*d, e.current_hp));
    candidates.first().map(|(e, _)| e.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::hex::HexCoord;
    use crate::combat::stats::UnitStats;
    use crate::core::types::Team;

    fn unit_at(team: Team, q: i32, r: i32, range: u32) -> Combatant {
        let mut unit = Combatant::new(
            "test",
            "Test",
            team,
            UnitStats {
                range,
                ..Default::default()
            },
        );
        unit.position = Some(HexCoord::new(q, r));
        unit
    }

    #[test]
    fn test_no_candidates() {
        let unit = unit_at(Team::Player, 0, 0, 1);
        assert_eq!(find_target(&unit, &[]), None);
    }

    #[test]
    fn test_dead_and_positionless_excluded() {
        let unit = unit_at(Team::Player, 0, 0, 1);
        let mut dead = unit_at(Team::Enemy, 1, 0, 1);
        dead.is_alive = false;
        let mut off_grid = unit_at(Team::Enemy, 2, 0, 1);
        off_grid.position = None;

        assert_eq!(find_target(&unit, &[&dead, &off_grid]), None);
    }

    #[test]
    fn test_closest_wins() {
        let unit = unit_at(Team::Player, 0, 0, 1);
        let near = unit_at(Team::Enemy, 2, 0, 1);
        let far = unit_at(Team::Enemy, 4, 0, 1);

        assert_eq!(find_target(&unit, &[&far, &near]), Some(near.id));
    }

    #[test]
    fn test_distance_tie_broken_by_lowest_hp() {
        let unit = unit_at(Team::Player, 0, 0, 1);
        let mut healthy = unit_at(Team::Enemy, 3, 0, 1);
        healthy.current_hp = 100;
        let mut wounded = unit_at(Team::Enemy, 0, 3, 1);
        wounded.current_hp = 40;

        assert_eq!(find_target(&unit, &[&healthy, &wounded]), Some(wounded.id));
    }

    #[test]
    fn test_in_range_preferred_over_closer_pool() {
        // Both are candidates; the in-range one wins even if another pool
        // member has lower hp
        let unit = unit_at(Team::Player, 0, 0, 2);
        let mut in_range = unit_at(Team::Enemy, 2, 0, 1);
        in_range.current_hp = 100;
        let mut out_of_range = unit_at(Team::Enemy, 4, 0, 1);
        out_of_range.current_hp = 10;

        assert_eq!(
            find_target(&unit, &[&out_of_range, &in_range]),
            Some(in_range.id)
        );
    }

    #[test]
    fn test_needs_new_target_cases() {
        let mut unit = unit_at(Team::Player, 0, 0, 1);
        let mut enemy = unit_at(Team::Enemy, 1, 0, 1);

        assert!(needs_new_target(&unit, std::slice::from_ref(&enemy)));

        unit.target = Some(enemy.id);
        assert!(!needs_new_target(&unit, std::slice::from_ref(&enemy)));

        enemy.is_alive = false;
        assert!(needs_new_target(&unit, std::slice::from_ref(&enemy)));

        enemy.is_alive = true;
        enemy.position = None;
        assert!(needs_new_target(&unit, std::slice::from_ref(&enemy)));
    }
}
