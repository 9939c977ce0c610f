//! Hex coordinate system for the battle grid (axial coordinates)
//!
//! Uses axial coordinates (q, r) for easy neighbor calculation.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate on the battle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance: max(|dq|, |dr|, |dq+dr|)
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds) as u32
    }

    /// Get all 6 neighboring hex coordinates, in direction order (E..SE)
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let mut result = [*self; 6];
        for (i, dir) in HexDirection::all().iter().enumerate() {
            result[i] = self.offset_by(*dir);
        }
        result
    }

    /// The neighbor one step in the given direction
    pub fn offset_by(&self, dir: HexDirection) -> HexCoord {
        let offset = dir.offset();
        HexCoord::new(self.q + offset.q, self.r + offset.r)
    }

    /// Get all hexes within range (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }
}

/// Direction enum for hex movement
///
/// The discriminant doubles as the direction index used by the
/// anti-oscillation tie-break in movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum HexDirection {
    #[default]
    East = 0,
    NorthEast = 1,
    NorthWest = 2,
    West = 3,
    SouthWest = 4,
    SouthEast = 5,
}

impl HexDirection {
    /// Get the hex offset for this direction
    pub fn offset(&self) -> HexCoord {
        match self {
            HexDirection::East => HexCoord::new(1, 0),
            HexDirection::NorthEast => HexCoord::new(1, -1),
            HexDirection::NorthWest => HexCoord::new(0, -1),
            HexDirection::West => HexCoord::new(-1, 0),
            HexDirection::SouthWest => HexCoord::new(-1, 1),
            HexDirection::SouthEast => HexCoord::new(0, 1),
        }
    }

    /// Direction index 0-5
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Get opposite direction ((index + 3) mod 6)
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }

    /// All directions, in index order
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_coord_creation() {
        let coord = HexCoord::new(5, 10);
        assert_eq!(coord.q, 5);
        assert_eq!(coord.r, 10);
    }

    #[test]
    fn test_hex_distance_same() {
        let a = HexCoord::new(0, 0);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_hex_distance_adjacent() {
        let a = HexCoord::new(0, 0);
        for neighbor in a.neighbors() {
            assert_eq!(a.distance(&neighbor), 1);
        }
    }

    #[test]
    fn test_hex_distance_diagonal() {
        // (0,0) -> (2,-1) crosses two hexes
        assert_eq!(HexCoord::new(0, 0).distance(&HexCoord::new(2, -1)), 2);
    }

    #[test]
    fn test_hex_neighbors_count() {
        let coord = HexCoord::new(5, 5);
        assert_eq!(coord.neighbors().len(), 6);
    }

    #[test]
    fn test_neighbors_follow_direction_order() {
        let origin = HexCoord::new(0, 0);
        let neighbors = origin.neighbors();
        for (i, dir) in HexDirection::all().iter().enumerate() {
            assert_eq!(neighbors[i], dir.offset());
            assert_eq!(dir.index() as usize, i);
        }
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(HexDirection::East.opposite(), HexDirection::West);
        assert_eq!(HexDirection::NorthEast.opposite(), HexDirection::SouthWest);
        for dir in HexDirection::all() {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.opposite().index(), (dir.index() + 3) % 6);
        }
    }

    #[test]
    fn test_hexes_in_range() {
        let center = HexCoord::new(0, 0);
        assert_eq!(center.hexes_in_range(1).len(), 7); // Center + 6 neighbors
        assert_eq!(center.hexes_in_range(2).len(), 19);
    }

    proptest! {
        #[test]
        fn prop_distance_symmetric(q1 in -50i32..50, r1 in -50i32..50,
                                   q2 in -50i32..50, r2 in -50i32..50) {
            let a = HexCoord::new(q1, r1);
            let b = HexCoord::new(q2, r2);
            prop_assert_eq!(a.distance(&b), b.distance(&a));
        }

        #[test]
        fn prop_distance_triangle_inequality(q1 in -20i32..20, r1 in -20i32..20,
                                             q2 in -20i32..20, r2 in -20i32..20,
                                             q3 in -20i32..20, r3 in -20i32..20) {
            let a = HexCoord::new(q1, r1);
            let b = HexCoord::new(q2, r2);
            let c = HexCoord::new(q3, r3);
            prop_assert!(a.distance(&c) <= a.distance(&b) + b.distance(&c));
        }

        #[test]
        fn prop_range_membership_matches_distance(q in -20i32..20, r in -20i32..20,
                                                  range in 0u32..5) {
            let center = HexCoord::new(q, r);
            for hex in center.hexes_in_range(range) {
                prop_assert!(center.distance(&hex) <= range);
            }
        }
    }
}
