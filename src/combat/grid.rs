//! Battle grid: hex cell membership and unit occupancy
//!
//! At most one living unit occupies a cell. All occupancy writes during a
//! battle are funneled through `Battle` (movement commit, death sweep,
//! initial placement); the grid itself only enforces the local invariant.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::hex::HexCoord;
use crate::core::error::{CombatError, Result};
use crate::core::types::UnitId;

/// A single cell on the battle grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    pub occupant: Option<UnitId>,
}

/// The battle grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleGrid {
    cells: AHashMap<HexCoord, Cell>,
}

impl BattleGrid {
    /// Create a grid from an explicit cell set
    pub fn from_coords(coords: impl IntoIterator<Item = HexCoord>) -> Self {
        let cells = coords
            .into_iter()
            .map(|coord| (coord, Cell::default()))
            .collect();
        Self { cells }
    }

    /// Create a hexagonal grid of the given radius centered on the origin
    pub fn hexagon(radius: u32) -> Self {
        Self::from_coords(HexCoord::new(0, 0).hexes_in_range(radius))
    }

    /// Is this coordinate part of the grid?
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// The unit occupying a cell, if any
    pub fn occupant(&self, coord: HexCoord) -> Option<UnitId> {
        self.cells.get(&coord).and_then(|cell| cell.occupant)
    }

    /// Is the cell on the grid and free for this unit (empty or already its own)?
    pub fn is_free_for(&self, coord: HexCoord, unit_id: UnitId) -> bool {
        match self.cells.get(&coord) {
            Some(cell) => cell.occupant.is_none() || cell.occupant == Some(unit_id),
            None => false,
        }
    }

    /// Mark a cell as occupied by a unit
    ///
    /// Fails if the coordinate is off-grid or held by a different unit.
    pub fn place(&mut self, coord: HexCoord, unit_id: UnitId) -> Result<()> {
        let cell = self
            .cells
            .get_mut(&coord)
            .ok_or(CombatError::UnknownCell(coord.q, coord.r))?;
        match cell.occupant {
            Some(existing) if existing != unit_id => {
                Err(CombatError::CellOccupied(coord.q, coord.r))
            }
            _ => {
                cell.occupant = Some(unit_id);
                Ok(())
            }
        }
    }

    /// Clear a cell's occupancy
    pub fn clear(&mut self, coord: HexCoord) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.occupant = None;
        }
    }

    /// Number of cells in the grid
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All occupied coordinates with their occupants
    pub fn occupied_cells(&self) -> impl Iterator<Item = (HexCoord, UnitId)> + '_ {
        self.cells
            .iter()
            .filter_map(|(coord, cell)| cell.occupant.map(|id| (*coord, id)))
    }
}
