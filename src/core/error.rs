use thiserror::Error;

use crate::combat::hex::HexCoord;
use crate::core::types::UnitId;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("battle already in progress")]
    BattleInProgress,

    #[error("cell ({0}, {1}) is already occupied")]
    CellOccupied(i32, i32),

    #[error("cell ({0}, {1}) is not part of the grid")]
    UnknownCell(i32, i32),

    #[error("unit not found: {0:?}")]
    UnitNotFound(UnitId),

    #[error("grid occupancy out of sync at {0:?}")]
    GridDesync(HexCoord),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
