//! Error types for board operations.

use crate::position::Position;
use crate::tile::TileId;
use thiserror::Error;

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("The board is full; remove a card first")]
    GridFull,
    #[error("Unknown tile: {0}")]
    UnknownTile(TileId),
    #[error("Cell ({x}, {y}) is outside the board")]
    NoSuchCell { x: usize, y: usize },
    #[error("Board dimensions must be at least 1, got {0}")]
    InvalidDimension(usize),
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// A broken link between the grid index and the tile arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("cell {cell} references missing tile {tile}")]
    DanglingCell { cell: Position, tile: TileId },
    #[error("tile {tile} stores position {stored} but occupies {cell}")]
    PositionDrift {
        tile: TileId,
        stored: Position,
        cell: Position,
    },
    #[error("tile {tile} at {stored} is not indexed by the grid")]
    Orphan { tile: TileId, stored: Position },
}
