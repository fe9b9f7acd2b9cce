//! Integer cell coordinates on the board.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell address: `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// The top-left cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Top-left corner of this cell in board units.
    pub fn origin(self, cell: Size) -> Point {
        Point::new(self.x as f64 * cell.width, self.y as f64 * cell.height)
    }

    /// Center of this cell in board units.
    pub fn center(self, cell: Size) -> Point {
        self.origin(cell) + cell.to_vec2() * 0.5
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
